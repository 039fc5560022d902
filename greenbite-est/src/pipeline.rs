//! Estimation pipeline
//!
//! Owns the two read-only reference tables and the matching components, and
//! runs the Resolver → Matcher → Aggregator flow for one request at a time.
//! Each call is a pure function of its arguments and the loaded tables.

use crate::services::impact_aggregator::{self, round_to, Breakdown, Equivalences, ImpactTotals};
use crate::services::ingredient_matcher::{IngredientAliases, IngredientMatcher, MatchSet};
use crate::services::recipe_resolver::{DishAliases, RecipeResolver};
use crate::services::similarity;
use crate::services::remote_scorer::DishScore;
use crate::services::sustainability::{self, ScoringPolicy};
use greenbite_common::config::MatchingConfig;
use greenbite_common::{Error, RecipeTable, ReferenceTable, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Title used when a candidate has no title of its own
pub const UNTITLED_RECIPE: &str = "Untitled Recipe";

/// One recipe offered for a dish query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeCandidate {
    pub title: String,
    pub ingredients: Vec<String>,
}

/// Everything computed for one ingredient list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionsReport {
    /// Reported categories, 3 decimals; empty when nothing was matched
    pub breakdown: Breakdown,
    /// Dish total in kg CO2e, 2 decimals
    pub total_emissions: f64,
    pub emissions_equivalence: Equivalences,
    pub sustainability_score: DishScore,
    /// Per-ingredient outcome keyed by input text
    pub matches: MatchSet,
    /// Unrounded sums
    #[serde(skip)]
    pub totals: ImpactTotals,
}

/// Row counts of the loaded tables, `None` when a table failed to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetStatus {
    pub emissions_rows: Option<usize>,
    pub recipe_rows: Option<usize>,
}

impl DatasetStatus {
    pub fn all_loaded(&self) -> bool {
        self.emissions_rows.is_some() && self.recipe_rows.is_some()
    }
}

pub struct Pipeline {
    reference: Option<Arc<ReferenceTable>>,
    recipes: Option<Arc<RecipeTable>>,
    matcher: IngredientMatcher,
    resolver: RecipeResolver,
    matching: MatchingConfig,
    scoring: ScoringPolicy,
}

impl Pipeline {
    /// Pipeline with the built-in alias tables and the configured metric
    ///
    /// Either table may be absent; requests needing it then fail with
    /// `ReferenceDataUnavailable`.
    pub fn new(
        reference: Option<Arc<ReferenceTable>>,
        recipes: Option<Arc<RecipeTable>>,
        matching: MatchingConfig,
        scoring: ScoringPolicy,
    ) -> Self {
        Self {
            reference,
            recipes,
            matcher: IngredientMatcher::new(
                IngredientAliases::default(),
                similarity::for_metric(matching.metric),
            ),
            resolver: RecipeResolver::new(
                DishAliases::default(),
                similarity::for_metric(matching.metric),
            ),
            matching,
            scoring,
        }
    }

    pub fn matching(&self) -> MatchingConfig {
        self.matching
    }

    pub fn scoring_policy(&self) -> ScoringPolicy {
        self.scoring
    }

    pub fn dataset_status(&self) -> DatasetStatus {
        DatasetStatus {
            emissions_rows: self.reference.as_ref().map(|t| t.len()),
            recipe_rows: self.recipes.as_ref().map(|t| t.len()),
        }
    }

    /// Candidate recipes for a dish name, at most `recipe_limit` of them
    pub fn search(&self, dish: &str) -> Result<Vec<RecipeCandidate>> {
        if dish.trim().is_empty() {
            return Err(Error::InvalidInput("No dish name provided".to_string()));
        }
        let recipes = self.recipes.as_deref().ok_or_else(|| {
            Error::ReferenceDataUnavailable("Recipe dataset not loaded".to_string())
        })?;

        let resolution = self.resolver.resolve(
            dish,
            Some(recipes),
            self.matching.dish_threshold,
            self.matching.recipe_limit,
        )?;

        let candidates: Vec<RecipeCandidate> = resolution
            .candidates
            .into_iter()
            .enumerate()
            .take(self.matching.recipe_limit)
            .map(|(i, entry)| {
                let title = resolution
                    .titles
                    .get(i)
                    .filter(|t| !t.trim().is_empty())
                    .cloned()
                    .unwrap_or_else(|| UNTITLED_RECIPE.to_string());
                RecipeCandidate {
                    title,
                    ingredients: entry.ingredients,
                }
            })
            .collect();

        info!(dish = %dish, candidates = candidates.len(), "Dish search complete");
        Ok(candidates)
    }

    /// Emissions report for an explicit ingredient list
    pub fn estimate<S: AsRef<str>>(&self, ingredients: &[S]) -> Result<EmissionsReport> {
        if ingredients.is_empty() {
            return Err(Error::InvalidInput("No valid ingredients provided".to_string()));
        }
        let reference = self.reference.as_deref().ok_or_else(|| {
            Error::ReferenceDataUnavailable("Emissions dataset not loaded".to_string())
        })?;

        let matches =
            self.matcher
                .match_all(ingredients, Some(reference), self.matching.ingredient_threshold);
        let totals = impact_aggregator::aggregate(&matches);
        let total = totals.total_emissions();
        let score = sustainability::score(self.scoring, Some(total));

        info!(
            ingredients = ingredients.len(),
            matched = matches.matched_count(),
            total_emissions = total,
            score,
            "Emissions estimate complete"
        );

        Ok(EmissionsReport {
            breakdown: totals.breakdown(),
            total_emissions: round_to(total, 2),
            emissions_equivalence: impact_aggregator::equivalences(total),
            sustainability_score: DishScore::Score(score),
            matches,
            totals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ingredient_matcher::MatchMethod;
    use greenbite_common::config::SimilarityMetric;
    use greenbite_common::{CategoryValues, EmissionCategory, RecipeEntry, ReferenceEmissionRow};

    fn reference() -> Arc<ReferenceTable> {
        let row = |name: &str, total: f64| {
            let mut v = CategoryValues::zero();
            v.set(EmissionCategory::TotalLandToRetail, total);
            ReferenceEmissionRow::new(name, v)
        };
        Arc::new(ReferenceTable::new(vec![
            row("Beef (beef herd)", 99.48),
            row("Cheese", 21.2),
        ]))
    }

    fn recipes() -> Arc<RecipeTable> {
        Arc::new(RecipeTable::new(vec![
            RecipeEntry::new("Cheeseburger", vec!["hamburger".into(), "cheese".into()]),
            RecipeEntry::new("Cheeseburger", vec!["beef".into(), "cheddar".into()]),
            RecipeEntry::new("Cheeseburger", vec!["beef".into()]),
        ]))
    }

    fn pipeline(limit: usize) -> Pipeline {
        let matching = MatchingConfig {
            recipe_limit: limit,
            ..MatchingConfig::default()
        };
        Pipeline::new(Some(reference()), Some(recipes()), matching, ScoringPolicy::Step)
    }

    #[test]
    fn test_search_caps_candidates_at_limit() {
        let candidates = pipeline(2).search("cheeseburger").unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title, "Cheeseburger");
        assert_eq!(candidates[0].ingredients, vec!["hamburger", "cheese"]);
    }

    #[test]
    fn test_rows_without_ingredients_do_not_take_slots() {
        let table = Arc::new(RecipeTable::new(vec![
            RecipeEntry::new("Cheeseburger", vec![]),
            RecipeEntry::new("Cheeseburger", vec!["[]".into()]),
            RecipeEntry::new("Cheeseburger", vec!["beef".into()]),
            RecipeEntry::new("Cheeseburger", vec!["cheese".into()]),
        ]));
        let matching = MatchingConfig {
            recipe_limit: 2,
            ..MatchingConfig::default()
        };
        let p = Pipeline::new(Some(reference()), Some(table), matching, ScoringPolicy::Step);

        let candidates = p.search("cheeseburger").unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].ingredients, vec!["beef"]);
        assert_eq!(candidates[1].ingredients, vec!["cheese"]);
    }

    #[test]
    fn test_levenshtein_metric_is_applied() {
        let table = || {
            Arc::new(RecipeTable::new(vec![RecipeEntry::new(
                "Chicken Biryani",
                vec!["rice".into(), "chicken".into()],
            )]))
        };
        let levenshtein = MatchingConfig {
            metric: SimilarityMetric::Levenshtein,
            ..MatchingConfig::default()
        };
        let by_edits = Pipeline::new(None, Some(table()), levenshtein, ScoringPolicy::Step);
        let by_tokens = Pipeline::new(None, Some(table()), MatchingConfig::default(), ScoringPolicy::Step);

        // Plain edit distance is sensitive to word order
        assert!(by_edits.search("biryani chicken").unwrap().is_empty());
        assert_eq!(by_tokens.search("biryani chicken").unwrap().len(), 1);
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let table = Arc::new(ReferenceTable::new(vec![
            ReferenceEmissionRow::new("Beef (beef herd)", {
                let mut v = CategoryValues::zero();
                v.set(EmissionCategory::TotalLandToRetail, 99.48);
                v
            }),
            ReferenceEmissionRow::new("Cheese", {
                let mut v = CategoryValues::zero();
                v.set(EmissionCategory::TotalLandToRetail, 21.2);
                v
            }),
            ReferenceEmissionRow::new("Tomatoes", {
                let mut v = CategoryValues::zero();
                v.set(EmissionCategory::TotalLandToRetail, 2.1);
                v
            }),
        ]));
        let p = Pipeline::new(Some(table), None, MatchingConfig::default(), ScoringPolicy::Step);
        let ingredients = ["hamburger", "cheese slices", "tomatos", "lettuce"];

        let first = p.estimate(&ingredients).unwrap();
        let second = p.estimate(&ingredients).unwrap();

        let methods: Vec<_> = first.matches.iter().map(|r| (r.aliased, r.method)).collect();
        assert_eq!(methods[0], (true, MatchMethod::Exact));
        assert_eq!(methods[1], (false, MatchMethod::Substring));
        assert!(matches!(methods[2], (false, MatchMethod::Approximate { .. })));
        assert_eq!(methods[3], (false, MatchMethod::Unmatched));

        assert_eq!(first.matches, second.matches);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_search_blank_dish() {
        assert!(matches!(pipeline(5).search("  "), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_search_without_recipes() {
        let p = Pipeline::new(Some(reference()), None, MatchingConfig::default(), ScoringPolicy::Step);
        assert!(matches!(p.search("pizza"), Err(Error::ReferenceDataUnavailable(_))));
    }

    #[test]
    fn test_estimate_scenario() {
        let report = pipeline(5).estimate(&["hamburger", "cheese", "lettuce"]).unwrap();

        assert_eq!(report.total_emissions, 120.68);
        assert_eq!(report.breakdown.get(EmissionCategory::TotalLandToRetail), Some(120.68));
        assert_eq!(report.sustainability_score, DishScore::Score(1.0));
        assert!(report.matches.get("lettuce").unwrap().categories.is_zero());
        assert_eq!(report.emissions_equivalence.car_distance, 543.1);
    }

    #[test]
    fn test_estimate_empty_list() {
        let empty: [&str; 0] = [];
        assert!(matches!(pipeline(5).estimate(&empty), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_estimate_without_reference() {
        let p = Pipeline::new(None, Some(recipes()), MatchingConfig::default(), ScoringPolicy::Step);
        assert!(matches!(p.estimate(&["beef"]), Err(Error::ReferenceDataUnavailable(_))));
    }

    #[test]
    fn test_dataset_status() {
        let p = Pipeline::new(Some(reference()), None, MatchingConfig::default(), ScoringPolicy::Step);
        let status = p.dataset_status();
        assert_eq!(status.emissions_rows, Some(2));
        assert_eq!(status.recipe_rows, None);
        assert!(!status.all_loaded());
    }
}
