//! Ingredient Matcher
//!
//! Resolves each raw ingredient string to at most one row of the emissions
//! reference table.
//!
//! # Matching Steps (first success wins)
//! 1. **Clean**: strip `[`, `]`, `"`; lower-case; drop noise tokens (`mix`,
//!    `adjust`, `whls`); collapse whitespace
//! 2. **Alias**: exact lookup of the cleaned string in the alias table
//! 3. **Exact**: case-insensitive equality with a product name
//! 4. **Substring**: cleaned string inside a product name, or a product name
//!    inside the cleaned string. The first row in table order wins, so the
//!    outcome depends on row order. This is deliberately loose.
//! 5. **Approximate**: best similarity score, accepted at `threshold` or above
//! 6. **Unmatched**: all-zero categories. A normal outcome, never an error.
//!
//! Results are keyed by the original input string, never by the matched
//! product, so two inputs resolving to the same product both stay visible.

use crate::services::similarity::{self, Similarity, TokenSetRatio};
use greenbite_common::{CategoryValues, ReferenceEmissionRow, ReferenceTable};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, error, info};

/// Tokens removed during cleaning
const NOISE_TOKENS: [&str; 3] = ["mix", "adjust", "whls"];

/// Many-to-one table from cleaned ingredient text to a canonical product name
#[derive(Debug, Clone)]
pub struct IngredientAliases {
    map: HashMap<String, String>,
}

impl Default for IngredientAliases {
    /// Built-in table mapping common recipe ingredients to reference products
    fn default() -> Self {
        Self::from_pairs([
            // Meats
            ("hamburger", "beef (beef herd)"),
            ("beef", "beef (beef herd)"),
            ("ground beef", "beef (beef herd)"),
            ("steak", "beef (beef herd)"),
            ("chicken", "poultry meat"),
            ("poultry", "poultry meat"),
            ("pork", "pig meat"),
            ("bacon", "pig meat"),
            ("lamb", "lamb & mutton"),
            ("mutton", "lamb & mutton"),
            // Dairy
            ("cheese", "cheese"),
            ("cheddar", "cheese"),
            ("mozzarella", "cheese"),
            ("parmesan", "cheese"),
            ("milk", "milk"),
            ("cream", "milk"),
            ("yogurt", "milk"),
            // Vegetables
            ("onion", "onions & leeks"),
            ("leek", "onions & leeks"),
            ("tomato", "tomatoes"),
            ("tomato sauce", "tomatoes"),
            ("ketchup", "tomatoes"),
            ("potato", "potatoes"),
            ("carrot", "root vegetables"),
            ("beet", "root vegetables"),
            ("peas", "peas"),
            ("beans", "other pulses"),
            ("lentils", "other pulses"),
            // Grains
            ("rice", "rice"),
            ("wheat", "wheat & rye"),
            ("rye", "wheat & rye"),
            ("oats", "oatmeal"),
            ("rolled oats", "oatmeal"),
            ("barley", "barley"),
            ("corn", "maize"),
            ("maize", "maize"),
            // Fruits
            ("apple", "apples"),
            ("banana", "bananas"),
            ("orange", "citrus fruit"),
            ("lemon", "citrus fruit"),
            ("grape", "berries & grapes"),
            ("berry", "berries & grapes"),
            // Other
            ("egg", "eggs"),
            ("eggs", "eggs"),
            ("egg whites", "eggs"),
            ("water", "water"),
            ("chili", "other vegetables"),
            ("chili powder", "other vegetables"),
            ("tabasco", "other vegetables"),
            ("tabasco sauce", "other vegetables"),
            ("onion soup", "onions & leeks"),
            ("sugar", "beet sugar"),
            ("brown sugar", "beet sugar"),
            ("white sugar", "beet sugar"),
            ("coffee", "coffee"),
            ("chocolate", "dark chocolate"),
            ("cocoa", "dark chocolate"),
        ])
    }
}

impl IngredientAliases {
    /// Build from (ingredient, product) pairs; keys are cleaned on insert
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let map = pairs
            .into_iter()
            .map(|(k, v)| (clean_ingredient(k.as_ref()), v.into()))
            .collect();
        Self { map }
    }

    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn get(&self, cleaned: &str) -> Option<&str> {
        self.map.get(cleaned).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Standardize ingredient text before lookup
pub fn clean_ingredient(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '"'))
        .collect::<String>()
        .to_lowercase();

    stripped
        .split_whitespace()
        .filter(|token| !NOISE_TOKENS.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Which step produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchMethod {
    Exact,
    Substring,
    Approximate { score: u8 },
    Unmatched,
}

/// Outcome of matching one input ingredient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// Original input text (the result key)
    pub input_text: String,
    /// Reference product name in dataset case, `None` when unmatched
    pub matched_product: Option<String>,
    /// True when the alias table rewrote the cleaned text
    pub aliased: bool,
    pub method: MatchMethod,
    /// Emission values of the matched row; all zero when unmatched
    pub categories: CategoryValues,
}

impl MatchResult {
    fn matched(input: &str, row: &ReferenceEmissionRow, aliased: bool, method: MatchMethod) -> Self {
        Self {
            input_text: input.to_string(),
            matched_product: Some(row.product_name.clone()),
            aliased,
            method,
            categories: row.categories,
        }
    }

    fn unmatched(input: &str, aliased: bool) -> Self {
        Self {
            input_text: input.to_string(),
            matched_product: None,
            aliased,
            method: MatchMethod::Unmatched,
            categories: CategoryValues::zero(),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.matched_product.is_some()
    }
}

/// Match results keyed by input string, in first-seen input order
///
/// Serializes as a JSON object keyed by input string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchSet {
    results: Vec<MatchResult>,
    index: HashMap<String, usize>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, replacing any earlier result for the same input in place
    pub fn insert(&mut self, result: MatchResult) {
        match self.index.get(&result.input_text) {
            Some(&i) => self.results[i] = result,
            None => {
                self.index.insert(result.input_text.clone(), self.results.len());
                self.results.push(result);
            }
        }
    }

    pub fn get(&self, input: &str) -> Option<&MatchResult> {
        self.index.get(input).map(|&i| &self.results[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn matched_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_matched()).count()
    }
}

impl FromIterator<MatchResult> for MatchSet {
    fn from_iter<I: IntoIterator<Item = MatchResult>>(iter: I) -> Self {
        let mut set = MatchSet::new();
        for result in iter {
            set.insert(result);
        }
        set
    }
}

impl Serialize for MatchSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.results.len()))?;
        for result in &self.results {
            map.serialize_entry(&result.input_text, result)?;
        }
        map.end()
    }
}

/// Ingredient Matcher
pub struct IngredientMatcher {
    aliases: IngredientAliases,
    similarity: Box<dyn Similarity>,
}

impl Default for IngredientMatcher {
    fn default() -> Self {
        Self::new(IngredientAliases::default(), Box::new(TokenSetRatio))
    }
}

impl IngredientMatcher {
    pub fn new(aliases: IngredientAliases, similarity: Box<dyn Similarity>) -> Self {
        Self {
            aliases,
            similarity,
        }
    }

    /// Match every ingredient against the reference table
    ///
    /// Without a reference table the result is empty (logged, not raised).
    /// Otherwise every distinct input yields exactly one result.
    pub fn match_all<S: AsRef<str>>(
        &self,
        ingredients: &[S],
        reference: Option<&ReferenceTable>,
        threshold: u8,
    ) -> MatchSet {
        let Some(reference) = reference else {
            error!("Emissions dataset not loaded, no ingredients matched");
            return MatchSet::new();
        };

        let set: MatchSet = ingredients
            .iter()
            .map(|ingredient| self.match_one(ingredient.as_ref(), reference, threshold))
            .collect();

        info!(
            ingredients = set.len(),
            matched = set.matched_count(),
            "Ingredient matching complete"
        );
        set
    }

    /// Match a single ingredient
    pub fn match_one(&self, ingredient: &str, reference: &ReferenceTable, threshold: u8) -> MatchResult {
        let cleaned = clean_ingredient(ingredient);
        let (target, aliased) = match self.aliases.get(&cleaned) {
            Some(product) => (product.to_lowercase(), true),
            None => (cleaned, false),
        };

        let found = self
            .find_exact(&target, reference)
            .or_else(|| self.find_substring(&target, reference))
            .or_else(|| self.find_approximate(&target, reference, threshold));

        match found {
            Some((row_index, method)) => {
                let row = &reference.rows()[row_index];
                debug!(
                    ingredient = %ingredient,
                    product = %row.product_name,
                    method = ?method,
                    aliased,
                    total = row.categories.get(greenbite_common::EmissionCategory::TotalLandToRetail),
                    "Matched ingredient"
                );
                MatchResult::matched(ingredient, row, aliased, method)
            }
            None => {
                debug!(ingredient = %ingredient, cleaned = %target, "No match found for ingredient");
                MatchResult::unmatched(ingredient, aliased)
            }
        }
    }

    fn find_exact(&self, target: &str, reference: &ReferenceTable) -> Option<(usize, MatchMethod)> {
        reference
            .find_exact(target)
            .map(|(i, _)| (i, MatchMethod::Exact))
    }

    fn find_substring(&self, target: &str, reference: &ReferenceTable) -> Option<(usize, MatchMethod)> {
        // An empty needle is a substring of everything
        if target.is_empty() {
            return None;
        }
        reference
            .lower_names()
            .iter()
            .position(|name| !name.is_empty() && (name.contains(target) || target.contains(name.as_str())))
            .map(|i| (i, MatchMethod::Substring))
    }

    fn find_approximate(
        &self,
        target: &str,
        reference: &ReferenceTable,
        threshold: u8,
    ) -> Option<(usize, MatchMethod)> {
        let best = similarity::best_match(self.similarity.as_ref(), target, reference.lower_names())?;
        if best.score >= threshold {
            Some((best.index, MatchMethod::Approximate { score: best.score }))
        } else {
            None
        }
    }
}
