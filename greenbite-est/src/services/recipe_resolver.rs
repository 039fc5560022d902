//! Recipe Resolver
//!
//! Resolves a free-text dish name to candidate recipes from the recipe table.
//!
//! # Algorithm
//! 1. Normalize: lower-case, collapse whitespace, then substitute single words
//!    through the dish alias table (multi-word keys never match)
//! 2. Score every distinct title against the normalized query
//! 3. Keep up to `limit` best titles scoring at least `threshold`; ties keep
//!    table order
//! 4. Emit one candidate per table row carrying a retained title (duplicate
//!    titles with different ingredient lists are all included); rows whose
//!    ingredient list is empty after de-noising are skipped

use crate::services::similarity::{self, Similarity, TokenSetRatio};
use greenbite_common::data::parse_ingredient_list;
use greenbite_common::{Error, RecipeEntry, RecipeTable, Result};
use std::collections::HashMap;
use tracing::{debug, error};

/// Word-for-word synonym table applied to dish queries
#[derive(Debug, Clone)]
pub struct DishAliases {
    words: HashMap<String, String>,
}

impl Default for DishAliases {
    /// Built-in synonym table (regional names → common names)
    ///
    /// Entries with several alternatives resolve to the first one.
    fn default() -> Self {
        Self::from_pairs([
            // Vegetables
            ("aubergine", "eggplant"),
            ("brinjal", "eggplant"),
            ("courgette", "zucchini"),
            ("capsicum", "bell pepper"),
            ("ladyfinger", "okra"),
            ("spring onion", "green onion"),
            ("beetroot", "beet"),
            ("cilantro", "coriander"),
            ("mixed vegetables", "vegetables"),
            ("sweet corn", "corn"),
            ("yam", "sweet potato"),
            ("cauliflower", "gobi"),
            ("cabbage", "red cabbage"),
            // Fruits
            ("strawberries", "berries"),
            ("blueberries", "berries"),
            // Dairy
            ("cheddar cheese", "cheese"),
            ("mozzarella cheese", "cheese"),
            ("parmesan cheese", "cheese"),
            ("paneer", "cottage cheese"),
            ("ghee", "clarified butter"),
            ("yogurt (milk, cultures)", "yogurt"),
            // Meat and seafood
            ("chicken breast", "chicken"),
            ("salmon fillet", "salmon"),
            ("prawns", "shrimp"),
            // Pantry
            ("wheat flour", "flour"),
            ("olive oil", "oil"),
            ("black pepper", "peppercorns"),
            ("cinnamon", "cassia"),
            ("turmeric", "haldi"),
            ("chili powder", "red chili powder"),
            ("garam masala", "indian spice mix"),
        ])
    }
}

impl DishAliases {
    /// Build from (word, replacement) pairs; keys are matched lower-cased
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let words = pairs
            .into_iter()
            .map(|(k, v)| (k.into().trim().to_lowercase(), v.into()))
            .collect();
        Self { words }
    }

    /// An empty table (no substitution)
    pub fn empty() -> Self {
        Self {
            words: HashMap::new(),
        }
    }

    pub fn get(&self, word: &str) -> Option<&str> {
        self.words.get(word).map(String::as_str)
    }

    /// Lower-case, collapse whitespace and substitute each word independently
    pub fn normalize(&self, dish: &str) -> String {
        dish.to_lowercase()
            .split_whitespace()
            .map(|word| self.get(word).unwrap_or(word))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Candidate recipes for one dish query
///
/// `candidates[i]` was found under `titles[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub candidates: Vec<RecipeEntry>,
    pub titles: Vec<String>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}

/// Recipe Resolver
pub struct RecipeResolver {
    aliases: DishAliases,
    similarity: Box<dyn Similarity>,
}

impl Default for RecipeResolver {
    fn default() -> Self {
        Self::new(DishAliases::default(), Box::new(TokenSetRatio))
    }
}

impl RecipeResolver {
    pub fn new(aliases: DishAliases, similarity: Box<dyn Similarity>) -> Self {
        Self {
            aliases,
            similarity,
        }
    }

    /// Resolve a dish name to candidate recipes
    ///
    /// # Errors
    /// `InvalidInput` for an empty or whitespace-only dish name. Finding no
    /// title above `threshold` is not an error; neither is a missing table,
    /// which yields an empty resolution.
    pub fn resolve(
        &self,
        dish: &str,
        recipes: Option<&RecipeTable>,
        threshold: u8,
        limit: usize,
    ) -> Result<Resolution> {
        if dish.trim().is_empty() {
            return Err(Error::InvalidInput("No dish name provided".to_string()));
        }

        let Some(recipes) = recipes else {
            error!("Recipe dataset not loaded, returning no candidates");
            return Ok(Resolution::default());
        };

        let query = self.aliases.normalize(dish);
        let titles = recipes.titles();

        let retained: Vec<_> = similarity::extract(self.similarity.as_ref(), &query, titles, limit)
            .into_iter()
            .filter(|s| s.score >= threshold)
            .collect();

        let mut resolution = Resolution::default();
        for scored in &retained {
            let title = &titles[scored.index];
            for row in recipes.rows_titled(title) {
                let ingredients = denoise_ingredients(&row.ingredients);
                // Rows without ingredients are not usable recipes
                if ingredients.is_empty() {
                    continue;
                }
                resolution
                    .candidates
                    .push(RecipeEntry::new(row.title.clone(), ingredients));
                resolution.titles.push(title.clone());
            }
        }

        debug!(
            dish = %dish,
            query = %query,
            metric = self.similarity.name(),
            titles = retained.len(),
            candidates = resolution.len(),
            top_score = ?retained.first().map(|s| s.score),
            "Dish resolution complete"
        );

        Ok(resolution)
    }
}

/// Strip bracket/quote artifacts from each ingredient, re-splitting on commas
fn denoise_ingredients(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|ingredient| parse_ingredient_list(ingredient))
        .collect()
}
