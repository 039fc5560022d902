//! Estimation services
//!
//! Resolver → Matcher → Aggregator, plus scoring and dataset acquisition.

pub mod dataset_fetcher;
pub mod impact_aggregator;
pub mod ingredient_matcher;
pub mod recipe_resolver;
pub mod remote_scorer;
pub mod similarity;
pub mod sustainability;

pub use dataset_fetcher::DatasetSource;
pub use impact_aggregator::{aggregate, equivalences, Breakdown, Equivalences, ImpactTotals};
pub use ingredient_matcher::{
    clean_ingredient, IngredientAliases, IngredientMatcher, MatchMethod, MatchResult, MatchSet,
};
pub use recipe_resolver::{DishAliases, RecipeResolver, Resolution};
pub use remote_scorer::{DishScore, RemoteScorer};
pub use similarity::{LevenshteinRatio, Similarity, TokenSetRatio};
