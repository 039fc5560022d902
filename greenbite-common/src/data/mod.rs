//! Reference data model and loaders
//!
//! Both tables are loaded once at process start and are read-only afterwards.

pub mod category;
pub mod loader;
pub mod recipes;
pub mod reference;

pub use category::{CategoryValues, EmissionCategory};
pub use loader::{
    coerce_value, load_recipe_table, load_reference_table, parse_ingredient_list,
    recipe_table_from_reader, reference_table_from_reader,
};
pub use recipes::{RecipeEntry, RecipeTable};
pub use reference::{ReferenceEmissionRow, ReferenceTable};
