//! # GreenBite Common Library
//!
//! Shared code for GreenBite services including:
//! - Error taxonomy (Error enum)
//! - Configuration loading (TOML + config path resolution)
//! - Reference data model (emission categories, reference rows, recipes)
//! - Tabular dataset loaders (CSV, gzip-compressed CSV)

pub mod config;
pub mod data;
pub mod error;

pub use data::{
    CategoryValues, EmissionCategory, RecipeEntry, RecipeTable, ReferenceEmissionRow,
    ReferenceTable,
};
pub use error::{Error, Result};
