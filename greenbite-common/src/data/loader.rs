//! Tabular dataset loaders
//!
//! Both datasets are CSV files, optionally gzip-compressed (`.gz` suffix).
//! Loaders validate the required columns up front: a table that lacks them is
//! reported as unavailable rather than failing later on first use.

use super::{CategoryValues, EmissionCategory, RecipeEntry, RecipeTable, ReferenceEmissionRow, ReferenceTable};
use crate::{Error, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// Product name column of the emissions dataset
pub const PRODUCT_COLUMN: &str = "Food product";
/// Title column of the recipe dataset
pub const TITLE_COLUMN: &str = "title";
/// Ingredient columns of the recipe dataset, in preference order
pub const INGREDIENT_COLUMNS: [&str; 2] = ["NER", "ingredients"];

/// Open a dataset file, transparently decompressing `.gz`
pub fn open_dataset(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| {
        Error::ReferenceDataUnavailable(format!("cannot open {}: {}", path.display(), e))
    })?;
    let reader = BufReader::new(file);

    let is_gzip = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    if is_gzip {
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

/// Coerce a raw dataset cell to f64
///
/// Missing, non-numeric and non-finite values become 0.0; this never fails.
pub fn coerce_value(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            debug!(value = %trimmed, "Non-numeric emission value, using 0.0");
            0.0
        }
    }
}

/// Split a serialized ingredient cell into clean tokens
///
/// Accepts list-literal cells (`["beef", "cheese"]`) as well as plain
/// delimiter-joined strings. Bracket and quote characters are stripped, tokens
/// trimmed, empty tokens dropped; order is preserved.
pub fn parse_ingredient_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|token| {
            token
                .chars()
                .filter(|c| !matches!(c, '[' | ']' | '"'))
                .collect::<String>()
                .trim()
                .to_string()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

/// Load the emissions reference table from a file
pub fn load_reference_table(path: &Path) -> Result<ReferenceTable> {
    let table = reference_table_from_reader(open_dataset(path)?)?;
    info!(
        rows = table.len(),
        path = %path.display(),
        "Emissions reference data loaded"
    );
    Ok(table)
}

/// Parse an emissions reference table from CSV
pub fn reference_table_from_reader<R: Read>(reader: R) -> Result<ReferenceTable> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();

    let product_idx = column_index(&headers, PRODUCT_COLUMN).ok_or_else(|| {
        Error::ReferenceDataUnavailable(format!("missing required column '{}'", PRODUCT_COLUMN))
    })?;

    let mut category_idx = Vec::with_capacity(EmissionCategory::ALL.len());
    let mut missing = Vec::new();
    for category in EmissionCategory::ALL {
        match column_index(&headers, category.column_name()) {
            Some(i) => category_idx.push((category, i)),
            None => missing.push(category.column_name()),
        }
    }
    if !missing.is_empty() {
        return Err(Error::ReferenceDataUnavailable(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let product = record.get(product_idx).unwrap_or("").trim();
        if product.is_empty() {
            debug!("Skipping reference row without a product name");
            continue;
        }

        let categories: CategoryValues = category_idx
            .iter()
            .map(|&(category, i)| (category, coerce_value(record.get(i).unwrap_or(""))))
            .collect();

        rows.push(ReferenceEmissionRow::new(product, categories));
    }

    Ok(ReferenceTable::new(rows))
}

/// Load the recipe table from a file
pub fn load_recipe_table(path: &Path) -> Result<RecipeTable> {
    let table = recipe_table_from_reader(open_dataset(path)?)?;
    info!(
        rows = table.len(),
        titles = table.titles().len(),
        path = %path.display(),
        "Recipe data loaded"
    );
    Ok(table)
}

/// Parse a recipe table from CSV
pub fn recipe_table_from_reader<R: Read>(reader: R) -> Result<RecipeTable> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();

    let title_idx = column_index(&headers, TITLE_COLUMN).ok_or_else(|| {
        Error::ReferenceDataUnavailable(format!("missing required column '{}'", TITLE_COLUMN))
    })?;
    let ingredients_idx = INGREDIENT_COLUMNS
        .iter()
        .find_map(|name| column_index(&headers, name))
        .ok_or_else(|| {
            Error::ReferenceDataUnavailable(format!(
                "missing ingredient column (expected one of: {})",
                INGREDIENT_COLUMNS.join(", ")
            ))
        })?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let title = record.get(title_idx).unwrap_or("").trim();
        if title.is_empty() {
            continue;
        }
        let ingredients = parse_ingredient_list(record.get(ingredients_idx).unwrap_or(""));
        rows.push(RecipeEntry::new(title, ingredients));
    }

    Ok(RecipeTable::new(rows))
}
