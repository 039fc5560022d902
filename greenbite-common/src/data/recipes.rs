//! Recipe table

use std::collections::HashMap;

/// One recipe: a title and its de-noised ingredient list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeEntry {
    pub title: String,
    pub ingredients: Vec<String>,
}

impl RecipeEntry {
    pub fn new(title: impl Into<String>, ingredients: Vec<String>) -> Self {
        Self {
            title: title.into(),
            ingredients,
        }
    }
}

/// Immutable in-memory recipe table, queried by title
///
/// A title may occur on several rows with different ingredient lists; all of
/// them are kept.
#[derive(Debug, Clone, Default)]
pub struct RecipeTable {
    rows: Vec<RecipeEntry>,
    /// Distinct titles in first-occurrence order
    titles: Vec<String>,
    /// Title → row indices in table order
    by_title: HashMap<String, Vec<usize>>,
}

impl RecipeTable {
    pub fn new(rows: Vec<RecipeEntry>) -> Self {
        let mut titles = Vec::new();
        let mut by_title: HashMap<String, Vec<usize>> = HashMap::new();

        for (i, row) in rows.iter().enumerate() {
            let slot = by_title.entry(row.title.clone()).or_default();
            if slot.is_empty() {
                titles.push(row.title.clone());
            }
            slot.push(i);
        }

        Self {
            rows,
            titles,
            by_title,
        }
    }

    pub fn rows(&self) -> &[RecipeEntry] {
        &self.rows
    }

    /// Distinct titles in first-occurrence order
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// Every row whose title equals `title` exactly, in table order
    pub fn rows_titled<'a>(&'a self, title: &str) -> impl Iterator<Item = &'a RecipeEntry> + 'a {
        self.by_title
            .get(title)
            .map(|indices| indices.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&i| &self.rows[i])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
