//! Emissions reference table

use super::CategoryValues;

/// One reference food product and its emission breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceEmissionRow {
    /// Product name as it appears in the dataset (original case)
    pub product_name: String,
    pub categories: CategoryValues,
}

impl ReferenceEmissionRow {
    pub fn new(product_name: impl Into<String>, categories: CategoryValues) -> Self {
        Self {
            product_name: product_name.into(),
            categories,
        }
    }
}

/// Immutable emissions reference table
///
/// Rows keep dataset order. Duplicate product names are kept as-is; every
/// lookup resolves to the first row in table order.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    rows: Vec<ReferenceEmissionRow>,
    /// Lower-cased, trimmed product names, parallel to `rows`
    lower_names: Vec<String>,
}

impl ReferenceTable {
    pub fn new(rows: Vec<ReferenceEmissionRow>) -> Self {
        let lower_names = rows
            .iter()
            .map(|r| r.product_name.trim().to_lowercase())
            .collect();
        Self { rows, lower_names }
    }

    pub fn rows(&self) -> &[ReferenceEmissionRow] {
        &self.rows
    }

    /// Lower-cased product names in table order
    pub fn lower_names(&self) -> &[String] {
        &self.lower_names
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row whose product name equals `name` case-insensitively
    pub fn find_exact(&self, name: &str) -> Option<(usize, &ReferenceEmissionRow)> {
        let needle = name.trim().to_lowercase();
        self.lower_names
            .iter()
            .position(|n| *n == needle)
            .map(|i| (i, &self.rows[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EmissionCategory;

    fn row(name: &str, total: f64) -> ReferenceEmissionRow {
        let mut values = CategoryValues::zero();
        values.set(EmissionCategory::TotalLandToRetail, total);
        ReferenceEmissionRow::new(name, values)
    }

    #[test]
    fn test_find_exact_is_case_insensitive() {
        let table = ReferenceTable::new(vec![row("Beef (beef herd)", 99.48), row("Cheese", 21.2)]);

        let (index, found) = table.find_exact("CHEESE").unwrap();
        assert_eq!(index, 1);
        assert_eq!(found.product_name, "Cheese");
        assert!(table.find_exact("lettuce").is_none());
    }

    #[test]
    fn test_duplicate_names_first_wins() {
        let table = ReferenceTable::new(vec![row("Milk", 3.15), row("milk", 9.99)]);

        let (index, found) = table.find_exact("milk").unwrap();
        assert_eq!(index, 0);
        assert_eq!(found.categories.get(EmissionCategory::TotalLandToRetail), 3.15);
        assert_eq!(table.len(), 2, "duplicates are not collapsed");
    }
}
