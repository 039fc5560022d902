//! Emission categories and per-category value sets

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;

/// One life-cycle stage (or pre-aggregated total) of the reference dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EmissionCategory {
    LandUseChange,
    Feed,
    Farm,
    Processing,
    Transport,
    Packaging,
    Retail,
    /// Pre-aggregated "Total from Land to Retail" column; source of truth for totals
    TotalLandToRetail,
    /// "Total Global Average GHG Emissions per kg" column
    TotalGlobalAverage,
}

impl EmissionCategory {
    /// All categories, in dataset column order
    pub const ALL: [EmissionCategory; 9] = [
        EmissionCategory::LandUseChange,
        EmissionCategory::Feed,
        EmissionCategory::Farm,
        EmissionCategory::Processing,
        EmissionCategory::Transport,
        EmissionCategory::Packaging,
        EmissionCategory::Retail,
        EmissionCategory::TotalLandToRetail,
        EmissionCategory::TotalGlobalAverage,
    ];

    /// Categories reported in a dish breakdown (the global average is per-kg only)
    pub const REPORTED: [EmissionCategory; 8] = [
        EmissionCategory::LandUseChange,
        EmissionCategory::Feed,
        EmissionCategory::Farm,
        EmissionCategory::Processing,
        EmissionCategory::Transport,
        EmissionCategory::Packaging,
        EmissionCategory::Retail,
        EmissionCategory::TotalLandToRetail,
    ];

    /// Column header used by the reference dataset
    pub fn column_name(self) -> &'static str {
        match self {
            EmissionCategory::LandUseChange => "Land Use Change",
            EmissionCategory::Feed => "Feed",
            EmissionCategory::Farm => "Farm",
            EmissionCategory::Processing => "Processing",
            EmissionCategory::Transport => "Transport",
            EmissionCategory::Packaging => "Packaging",
            EmissionCategory::Retail => "Retail",
            EmissionCategory::TotalLandToRetail => "Total from Land to Retail",
            EmissionCategory::TotalGlobalAverage => "Total Global Average GHG Emissions per kg",
        }
    }

    /// Reverse lookup from a dataset column header (exact, after trimming)
    pub fn from_column_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|c| c.column_name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EmissionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl Serialize for EmissionCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.column_name())
    }
}

/// One float per emission category
///
/// Serializes as a JSON object keyed by dataset column name.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryValues {
    values: [f64; 9],
}

impl CategoryValues {
    /// All categories 0.0 (the value set of an unmatched ingredient)
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, category: EmissionCategory) -> f64 {
        self.values[category.index()]
    }

    pub fn set(&mut self, category: EmissionCategory, value: f64) {
        self.values[category.index()] = value;
    }

    /// Category-wise sum
    pub fn add(&mut self, other: &CategoryValues) {
        for (acc, v) in self.values.iter_mut().zip(other.values.iter()) {
            *acc += v;
        }
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    /// (category, value) pairs in dataset column order
    pub fn iter(&self) -> impl Iterator<Item = (EmissionCategory, f64)> + '_ {
        EmissionCategory::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

impl FromIterator<(EmissionCategory, f64)> for CategoryValues {
    fn from_iter<I: IntoIterator<Item = (EmissionCategory, f64)>>(iter: I) -> Self {
        let mut values = CategoryValues::zero();
        for (category, value) in iter {
            values.set(category, value);
        }
        values
    }
}

impl Serialize for CategoryValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(EmissionCategory::ALL.len()))?;
        for (category, value) in self.iter() {
            map.serialize_entry(category.column_name(), &value)?;
        }
        map.end()
    }
}
