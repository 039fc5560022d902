//! Impact Aggregator
//!
//! Sums per-category emissions across matched ingredients and converts the
//! dish total into relatable equivalences.
//!
//! The dish total is the summed "Total from Land to Retail" column. It is
//! never recomputed from the per-stage columns, which need not add up to the
//! pre-aggregated figure in the reference data.

use crate::services::ingredient_matcher::MatchSet;
use greenbite_common::{CategoryValues, EmissionCategory};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::debug;

/// Kilometres driven by a petrol car per kg CO2e
pub const CAR_KM_PER_KG: f64 = 4.5;
/// Smartphone full charges per kg CO2e
pub const SMARTPHONE_CHARGES_PER_KG: f64 = 122.0;
/// Single-use plastic bags per kg CO2e
pub const PLASTIC_BAGS_PER_KG: f64 = 20.0;
/// Hours of a 10 W LED bulb per kg CO2e
pub const LED_HOURS_PER_KG: f64 = 10.0;

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Per-category sums across a set of match results
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImpactTotals {
    sums: CategoryValues,
    /// Number of results folded in, matched or not
    contributions: usize,
}

impl ImpactTotals {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, category: EmissionCategory) -> f64 {
        self.sums.get(category)
    }

    pub fn sums(&self) -> &CategoryValues {
        &self.sums
    }

    /// Summed TotalLandToRetail
    pub fn total_emissions(&self) -> f64 {
        self.sums.get(EmissionCategory::TotalLandToRetail)
    }

    pub fn contributions(&self) -> usize {
        self.contributions
    }

    /// Fold one ingredient's values in
    pub fn add(&mut self, values: &CategoryValues) {
        self.sums.add(values);
        self.contributions += 1;
    }

    /// Combine totals of two disjoint match sets
    pub fn merge(mut self, other: &ImpactTotals) -> Self {
        self.sums.add(&other.sums);
        self.contributions += other.contributions;
        self
    }

    /// Reported categories rounded to 3 decimals
    ///
    /// Empty when nothing was aggregated.
    pub fn breakdown(&self) -> Breakdown {
        if self.contributions == 0 {
            return Breakdown::default();
        }
        Breakdown {
            entries: EmissionCategory::REPORTED
                .iter()
                .map(|&c| (c, round_to(self.sums.get(c), 3)))
                .collect(),
        }
    }
}

/// Sum every category across all results
///
/// Unmatched results carry all-zero categories and add nothing.
pub fn aggregate(matches: &MatchSet) -> ImpactTotals {
    let mut totals = ImpactTotals::zero();
    for result in matches.iter() {
        totals.add(&result.categories);
    }
    debug!(
        results = totals.contributions(),
        total_emissions = totals.total_emissions(),
        "Aggregated emissions"
    );
    totals
}

/// Rounded per-category totals, serialized as an object keyed by column name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Breakdown {
    entries: Vec<(EmissionCategory, f64)>,
}

impl Breakdown {
    pub fn get(&self, category: EmissionCategory) -> Option<f64> {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, v)| *v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Serialize for Breakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (category, value) in &self.entries {
            map.serialize_entry(category.column_name(), value)?;
        }
        map.end()
    }
}

/// Everyday equivalents of a dish's emissions
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Equivalences {
    /// Kilometres, one decimal
    pub car_distance: f64,
    pub smartphone_charges: u64,
    pub plastic_bags: u64,
    pub led_bulb_hours: u64,
}

/// Convert kg CO2e into equivalences; non-positive or NaN input gives zeros
pub fn equivalences(total_emissions: f64) -> Equivalences {
    if !total_emissions.is_finite() || total_emissions <= 0.0 {
        return Equivalences::default();
    }
    Equivalences {
        car_distance: round_to(total_emissions * CAR_KM_PER_KG, 1),
        smartphone_charges: (total_emissions * SMARTPHONE_CHARGES_PER_KG).round() as u64,
        plastic_bags: (total_emissions * PLASTIC_BAGS_PER_KG).round() as u64,
        led_bulb_hours: (total_emissions * LED_HOURS_PER_KG).round() as u64,
    }
}
