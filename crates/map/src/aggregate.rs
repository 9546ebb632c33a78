//! # Aggregation and Quantity Formatting
//!
//! Summary statistics over the visible records and the display rule used to
//! render them ("25.0k tCO₂e", "680 hectares").
//!
//! ## Table of Contents
//! 1. Summary — Count and totals
//! 2. aggregate — Fold over visible records
//! 3. Formatting

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use crate::ecosystem::EcosystemRecord;

/// Unit suffix for carbon storage
pub const CARBON_UNIT: &str = "tCO₂e";
/// Unit suffix for area
pub const AREA_UNIT: &str = "hectares";

// ============================================================================
// 1. Summary — Count and totals
// ============================================================================

/// Totals over a set of records. Additive over disjoint sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    /// Σ carbon_storage, tCO₂e
    pub total_carbon_storage: f64,
    /// Σ area, hectares
    pub total_area: f64,
}

impl Summary {
    /// Formatted strings for the summary strip
    pub fn display(&self) -> SummaryDisplay {
        SummaryDisplay {
            count: self.count.to_string(),
            total_carbon_storage: format_carbon_storage(self.total_carbon_storage),
            total_area: format_area(self.total_area),
        }
    }
}

impl Add for Summary {
    type Output = Summary;

    fn add(self, rhs: Summary) -> Summary {
        Summary {
            count: self.count + rhs.count,
            total_carbon_storage: self.total_carbon_storage + rhs.total_carbon_storage,
            total_area: self.total_area + rhs.total_area,
        }
    }
}

impl AddAssign for Summary {
    fn add_assign(&mut self, rhs: Summary) {
        *self = *self + rhs;
    }
}

impl Sum for Summary {
    fn sum<I: Iterator<Item = Summary>>(iter: I) -> Summary {
        iter.fold(Summary::default(), Add::add)
    }
}

impl<'a> From<&'a EcosystemRecord> for Summary {
    fn from(record: &'a EcosystemRecord) -> Self {
        Summary {
            count: 1,
            total_carbon_storage: record.carbon_storage,
            total_area: record.area,
        }
    }
}

/// Display-ready summary strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryDisplay {
    pub count: String,
    pub total_carbon_storage: String,
    pub total_area: String,
}

// ============================================================================
// 2. aggregate — Fold over visible records
// ============================================================================

/// Count and totals over `records`. Empty input yields the zero summary.
pub fn aggregate<'a, I>(records: I) -> Summary
where
    I: IntoIterator<Item = &'a EcosystemRecord>,
{
    records.into_iter().map(Summary::from).sum()
}

// ============================================================================
// 3. Formatting
// ============================================================================

/// `value >= 1000` → `"{value/1000:.1}k {unit}"`, otherwise `"{value} {unit}"`.
///
/// Thousands are rounded half away from zero (1250 → `"1.3k"`); plain `{:.1}`
/// would round that tie to even. Whole numbers below the threshold print
/// without a fraction, so `0` is `"0 tCO₂e"` and never `"0.0k"`.
pub fn format_quantity(value: f64, unit: &str) -> String {
    if value >= 1000.0 {
        let thousands = (value / 100.0).round() / 10.0;
        format!("{:.1}k {}", thousands, unit)
    } else {
        format!("{} {}", value, unit)
    }
}

pub fn format_carbon_storage(value: f64) -> String {
    format_quantity(value, CARBON_UNIT)
}

pub fn format_area(value: f64) -> String {
    format_quantity(value, AREA_UNIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecosystem::{EcosystemType, GeoPoint, ProjectStatus, StorageLevel};

    fn record(id: &str, storage: f64, area: f64) -> EcosystemRecord {
        EcosystemRecord {
            id: id.to_string(),
            ecosystem_type: EcosystemType::Seagrass,
            name: String::new(),
            location: GeoPoint::new(0.0, 0.0),
            area,
            carbon_storage: storage,
            storage_level: StorageLevel::Medium,
            project_status: ProjectStatus::Active,
            biodiversity_score: 0.0,
            community_impact: 0.0,
            description: String::new(),
        }
    }

    #[test]
    fn test_format_quantity_threshold() {
        assert_eq!(format_quantity(999.0, "tCO₂e"), "999 tCO₂e");
        assert_eq!(format_quantity(1000.0, "tCO₂e"), "1.0k tCO₂e");
        assert_eq!(format_quantity(25000.0, "tCO₂e"), "25.0k tCO₂e");
        assert_eq!(format_quantity(46300.0, "tCO₂e"), "46.3k tCO₂e");
        assert_eq!(format_quantity(0.0, "tCO₂e"), "0 tCO₂e");
    }

    #[test]
    fn test_format_quantity_rounds_ties_up() {
        assert_eq!(format_quantity(1250.0, "tCO₂e"), "1.3k tCO₂e");
        assert_eq!(format_area(2250.0), "2.3k hectares");
        assert_eq!(format_carbon_storage(1249.0), "1.2k tCO₂e");
        assert_eq!(format_carbon_storage(999_950.0), "1000.0k tCO₂e");
    }

    #[test]
    fn test_format_helpers_use_units() {
        assert_eq!(format_area(680.0), "680 hectares");
        assert_eq!(format_area(10000.0), "10.0k hectares");
        assert_eq!(format_carbon_storage(2400.0), "2.4k tCO₂e");
    }

    #[test]
    fn test_aggregate_scenario_totals() {
        let records = vec![
            record("a", 25000.0, 10000.0),
            record("b", 18900.0, 6100.0),
            record("c", 2400.0, 680.0),
        ];
        let summary = aggregate(&records);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.total_carbon_storage, 46300.0);
        assert_eq!(summary.total_area, 16780.0);
    }

    #[test]
    fn test_empty_aggregate_is_zero() {
        let summary = aggregate(std::iter::empty());
        assert_eq!(summary, Summary::default());
        let display = summary.display();
        assert_eq!(display.count, "0");
        assert_eq!(display.total_carbon_storage, "0 tCO₂e");
        assert_eq!(display.total_area, "0 hectares");
    }

    #[test]
    fn test_aggregate_is_additive_over_disjoint_sets() {
        let a = vec![record("a", 25000.0, 10000.0), record("b", 500.0, 20.0)];
        let b = vec![record("c", 2400.0, 680.0)];
        let union: Vec<EcosystemRecord> = a.iter().chain(b.iter()).cloned().collect();

        let mut combined = aggregate(&a);
        combined += aggregate(&b);
        assert_eq!(aggregate(&union), combined);
    }
}
