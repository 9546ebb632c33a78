//! # Filter Engine
//!
//! Reduces a record list to the visible subset. Three independent
//! dimensions; a record is visible when its value is selected in every
//! dimension (OR within a dimension, AND across dimensions).
//!
//! ## Table of Contents
//! 1. FilterDimension / FilterValue — Addressing a single checkbox
//! 2. FilterState — Selected values per dimension
//! 3. filter — Pure visible-subset computation

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ecosystem::{EcosystemRecord, EcosystemType, ProjectStatus, StorageLevel};

// ============================================================================
// 1. FilterDimension / FilterValue — Addressing a single checkbox
// ============================================================================

/// One of the three filter dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterDimension {
    EcosystemType,
    StorageLevel,
    ProjectStatus,
}

/// A single value within one dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "dimension", content = "value", rename_all = "snake_case")]
pub enum FilterValue {
    EcosystemType(EcosystemType),
    StorageLevel(StorageLevel),
    ProjectStatus(ProjectStatus),
}

impl FilterValue {
    pub fn dimension(self) -> FilterDimension {
        match self {
            FilterValue::EcosystemType(_) => FilterDimension::EcosystemType,
            FilterValue::StorageLevel(_) => FilterDimension::StorageLevel,
            FilterValue::ProjectStatus(_) => FilterDimension::ProjectStatus,
        }
    }
}

impl From<EcosystemType> for FilterValue {
    fn from(v: EcosystemType) -> Self {
        FilterValue::EcosystemType(v)
    }
}

impl From<StorageLevel> for FilterValue {
    fn from(v: StorageLevel) -> Self {
        FilterValue::StorageLevel(v)
    }
}

impl From<ProjectStatus> for FilterValue {
    fn from(v: ProjectStatus) -> Self {
        FilterValue::ProjectStatus(v)
    }
}

// ============================================================================
// 2. FilterState — Selected values per dimension
// ============================================================================

/// Selected values for each dimension.
/// Starts fully selected (no filtering); lives only for one display session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub ecosystem_types: BTreeSet<EcosystemType>,
    pub storage_levels: BTreeSet<StorageLevel>,
    pub project_statuses: BTreeSet<ProjectStatus>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::all()
    }
}

impl FilterState {
    /// Every value selected in every dimension
    pub fn all() -> Self {
        Self {
            ecosystem_types: EcosystemType::ALL.into_iter().collect(),
            storage_levels: StorageLevel::ALL.into_iter().collect(),
            project_statuses: ProjectStatus::ALL.into_iter().collect(),
        }
    }

    /// Nothing selected; every record is hidden
    pub fn none() -> Self {
        Self {
            ecosystem_types: BTreeSet::new(),
            storage_levels: BTreeSet::new(),
            project_statuses: BTreeSet::new(),
        }
    }

    pub fn is_selected(&self, value: impl Into<FilterValue>) -> bool {
        match value.into() {
            FilterValue::EcosystemType(v) => self.ecosystem_types.contains(&v),
            FilterValue::StorageLevel(v) => self.storage_levels.contains(&v),
            FilterValue::ProjectStatus(v) => self.project_statuses.contains(&v),
        }
    }

    /// Check or uncheck one value. Returns whether the state changed.
    pub fn set(&mut self, value: impl Into<FilterValue>, selected: bool) -> bool {
        fn apply<T: Ord>(set: &mut BTreeSet<T>, v: T, selected: bool) -> bool {
            if selected {
                set.insert(v)
            } else {
                set.remove(&v)
            }
        }
        match value.into() {
            FilterValue::EcosystemType(v) => apply(&mut self.ecosystem_types, v, selected),
            FilterValue::StorageLevel(v) => apply(&mut self.storage_levels, v, selected),
            FilterValue::ProjectStatus(v) => apply(&mut self.project_statuses, v, selected),
        }
    }

    /// Flip one value. Returns its new membership.
    pub fn toggle(&mut self, value: impl Into<FilterValue>) -> bool {
        let value = value.into();
        let selected = !self.is_selected(value);
        self.set(value, selected);
        selected
    }

    /// Select every value of one dimension. Returns whether the state changed.
    pub fn select_all(&mut self, dimension: FilterDimension) -> bool {
        let before = self.clone();
        match dimension {
            FilterDimension::EcosystemType => self.ecosystem_types.extend(EcosystemType::ALL),
            FilterDimension::StorageLevel => self.storage_levels.extend(StorageLevel::ALL),
            FilterDimension::ProjectStatus => self.project_statuses.extend(ProjectStatus::ALL),
        }
        *self != before
    }

    /// Deselect every value of one dimension. Returns whether the state changed.
    pub fn clear(&mut self, dimension: FilterDimension) -> bool {
        let changed = !self.dimension_is_empty(dimension);
        match dimension {
            FilterDimension::EcosystemType => self.ecosystem_types.clear(),
            FilterDimension::StorageLevel => self.storage_levels.clear(),
            FilterDimension::ProjectStatus => self.project_statuses.clear(),
        }
        changed
    }

    /// Back to all-selected. Returns whether the state changed.
    pub fn reset(&mut self) -> bool {
        let all = Self::all();
        if *self == all {
            false
        } else {
            *self = all;
            true
        }
    }

    pub fn dimension_is_empty(&self, dimension: FilterDimension) -> bool {
        match dimension {
            FilterDimension::EcosystemType => self.ecosystem_types.is_empty(),
            FilterDimension::StorageLevel => self.storage_levels.is_empty(),
            FilterDimension::ProjectStatus => self.project_statuses.is_empty(),
        }
    }

    /// True when every dimension is fully selected
    pub fn is_unfiltered(&self) -> bool {
        self.ecosystem_types.len() == EcosystemType::ALL.len()
            && self.storage_levels.len() == StorageLevel::ALL.len()
            && self.project_statuses.len() == ProjectStatus::ALL.len()
    }

    /// Visibility predicate for a single record
    pub fn matches(&self, record: &EcosystemRecord) -> bool {
        self.ecosystem_types.contains(&record.ecosystem_type)
            && self.storage_levels.contains(&record.storage_level)
            && self.project_statuses.contains(&record.project_status)
    }
}

// ============================================================================
// 3. filter — Pure visible-subset computation
// ============================================================================

/// Visible records, in input order. Pure: borrows, never mutates.
pub fn filter<'a>(records: &'a [EcosystemRecord], state: &FilterState) -> Vec<&'a EcosystemRecord> {
    records.iter().filter(|r| state.matches(r)).collect()
}

/// Indices of visible records, in input order
pub fn filter_indices(records: &[EcosystemRecord], state: &FilterState) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| state.matches(r))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecosystem::GeoPoint;

    fn record(id: &str, t: EcosystemType, level: StorageLevel, status: ProjectStatus) -> EcosystemRecord {
        EcosystemRecord {
            id: id.to_string(),
            ecosystem_type: t,
            name: String::new(),
            location: GeoPoint::new(10.0, 80.0),
            area: 100.0,
            carbon_storage: 1000.0,
            storage_level: level,
            project_status: status,
            biodiversity_score: 0.0,
            community_impact: 0.0,
            description: String::new(),
        }
    }

    fn sample() -> Vec<EcosystemRecord> {
        vec![
            record("a", EcosystemType::Mangrove, StorageLevel::High, ProjectStatus::Active),
            record("b", EcosystemType::Seagrass, StorageLevel::Medium, ProjectStatus::Active),
            record("c", EcosystemType::SaltMarsh, StorageLevel::Medium, ProjectStatus::Planned),
            record("d", EcosystemType::CoastalWetland, StorageLevel::Low, ProjectStatus::Completed),
            record("e", EcosystemType::Mangrove, StorageLevel::High, ProjectStatus::Protected),
        ]
    }

    fn ids(records: &[&EcosystemRecord]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_all_selected_is_identity() {
        let records = sample();
        let state = FilterState::default();
        assert!(state.is_unfiltered());
        assert_eq!(filter(&records, &state).len(), records.len());
    }

    #[test]
    fn test_any_empty_dimension_hides_everything() {
        let records = sample();
        for dim in [
            FilterDimension::EcosystemType,
            FilterDimension::StorageLevel,
            FilterDimension::ProjectStatus,
        ] {
            let mut state = FilterState::all();
            assert!(state.clear(dim));
            assert!(filter(&records, &state).is_empty());
        }
        assert!(filter(&records, &FilterState::none()).is_empty());
    }

    #[test]
    fn test_conjunctive_across_disjunctive_within() {
        let records = sample();
        let mut state = FilterState::all();
        state.set(StorageLevel::High, false);
        state.set(ProjectStatus::Completed, false);
        // Medium storage and not completed: b, c
        assert_eq!(ids(&filter(&records, &state)), vec!["b", "c"]);

        state.set(EcosystemType::Seagrass, false);
        assert_eq!(ids(&filter(&records, &state)), vec!["c"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let records = sample();
        let mut state = FilterState::all();
        state.toggle(EcosystemType::Mangrove);
        let once: Vec<EcosystemRecord> = filter(&records, &state).into_iter().cloned().collect();
        let twice = filter(&once, &state);
        assert_eq!(ids(&twice), once.iter().map(|r| r.id.clone()).collect::<Vec<_>>());
    }

    #[test]
    fn test_toggle_and_set_report_changes() {
        let mut state = FilterState::all();
        assert!(!state.toggle(ProjectStatus::Planned));
        assert!(!state.is_selected(ProjectStatus::Planned));
        assert!(state.toggle(ProjectStatus::Planned));
        assert!(!state.set(ProjectStatus::Planned, true));
        assert!(state.set(FilterValue::StorageLevel(StorageLevel::Low), false));
        assert!(!state.is_unfiltered());
        assert!(state.reset());
        assert!(!state.reset());
    }

    #[test]
    fn test_select_all_restores_dimension() {
        let mut state = FilterState::none();
        assert!(state.select_all(FilterDimension::StorageLevel));
        assert!(!state.select_all(FilterDimension::StorageLevel));
        assert_eq!(state.storage_levels.len(), 3);
        assert!(state.dimension_is_empty(FilterDimension::EcosystemType));
    }

    #[test]
    fn test_filter_indices_preserve_order() {
        let records = sample();
        let mut state = FilterState::all();
        state.set(EcosystemType::Mangrove, false);
        assert_eq!(filter_indices(&records, &state), vec![1, 2, 3]);
    }
}
