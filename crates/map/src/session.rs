//! # Map Session
//!
//! Owns the state of one map display: the records, the filter selection,
//! the selected record and the cached visible subset. Interested parties
//! subscribe to change events instead of listening on global signals.
//!
//! ## Table of Contents
//! 1. MapEvent / SubscriptionId — Change notifications
//! 2. MapSession — State owner
//! 3. Mutations
//! 4. Accessors

use serde::Serialize;

use crate::aggregate::{aggregate, Summary};
use crate::ecosystem::EcosystemRecord;
use crate::error::{MapError, Result};
use crate::filter::{filter_indices, FilterDimension, FilterState, FilterValue};

// ============================================================================
// 1. MapEvent / SubscriptionId — Change notifications
// ============================================================================

/// Emitted after a mutation actually changed session state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MapEvent {
    /// The filter selection changed; carries the new visible summary
    FiltersChanged { summary: Summary },
    /// The selected record changed (`None` = selection cleared)
    SelectionChanged { id: Option<String> },
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&MapEvent)>;

// ============================================================================
// 2. MapSession — State owner
// ============================================================================

/// State for a single map display session
pub struct MapSession {
    records: Vec<EcosystemRecord>,
    filters: FilterState,
    selected: Option<usize>,
    visible: Vec<usize>,
    summary: Summary,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl std::fmt::Debug for MapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSession")
            .field("records", &self.records.len())
            .field("filters", &self.filters)
            .field("selected", &self.selected)
            .field("visible", &self.visible.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl MapSession {
    /// Start a session with every filter value selected
    pub fn new(records: Vec<EcosystemRecord>) -> Self {
        Self::with_filters(records, FilterState::all())
    }

    /// Start a session with an initial filter selection
    pub fn with_filters(records: Vec<EcosystemRecord>, filters: FilterState) -> Self {
        let mut session = Self {
            records,
            filters,
            selected: None,
            visible: Vec::new(),
            summary: Summary::default(),
            subscribers: Vec::new(),
            next_subscription: 0,
        };
        session.recompute();
        session
    }

    /// Register a callback for change events. Callbacks run synchronously,
    /// in registration order, after the state has been updated.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&MapEvent) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn emit(&mut self, event: MapEvent) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&event);
        }
    }

    fn recompute(&mut self) {
        self.visible = filter_indices(&self.records, &self.filters);
        self.summary = aggregate(self.visible.iter().map(|&i| &self.records[i]));
        tracing::debug!(
            "Filter recompute: {} of {} records visible",
            self.visible.len(),
            self.records.len()
        );
    }

    // ========================================================================
    // 3. Mutations
    // ========================================================================

    /// Flip one filter value. Returns its new membership.
    pub fn toggle(&mut self, value: impl Into<FilterValue>) -> bool {
        let selected = self.filters.toggle(value);
        self.filters_changed();
        selected
    }

    /// Check or uncheck one filter value. Returns whether anything changed.
    pub fn set_filter(&mut self, value: impl Into<FilterValue>, selected: bool) -> bool {
        let changed = self.filters.set(value, selected);
        if changed {
            self.filters_changed();
        }
        changed
    }

    /// Select or clear every value of one dimension
    pub fn set_dimension(&mut self, dimension: FilterDimension, selected: bool) -> bool {
        let changed = if selected {
            self.filters.select_all(dimension)
        } else {
            self.filters.clear(dimension)
        };
        if changed {
            self.filters_changed();
        }
        changed
    }

    /// Back to all-selected
    pub fn reset_filters(&mut self) -> bool {
        let changed = self.filters.reset();
        if changed {
            self.filters_changed();
        }
        changed
    }

    fn filters_changed(&mut self) {
        self.recompute();
        let summary = self.summary;
        self.emit(MapEvent::FiltersChanged { summary });

        // A selection hidden by the new filters is dropped
        if let Some(index) = self.selected {
            if self.visible.binary_search(&index).is_err() {
                self.selected = None;
                self.emit(MapEvent::SelectionChanged { id: None });
            }
        }
    }

    /// Select a visible record by id
    pub fn select(&mut self, id: &str) -> Result<&EcosystemRecord> {
        let index = self
            .visible
            .iter()
            .copied()
            .find(|&i| self.records[i].id == id)
            .ok_or_else(|| MapError::UnknownRecord(id.to_string()))?;

        if self.selected != Some(index) {
            self.selected = Some(index);
            self.emit(MapEvent::SelectionChanged {
                id: Some(id.to_string()),
            });
        }
        Ok(&self.records[index])
    }

    /// Clear the selection. Returns whether something was selected.
    pub fn clear_selection(&mut self) -> bool {
        if self.selected.take().is_some() {
            self.emit(MapEvent::SelectionChanged { id: None });
            true
        } else {
            false
        }
    }

    // ========================================================================
    // 4. Accessors
    // ========================================================================

    pub fn records(&self) -> &[EcosystemRecord] {
        &self.records
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Visible records, in input order (cached; recomputed on filter changes)
    pub fn visible(&self) -> impl Iterator<Item = &EcosystemRecord> + '_ {
        self.visible.iter().map(|&i| &self.records[i])
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Summary of the visible records
    pub fn summary(&self) -> Summary {
        self.summary
    }

    pub fn selected(&self) -> Option<&EcosystemRecord> {
        self.selected.map(|i| &self.records[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecosystem::{EcosystemType, GeoPoint, ProjectStatus, StorageLevel};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record(id: &str, t: EcosystemType, storage: f64) -> EcosystemRecord {
        EcosystemRecord {
            id: id.to_string(),
            ecosystem_type: t,
            name: String::new(),
            location: GeoPoint::new(15.0, 80.0),
            area: 100.0,
            carbon_storage: storage,
            storage_level: StorageLevel::High,
            project_status: ProjectStatus::Active,
            biodiversity_score: 0.0,
            community_impact: 0.0,
            description: String::new(),
        }
    }

    fn session() -> MapSession {
        MapSession::new(vec![
            record("mangrove-1", EcosystemType::Mangrove, 25000.0),
            record("everglades-1", EcosystemType::CoastalWetland, 18900.0),
            record("wetland-1", EcosystemType::CoastalWetland, 2400.0),
        ])
    }

    fn recorder(session: &mut MapSession) -> Rc<RefCell<Vec<MapEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        session.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        events
    }

    #[test]
    fn test_toggle_notifies_with_new_summary() {
        let mut session = session();
        assert_eq!(session.summary().total_carbon_storage, 46300.0);
        let events = recorder(&mut session);

        assert!(!session.toggle(EcosystemType::Mangrove));
        assert_eq!(session.visible_count(), 2);

        let events = events.borrow();
        assert_eq!(events.len(), 1);
        match &events[0] {
            MapEvent::FiltersChanged { summary } => {
                assert_eq!(summary.count, 2);
                assert_eq!(summary.total_carbon_storage, 21300.0);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_noop_mutations_emit_nothing() {
        let mut session = session();
        let events = recorder(&mut session);
        assert!(!session.set_filter(StorageLevel::Low, true));
        assert!(!session.reset_filters());
        assert!(!session.clear_selection());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_selection_cleared_when_filtered_out() {
        let mut session = session();
        session.select("mangrove-1").unwrap();
        let events = recorder(&mut session);

        session.toggle(EcosystemType::Mangrove);
        assert!(session.selected().is_none());
        assert_eq!(
            events.borrow().last(),
            Some(&MapEvent::SelectionChanged { id: None })
        );
    }

    #[test]
    fn test_select_unknown_or_hidden_record_fails() {
        let mut session = session();
        assert!(matches!(session.select("nope"), Err(MapError::UnknownRecord(_))));
        session.set_dimension(FilterDimension::EcosystemType, false);
        assert_eq!(session.visible_count(), 0);
        assert!(session.select("wetland-1").is_err());
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut session = session();
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        let id = session.subscribe(move |_| *c.borrow_mut() += 1);

        session.toggle(ProjectStatus::Active);
        assert!(session.unsubscribe(id));
        assert!(!session.unsubscribe(id));
        session.toggle(ProjectStatus::Active);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_initial_filters_apply() {
        let mut filters = FilterState::all();
        filters.set(EcosystemType::CoastalWetland, false);
        let session = MapSession::with_filters(session().records().to_vec(), filters);
        let ids: Vec<&str> = session.visible().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["mangrove-1"]);
    }
}
