//! # Marker Spatial Index
//!
//! R-tree over projected marker positions so clicks on the overlay resolve
//! to records without scanning every marker. Coordinates are overlay
//! percentages (x right, y down).
//!
//! ## Table of Contents
//! 1. MarkerIndex — R-tree wrapper
//! 2. IndexedMarker — R-tree entry

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::render::Marker;

// ============================================================================
// 1. MarkerIndex — R-tree wrapper
// ============================================================================

/// R-tree of marker positions
#[derive(Debug, Default)]
pub struct MarkerIndex {
    tree: RTree<IndexedMarker>,
}

impl MarkerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk-load rendered markers (much faster than individual inserts)
    pub fn from_markers(markers: &[Marker]) -> Self {
        Self {
            tree: RTree::bulk_load(markers.iter().map(IndexedMarker::from).collect()),
        }
    }

    pub fn insert(&mut self, marker: IndexedMarker) {
        self.tree.insert(marker);
    }

    /// Marker closest to a point
    pub fn nearest(&self, x_pct: f64, y_pct: f64) -> Option<&IndexedMarker> {
        self.tree.nearest_neighbor(&[x_pct, y_pct])
    }

    /// Topmost marker within `radius` (percent units) of a click.
    ///
    /// Markers drawn later sit on top, so the highest `order` wins among hits.
    pub fn hit_test(&self, x_pct: f64, y_pct: f64, radius: f64) -> Option<&IndexedMarker> {
        self.within_radius(x_pct, y_pct, radius)
            .into_iter()
            .max_by_key(|m| m.order)
    }

    /// All markers within `radius` of a point
    pub fn within_radius(&self, x_pct: f64, y_pct: f64, radius: f64) -> Vec<&IndexedMarker> {
        self.tree
            .locate_within_distance([x_pct, y_pct], radius * radius)
            .collect()
    }

    /// Markers inside an axis-aligned rectangle
    pub fn query_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<&IndexedMarker> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.tree.locate_in_envelope(&envelope).collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

// ============================================================================
// 2. IndexedMarker — R-tree entry
// ============================================================================

/// A marker entry in the index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedMarker {
    /// Record id
    pub id: String,
    pub x_pct: f64,
    pub y_pct: f64,
    /// Draw order of the marker
    pub order: usize,
}

impl From<&Marker> for IndexedMarker {
    fn from(marker: &Marker) -> Self {
        Self {
            id: marker.id.clone(),
            x_pct: marker.position.x_pct,
            y_pct: marker.position.y_pct,
            order: marker.order,
        }
    }
}

impl RTreeObject for IndexedMarker {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x_pct, self.y_pct])
    }
}

impl PointDistance for IndexedMarker {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x_pct - point[0];
        let dy = self.y_pct - point[1];
        dx * dx + dy * dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(id: &str, x: f64, y: f64, order: usize) -> IndexedMarker {
        IndexedMarker { id: id.to_string(), x_pct: x, y_pct: y, order }
    }

    fn index() -> MarkerIndex {
        let mut index = MarkerIndex::new();
        index.insert(marker("a", 10.0, 10.0, 0));
        index.insert(marker("b", 50.0, 50.0, 1));
        index.insert(marker("c", 51.0, 50.5, 2));
        index
    }

    #[test]
    fn test_nearest_marker() {
        let index = index();
        assert_eq!(index.len(), 3);
        assert_eq!(index.nearest(12.0, 9.0).unwrap().id, "a");
        assert!(MarkerIndex::new().nearest(0.0, 0.0).is_none());
    }

    #[test]
    fn test_hit_test_prefers_topmost_marker() {
        let index = index();
        assert_eq!(index.hit_test(50.5, 50.2, 2.0).unwrap().id, "c");
        assert!(index.hit_test(30.0, 30.0, 2.0).is_none());
        assert_eq!(index.within_radius(50.5, 50.2, 2.0).len(), 2);
    }

    #[test]
    fn test_query_rect() {
        let index = index();
        let hits = index.query_rect(0.0, 0.0, 20.0, 20.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "a");
    }
}
