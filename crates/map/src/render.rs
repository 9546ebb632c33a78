//! # Map Renderer
//!
//! One renderer for every map variant. The background (static image crop,
//! slippy tile layer) is a pluggable `MapBackend`; the renderer turns visible
//! records into positioned, colored markers over it.
//!
//! ## Table of Contents
//! 1. Background — What is drawn under the markers
//! 2. MapBackend — Strategy trait + built-in backends
//! 3. Marker — A positioned record
//! 4. Legend — Colors and labels for every filter value
//! 5. MapRenderer — Records → scene

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::coords::{MapExtent, Margin, ScreenPosition};
use crate::ecosystem::{
    EcosystemRecord, EcosystemType, GeoPoint, MarkerIcon, ProjectStatus, StorageLevel,
};
use crate::spatial_index::MarkerIndex;

// ============================================================================
// 1. Background — What is drawn under the markers
// ============================================================================

/// Background layer description handed to the display surface
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Background {
    /// Pre-cropped image whose edges match the backend extent
    StaticImage { path: PathBuf },
    /// XYZ tile layer
    TileLayer(TileLayer),
}

/// XYZ tile source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    /// URL with `{z}`, `{x}`, `{y}` placeholders
    pub url_template: String,
    #[serde(default)]
    pub attribution: String,
    pub center: GeoPoint,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
}

fn default_zoom() -> u8 {
    5
}

fn default_max_zoom() -> u8 {
    18
}

impl TileLayer {
    /// Tile URL for one tile address
    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        self.url_template
            .replace("{z}", &z.min(self.max_zoom).to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

// ============================================================================
// 2. MapBackend — Strategy trait + built-in backends
// ============================================================================

/// A map background and the geographic extent it covers
pub trait MapBackend {
    /// Short identifier ("image", "tile", ...)
    fn name(&self) -> &str;

    /// Geographic extent the overlay plane spans
    fn extent(&self) -> &MapExtent;

    /// Edge inset for markers
    fn margin(&self) -> Margin {
        Margin::default()
    }

    fn background(&self) -> Background;

    /// Project a location through this backend
    fn project(&self, point: GeoPoint) -> ScreenPosition {
        self.extent().project(point, self.margin())
    }
}

/// Static image background (CSS-drawn or pre-rendered maps)
#[derive(Debug, Clone)]
pub struct StaticImageBackend {
    pub path: PathBuf,
    pub extent: MapExtent,
    pub margin: Margin,
}

impl MapBackend for StaticImageBackend {
    fn name(&self) -> &str {
        "image"
    }

    fn extent(&self) -> &MapExtent {
        &self.extent
    }

    fn margin(&self) -> Margin {
        self.margin
    }

    fn background(&self) -> Background {
        Background::StaticImage {
            path: self.path.clone(),
        }
    }
}

/// Tile layer background (Leaflet / Mapbox style)
#[derive(Debug, Clone)]
pub struct TileLayerBackend {
    pub layer: TileLayer,
    pub extent: MapExtent,
    pub margin: Margin,
}

impl MapBackend for TileLayerBackend {
    fn name(&self) -> &str {
        "tile"
    }

    fn extent(&self) -> &MapExtent {
        &self.extent
    }

    fn margin(&self) -> Margin {
        self.margin
    }

    fn background(&self) -> Background {
        Background::TileLayer(self.layer.clone())
    }
}

/// Backend chosen at runtime from `map.toml`
#[derive(Debug, Clone)]
pub enum ConfiguredBackend {
    Image(StaticImageBackend),
    Tile(TileLayerBackend),
}

impl ConfiguredBackend {
    fn inner(&self) -> &dyn MapBackend {
        match self {
            ConfiguredBackend::Image(b) => b,
            ConfiguredBackend::Tile(b) => b,
        }
    }
}

impl MapBackend for ConfiguredBackend {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn extent(&self) -> &MapExtent {
        self.inner().extent()
    }

    fn margin(&self) -> Margin {
        self.inner().margin()
    }

    fn background(&self) -> Background {
        self.inner().background()
    }
}

// ============================================================================
// 3. Marker — A positioned record
// ============================================================================

/// A record placed on the overlay plane
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: String,
    pub label: String,
    pub ecosystem_type: EcosystemType,
    pub position: ScreenPosition,
    /// Storage level color
    pub fill: &'static str,
    /// Project status color
    pub border: &'static str,
    pub icon: MarkerIcon,
    /// Position in the visible list, used to stagger entry animations
    pub order: usize,
}

// ============================================================================
// 4. Legend — Colors and labels for every filter value
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    /// Wire value, as used in filters
    pub value: &'static str,
    pub label: &'static str,
    pub color: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Legend {
    pub ecosystem_types: Vec<LegendEntry>,
    pub storage_levels: Vec<LegendEntry>,
    pub project_statuses: Vec<LegendEntry>,
}

/// Legend covering every value of every filter dimension
pub fn legend() -> Legend {
    Legend {
        ecosystem_types: EcosystemType::ALL
            .iter()
            .map(|t| LegendEntry {
                value: t.as_str(),
                label: t.display_name(),
                color: None,
            })
            .collect(),
        storage_levels: StorageLevel::ALL
            .iter()
            .map(|l| LegendEntry {
                value: l.as_str(),
                label: l.display_name(),
                color: Some(l.color()),
            })
            .collect(),
        project_statuses: ProjectStatus::ALL
            .iter()
            .map(|s| LegendEntry {
                value: s.as_str(),
                label: s.display_name(),
                color: Some(s.color()),
            })
            .collect(),
    }
}

// ============================================================================
// 5. MapRenderer — Records → scene
// ============================================================================

/// Everything a display surface needs to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct MapScene {
    pub backend: String,
    pub background: Background,
    pub markers: Vec<Marker>,
    pub legend: Legend,
}

/// Renders records over any `MapBackend`
#[derive(Debug, Clone)]
pub struct MapRenderer<B: MapBackend> {
    backend: B,
}

impl<B: MapBackend> MapRenderer<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Markers for `records`, in iteration order
    pub fn markers<'a, I>(&self, records: I) -> Vec<Marker>
    where
        I: IntoIterator<Item = &'a EcosystemRecord>,
    {
        records
            .into_iter()
            .enumerate()
            .map(|(order, record)| Marker {
                id: record.id.clone(),
                label: record.label().to_string(),
                ecosystem_type: record.ecosystem_type,
                position: self.backend.project(record.location),
                fill: record.storage_level.color(),
                border: record.project_status.color(),
                icon: record.ecosystem_type.icon(),
                order,
            })
            .collect()
    }

    /// Full scene: background, markers and legend
    pub fn scene<'a, I>(&self, records: I) -> MapScene
    where
        I: IntoIterator<Item = &'a EcosystemRecord>,
    {
        let markers = self.markers(records);
        let clamped = markers.iter().filter(|m| m.position.clamped).count();
        if clamped > 0 {
            tracing::debug!(
                "{} of {} markers fall outside the {} backend extent and were clamped",
                clamped,
                markers.len(),
                self.backend.name()
            );
        }

        MapScene {
            backend: self.backend.name().to_string(),
            background: self.backend.background(),
            markers,
            legend: legend(),
        }
    }

    /// Hit-test index over rendered markers
    pub fn index(&self, markers: &[Marker]) -> MarkerIndex {
        MarkerIndex::from_markers(markers)
    }
}
