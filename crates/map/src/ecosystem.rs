//! # Ecosystem Records
//!
//! The record type the map operates on, plus the three closed enumerations
//! that the filter engine keys on. Display metadata (names, legend colors,
//! icons) lives next to each enumeration so every consumer renders the same
//! value the same way.
//!
//! ## Table of Contents
//! 1. EcosystemType — Habitat classification
//! 2. StorageLevel — Editorial carbon storage class
//! 3. ProjectStatus — Restoration project lifecycle
//! 4. GeoPoint — WGS84 location
//! 5. EcosystemRecord — A single mapped site
//! 6. Parsing helpers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// 1. EcosystemType — Habitat classification
// ============================================================================

/// Blue carbon habitat type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EcosystemType {
    Mangrove,
    Seagrass,
    SaltMarsh,
    KelpForest,
    TidalFlat,
    CoastalWetland,
}

impl EcosystemType {
    /// Every habitat type, in legend order
    pub const ALL: [EcosystemType; 6] = [
        EcosystemType::Mangrove,
        EcosystemType::Seagrass,
        EcosystemType::SaltMarsh,
        EcosystemType::KelpForest,
        EcosystemType::TidalFlat,
        EcosystemType::CoastalWetland,
    ];

    /// Wire name (snake_case)
    pub fn as_str(self) -> &'static str {
        match self {
            EcosystemType::Mangrove => "mangrove",
            EcosystemType::Seagrass => "seagrass",
            EcosystemType::SaltMarsh => "salt_marsh",
            EcosystemType::KelpForest => "kelp_forest",
            EcosystemType::TidalFlat => "tidal_flat",
            EcosystemType::CoastalWetland => "coastal_wetland",
        }
    }

    /// Plural human-readable name used in legends and detail views
    pub fn display_name(self) -> &'static str {
        match self {
            EcosystemType::Mangrove => "Mangrove Forests",
            EcosystemType::Seagrass => "Seagrass Beds",
            EcosystemType::SaltMarsh => "Salt Marshes",
            EcosystemType::KelpForest => "Kelp Forests",
            EcosystemType::TidalFlat => "Tidal Flats",
            EcosystemType::CoastalWetland => "Coastal Wetlands",
        }
    }

    /// Symbolic marker icon
    pub fn icon(self) -> MarkerIcon {
        match self {
            EcosystemType::Mangrove | EcosystemType::KelpForest => MarkerIcon::Park,
            EcosystemType::Seagrass
            | EcosystemType::SaltMarsh
            | EcosystemType::CoastalWetland => MarkerIcon::Grass,
            EcosystemType::TidalFlat => MarkerIcon::Location,
        }
    }
}

/// Icon family drawn inside a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerIcon {
    Park,
    Grass,
    Location,
}

// ============================================================================
// 2. StorageLevel — Editorial carbon storage class
// ============================================================================

/// Carbon storage class assigned by the data curator.
///
/// Not derived from `carbon_storage`: the curated values follow no single
/// threshold, so the level is kept as independent metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageLevel {
    High,
    Medium,
    Low,
}

impl StorageLevel {
    pub const ALL: [StorageLevel; 3] = [StorageLevel::High, StorageLevel::Medium, StorageLevel::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            StorageLevel::High => "high",
            StorageLevel::Medium => "medium",
            StorageLevel::Low => "low",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            StorageLevel::High => "High Carbon Storage",
            StorageLevel::Medium => "Medium Carbon Storage",
            StorageLevel::Low => "Low Carbon Storage",
        }
    }

    /// Marker fill color
    pub fn color(self) -> &'static str {
        match self {
            StorageLevel::High => "#2e7d32",
            StorageLevel::Medium => "#f57c00",
            StorageLevel::Low => "#1976d2",
        }
    }
}

// ============================================================================
// 3. ProjectStatus — Restoration project lifecycle
// ============================================================================

/// Lifecycle state of the carbon project attached to a site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Planned,
    Completed,
    Protected,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Active,
        ProjectStatus::Planned,
        ProjectStatus::Completed,
        ProjectStatus::Protected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Planned => "planned",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Protected => "protected",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProjectStatus::Active => "Active Project",
            ProjectStatus::Planned => "Planned Project",
            ProjectStatus::Completed => "Completed Project",
            ProjectStatus::Protected => "Protected Area",
        }
    }

    /// Marker border color
    pub fn color(self) -> &'static str {
        match self {
            ProjectStatus::Active => "#4caf50",
            ProjectStatus::Planned => "#ff9800",
            ProjectStatus::Completed => "#2196f3",
            ProjectStatus::Protected => "#9c27b0",
        }
    }
}

// ============================================================================
// 4. GeoPoint — WGS84 location
// ============================================================================

/// A WGS84 coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude, [-90, 90]
    pub lat: f64,
    /// Longitude, [-180, 180]
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite and inside the WGS84 ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<GeoPoint> for geo::Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        geo::coord! { x: point.lng, y: point.lat }
    }
}

// ============================================================================
// 5. EcosystemRecord — A single mapped site
// ============================================================================

/// One blue carbon site as supplied by the caller.
///
/// Serialized with the camelCase field names used by the registry feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcosystemRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub ecosystem_type: EcosystemType,
    #[serde(default)]
    pub name: String,
    pub location: GeoPoint,
    /// Hectares
    pub area: f64,
    /// tCO₂e
    pub carbon_storage: f64,
    pub storage_level: StorageLevel,
    pub project_status: ProjectStatus,
    #[serde(default)]
    pub biodiversity_score: f64,
    #[serde(default)]
    pub community_impact: f64,
    #[serde(default)]
    pub description: String,
}

impl EcosystemRecord {
    /// Label shown on the marker: the site name, or the id when unnamed
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

// ============================================================================
// 6. Parsing helpers
// ============================================================================

/// Error for a string that is not a member of a closed enumeration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {kind} (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

fn parse_closed<T: Copy>(
    s: &str,
    kind: &'static str,
    all: &[T],
    as_str: fn(T) -> &'static str,
) -> Result<T, ParseEnumError> {
    all.iter()
        .copied()
        .find(|v| as_str(*v) == s)
        .ok_or_else(|| ParseEnumError {
            kind,
            value: s.to_string(),
            expected: all.iter().map(|v| as_str(*v)).collect::<Vec<_>>().join(", "),
        })
}

impl FromStr for EcosystemType {
    type Err = ParseEnumError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_closed(s, "ecosystem type", &Self::ALL, Self::as_str)
    }
}

impl FromStr for StorageLevel {
    type Err = ParseEnumError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_closed(s, "storage level", &Self::ALL, Self::as_str)
    }
}

impl FromStr for ProjectStatus {
    type Err = ParseEnumError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_closed(s, "project status", &Self::ALL, Self::as_str)
    }
}

impl fmt::Display for EcosystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for StorageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
