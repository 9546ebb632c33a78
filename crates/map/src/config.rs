//! # Map Configuration
//!
//! Parses `map.toml`, the declarative description of one map view: where the
//! records come from, which background backend draws the map, the extent it
//! covers and the initial filter selection.
//!
//! ## Table of Contents
//! 1. MapConfig — Top-level config
//! 2. ViewConfig — Backend, extent, margin
//! 3. FilterConfig — Initial filter selection
//! 4. Parsing + backend construction

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::coords::{MapExtent, Margin};
use crate::ecosystem::{EcosystemType, ProjectStatus, StorageLevel};
use crate::error::{MapError, Result};
use crate::filter::FilterState;
use crate::render::{ConfiguredBackend, StaticImageBackend, TileLayer, TileLayerBackend};

// ============================================================================
// 1. MapConfig — Top-level config
// ============================================================================

/// Top-level map configuration, parsed from `map.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    pub project: ProjectConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub filters: FilterConfig,
}

/// Project metadata and data source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Human-readable project name
    pub name: String,
    /// Relative path from map.toml to the record file (JSON or GeoJSON)
    pub data: String,
}

// ============================================================================
// 2. ViewConfig — Backend, extent, margin
// ============================================================================

/// Which background backend draws the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Tile,
    Image,
}

/// Named extents for the stock background assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtentPreset {
    SouthAsia,
    World,
}

/// Explicit bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtentConfig {
    pub lng_min: f64,
    pub lng_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

/// View section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// Marker edge inset, percent
    #[serde(default)]
    pub margin: Margin,
    /// Explicit extent; takes precedence over `preset`
    #[serde(default)]
    pub extent: Option<ExtentConfig>,
    #[serde(default)]
    pub preset: Option<ExtentPreset>,
    #[serde(default)]
    pub tile: Option<TileLayer>,
    #[serde(default)]
    pub image: Option<ImageConfig>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            margin: Margin::default(),
            extent: None,
            preset: None,
            tile: None,
            image: None,
        }
    }
}

/// Static image background
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Relative path from map.toml to the image
    pub path: String,
}

// ============================================================================
// 3. FilterConfig — Initial filter selection
// ============================================================================

/// Initial selection per dimension; an omitted dimension starts fully selected
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub types: Option<Vec<EcosystemType>>,
    #[serde(default)]
    pub levels: Option<Vec<StorageLevel>>,
    #[serde(default)]
    pub statuses: Option<Vec<ProjectStatus>>,
}

impl FilterConfig {
    pub fn to_state(&self) -> FilterState {
        let mut state = FilterState::all();
        if let Some(types) = &self.types {
            state.ecosystem_types = types.iter().copied().collect();
        }
        if let Some(levels) = &self.levels {
            state.storage_levels = levels.iter().copied().collect();
        }
        if let Some(statuses) = &self.statuses {
            state.project_statuses = statuses.iter().copied().collect();
        }
        state
    }
}

// ============================================================================
// 4. Parsing + backend construction
// ============================================================================

impl MapConfig {
    /// Load a MapConfig from a `map.toml` file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse from TOML text that did not come from a file
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::parse(content, Path::new("<inline>"))
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        let config: MapConfig = toml::from_str(content).map_err(|source| MapError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        // Surface a degenerate extent at load time, not first render
        config.extent()?;
        Ok(config)
    }

    /// Resolve a path relative to the directory holding map.toml
    pub fn resolve_path(&self, map_toml_dir: &Path, relative: &str) -> PathBuf {
        map_toml_dir.join(relative)
    }

    /// Extent from `view.extent`, else `view.preset`, else the backend default
    /// (South Asia for images, world for tiles)
    pub fn extent(&self) -> Result<MapExtent> {
        if let Some(e) = &self.view.extent {
            return MapExtent::new(e.lng_min, e.lng_max, e.lat_min, e.lat_max);
        }
        Ok(match (self.view.preset, self.view.backend) {
            (Some(ExtentPreset::SouthAsia), _) | (None, BackendKind::Image) => MapExtent::south_asia(),
            (Some(ExtentPreset::World), _) | (None, BackendKind::Tile) => MapExtent::world(),
        })
    }

    /// Build the configured backend; relative image paths resolve against `map_toml_dir`
    pub fn backend(&self, map_toml_dir: &Path) -> Result<ConfiguredBackend> {
        let extent = self.extent()?;
        let margin = self.view.margin;
        match self.view.backend {
            BackendKind::Tile => {
                let layer = self
                    .view
                    .tile
                    .clone()
                    .ok_or_else(|| MapError::MissingBackend("tile".to_string()))?;
                Ok(ConfiguredBackend::Tile(TileLayerBackend { layer, extent, margin }))
            }
            BackendKind::Image => {
                let image = self
                    .view
                    .image
                    .as_ref()
                    .ok_or_else(|| MapError::MissingBackend("image".to_string()))?;
                Ok(ConfiguredBackend::Image(StaticImageBackend {
                    path: self.resolve_path(map_toml_dir, &image.path),
                    extent,
                    margin,
                }))
            }
        }
    }

    pub fn initial_filters(&self) -> FilterState {
        self.filters.to_state()
    }
}
