//! # Blue Carbon Map — Filter, Projection and Aggregation Core
//!
//! Turns a caller-supplied list of blue carbon ecosystem sites into what an
//! interactive map shows: the subset selected by the three filter dimensions,
//! marker positions over a fixed-extent background, and summary totals.
//!
//! Everything is synchronous and in-memory. The pure functions (`filter`,
//! `project`, `aggregate`, `format_quantity`) borrow their inputs; `MapSession`
//! is the single owner of mutable display state.
//!
//! ## Modules
//! - `ecosystem` — Record type and closed enumerations
//! - `filter` — Multi-dimension filter state and engine
//! - `coords` — Lat/lng → overlay percent projection
//! - `aggregate` — Totals and quantity formatting
//! - `render` — Backend strategy trait, markers, legend
//! - `spatial_index` — R-tree for marker hit-testing
//! - `session` — State owner with change subscriptions
//! - `ingest` — JSON / GeoJSON loading with boundary validation
//! - `config` — `map.toml` parsing
//!
//! ## Table of Contents
//! 1. Module declarations
//! 2. Re-exports

pub mod aggregate;
pub mod config;
pub mod coords;
pub mod ecosystem;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod render;
pub mod session;
pub mod spatial_index;

pub use aggregate::{aggregate, format_area, format_carbon_storage, format_quantity, Summary};
pub use config::MapConfig;
pub use coords::{project, MapExtent, Margin, ScreenPosition};
pub use ecosystem::{EcosystemRecord, EcosystemType, GeoPoint, ProjectStatus, StorageLevel};
pub use error::{MapError, Result};
pub use filter::{filter, FilterDimension, FilterState, FilterValue};
pub use ingest::{ingest_geojson, ingest_json, load_records, IngestReport};
pub use render::{legend, Background, MapBackend, MapRenderer, Marker};
pub use session::{MapEvent, MapSession, SubscriptionId};
pub use spatial_index::MarkerIndex;
