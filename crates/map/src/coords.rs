//! # Coordinate Projection
//!
//! Places geographic coordinates (WGS84 lat/lng) on a fixed-extent map
//! background, expressed as percentages of the container.
//!
//! ## Pipeline
//! ```text
//! Geographic (WGS84)  →  Normalized extent  →  Overlay (percent, Y-down)
//!   lat/lng degrees       0.0..1.0 per axis      x/y in [margin, 100 - margin]
//! ```
//!
//! Linear equirectangular: horizontal distortion grows away from the equator
//! and is not corrected.
//!
//! ## Table of Contents
//! 1. MapExtent — Background bounding box
//! 2. Margin — Edge inset for markers
//! 3. ScreenPosition + project — Main entry point

use geo::Rect;
use serde::{Deserialize, Serialize};

use crate::ecosystem::GeoPoint;
use crate::error::{MapError, Result};

// ============================================================================
// 1. MapExtent — Background bounding box
// ============================================================================

/// Geographic bounding box covered by a map background asset.
/// Always non-degenerate: construction fails fast otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapExtent {
    rect: Rect<f64>,
}

impl MapExtent {
    /// Create an extent from its longitude and latitude bounds.
    ///
    /// Fails with `DegenerateExtent` when a span is zero, inverted or
    /// non-finite: that is a configuration mistake, not a data issue.
    pub fn new(lng_min: f64, lng_max: f64, lat_min: f64, lat_max: f64) -> Result<Self> {
        let bounds = [lng_min, lng_max, lat_min, lat_max];
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(MapError::DegenerateExtent(format!(
                "non-finite bound in lng [{lng_min}, {lng_max}] lat [{lat_min}, {lat_max}]"
            )));
        }
        if lng_max <= lng_min {
            return Err(MapError::DegenerateExtent(format!(
                "longitude span [{lng_min}, {lng_max}] is empty"
            )));
        }
        if lat_max <= lat_min {
            return Err(MapError::DegenerateExtent(format!(
                "latitude span [{lat_min}, {lat_max}] is empty"
            )));
        }
        Ok(Self {
            rect: Rect::new(
                geo::coord! { x: lng_min, y: lat_min },
                geo::coord! { x: lng_max, y: lat_max },
            ),
        })
    }

    /// Regional crop used by the South Asia backgrounds (lng 68–97, lat 8–28)
    pub fn south_asia() -> Self {
        Self::from_valid(68.0, 97.0, 8.0, 28.0)
    }

    /// Whole-globe plate carrée background
    pub fn world() -> Self {
        Self::from_valid(-180.0, 180.0, -90.0, 90.0)
    }

    fn from_valid(lng_min: f64, lng_max: f64, lat_min: f64, lat_max: f64) -> Self {
        Self {
            rect: Rect::new(
                geo::coord! { x: lng_min, y: lat_min },
                geo::coord! { x: lng_max, y: lat_max },
            ),
        }
    }

    pub fn lng_min(&self) -> f64 {
        self.rect.min().x
    }

    pub fn lng_max(&self) -> f64 {
        self.rect.max().x
    }

    pub fn lat_min(&self) -> f64 {
        self.rect.min().y
    }

    pub fn lat_max(&self) -> f64 {
        self.rect.max().y
    }

    /// Underlying `geo` rectangle (x = longitude, y = latitude)
    pub fn rect(&self) -> Rect<f64> {
        self.rect
    }

    /// Geographic center of the extent
    pub fn center(&self) -> GeoPoint {
        let c = self.rect.center();
        GeoPoint::new(c.y, c.x)
    }

    /// Project a point onto this extent with the given edge margin
    pub fn project(&self, point: GeoPoint, margin: Margin) -> ScreenPosition {
        project(point, self, margin)
    }
}

// ============================================================================
// 2. Margin — Edge inset for markers
// ============================================================================

/// Percentage inset that keeps markers off the container edge
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Margin(f64);

impl Margin {
    /// World map (2%)
    pub const WORLD: Margin = Margin(2.0);
    /// Regional ecosystem map (5%)
    pub const REGIONAL: Margin = Margin(5.0);
    /// Detailed mangrove map (8%)
    pub const DETAILED: Margin = Margin(8.0);

    /// Create a margin; must be finite and in `[0, 50)`
    pub fn new(pct: f64) -> Result<Self> {
        if pct.is_finite() && (0.0..50.0).contains(&pct) {
            Ok(Self(pct))
        } else {
            Err(MapError::InvalidMargin(pct))
        }
    }

    pub fn pct(self) -> f64 {
        self.0
    }
}

impl Default for Margin {
    fn default() -> Self {
        Margin::REGIONAL
    }
}

impl<'de> Deserialize<'de> for Margin {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let pct = f64::deserialize(deserializer)?;
        Margin::new(pct).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// 3. ScreenPosition + project — Main entry point
// ============================================================================

/// Marker position in percent of the container (origin top-left, Y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPosition {
    pub x_pct: f64,
    pub y_pct: f64,
    /// Set when either axis had to be pulled inside the margin band
    pub clamped: bool,
}

/// Linear lat/lng → percent projection over `extent`.
///
/// `x = (lng - lng_min) / lng_span * 100`, `y = (lat_max - lat) / lat_span * 100`,
/// each clamped to `[margin, 100 - margin]`. Out-of-extent points are never an
/// error; they land on the margin and `clamped` is set. NaN behaves the same.
pub fn project(point: GeoPoint, extent: &MapExtent, margin: Margin) -> ScreenPosition {
    let x = (point.lng - extent.lng_min()) / extent.rect.width() * 100.0;
    // Screen Y grows downward, latitude grows northward
    let y = (extent.lat_max() - point.lat) / extent.rect.height() * 100.0;

    let (x_pct, x_clamped) = clamp_pct(x, margin);
    let (y_pct, y_clamped) = clamp_pct(y, margin);

    ScreenPosition {
        x_pct,
        y_pct,
        clamped: x_clamped || y_clamped,
    }
}

fn clamp_pct(value: f64, margin: Margin) -> (f64, bool) {
    let lo = margin.pct();
    let hi = 100.0 - margin.pct();
    if value.is_nan() {
        return (lo, true);
    }
    let clamped = value.clamp(lo, hi);
    (clamped, clamped != value)
}
