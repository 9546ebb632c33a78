//! # Record Ingestion
//!
//! Parses caller-supplied record lists (JSON arrays or GeoJSON point
//! collections) and validates every record at the boundary. Records with
//! values outside the closed enumerations, impossible coordinates, negative
//! quantities or duplicate ids are rejected and logged, never passed on to
//! silently fail the filter predicates.
//!
//! ## Table of Contents
//! 1. IngestReport / Rejection — Outcome of an ingestion pass
//! 2. JSON import
//! 3. GeoJSON import
//! 4. Validation

use geojson::{feature::Id, GeoJson, Value as GeometryValue};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;

use crate::ecosystem::{
    EcosystemRecord, EcosystemType, GeoPoint, ParseEnumError, ProjectStatus, StorageLevel,
};
use crate::error::{MapError, Result};

// ============================================================================
// 1. IngestReport / Rejection — Outcome of an ingestion pass
// ============================================================================

/// Accepted records plus everything that was turned away
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub records: Vec<EcosystemRecord>,
    pub rejected: Vec<Rejection>,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// A record that failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// Position in the source list
    pub index: usize,
    /// Record id, when one could be read
    pub id: Option<String>,
    pub reason: RejectReason,
}

/// Why a record was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RejectReason {
    #[error("{0}")]
    UnknownValue(#[from] ParseEnumError),

    #[error("location ({lat}, {lng}) is outside WGS84 bounds")]
    InvalidLocation { lat: f64, lng: f64 },

    #[error("{field} must be a non-negative finite number, got {value}")]
    InvalidQuantity { field: &'static str, value: f64 },

    #[error("duplicate id")]
    DuplicateId,

    #[error("malformed record: {0}")]
    Malformed(String),
}

// ============================================================================
// 2. JSON import
// ============================================================================

/// Wire shape before enum validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    id: String,
    #[serde(rename = "type")]
    ecosystem_type: String,
    #[serde(default)]
    name: String,
    location: GeoPoint,
    area: f64,
    carbon_storage: f64,
    storage_level: String,
    project_status: String,
    #[serde(default)]
    biodiversity_score: f64,
    #[serde(default)]
    community_impact: f64,
    #[serde(default)]
    description: String,
}

/// Ingest a JSON array of record objects
pub fn ingest_json(content: &str) -> Result<IngestReport> {
    let items: Vec<Value> = serde_json::from_str(content)?;
    Ok(validate_all(items))
}

/// Load records from a file; `.geojson` is parsed as GeoJSON, anything else as JSON
pub fn load_records(path: &Path) -> Result<IngestReport> {
    let content = std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_geojson = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("geojson"));

    let report = if is_geojson {
        ingest_geojson(&content)?
    } else {
        ingest_json(&content)?
    };

    tracing::info!(
        "Loaded {} ecosystem records from {} ({} rejected)",
        report.records.len(),
        path.display(),
        report.rejected.len()
    );

    Ok(report)
}

// ============================================================================
// 3. GeoJSON import
// ============================================================================

/// Ingest a GeoJSON FeatureCollection whose Point features carry record
/// fields in `properties`. The feature id is used when `properties.id` is absent.
pub fn ingest_geojson(content: &str) -> Result<IngestReport> {
    let geojson: GeoJson = content
        .parse()
        .map_err(|e| MapError::GeoJson(format!("{}", e)))?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => {
            return Err(MapError::GeoJson(
                "bare geometry has no record properties".to_string(),
            ))
        }
    };

    let items = features
        .into_iter()
        .map(|feature| {
            let mut props: Map<String, Value> = feature.properties.unwrap_or_default();

            if !props.contains_key("id") {
                match feature.id {
                    Some(Id::String(s)) => {
                        props.insert("id".to_string(), Value::String(s));
                    }
                    Some(Id::Number(n)) => {
                        props.insert("id".to_string(), Value::String(n.to_string()));
                    }
                    None => {}
                }
            }

            // GeoJSON positions are [lng, lat]
            if let Some(GeometryValue::Point(coord)) = feature.geometry.map(|g| g.value) {
                if coord.len() >= 2 {
                    props.insert(
                        "location".to_string(),
                        serde_json::json!({ "lat": coord[1], "lng": coord[0] }),
                    );
                }
            }

            Value::Object(props)
        })
        .collect();

    Ok(validate_all(items))
}

// ============================================================================
// 4. Validation
// ============================================================================

fn validate_all(items: Vec<Value>) -> IngestReport {
    let mut report = IngestReport::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let id_hint = item.get("id").and_then(|id| match id {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        let outcome = serde_json::from_value::<RawRecord>(item)
            .map_err(|e| RejectReason::Malformed(e.to_string()))
            .and_then(validate);

        match outcome {
            Ok(record) if !seen.insert(record.id.clone()) => {
                reject(&mut report, index, Some(record.id), RejectReason::DuplicateId);
            }
            Ok(record) => report.records.push(record),
            Err(reason) => reject(&mut report, index, id_hint, reason),
        }
    }

    report
}

fn reject(report: &mut IngestReport, index: usize, id: Option<String>, reason: RejectReason) {
    tracing::warn!(
        "Rejected ecosystem record #{} ({}): {}",
        index,
        id.as_deref().unwrap_or("<no id>"),
        reason
    );
    report.rejected.push(Rejection { index, id, reason });
}

fn validate(raw: RawRecord) -> std::result::Result<EcosystemRecord, RejectReason> {
    let ecosystem_type: EcosystemType = raw.ecosystem_type.parse()?;
    let storage_level: StorageLevel = raw.storage_level.parse()?;
    let project_status: ProjectStatus = raw.project_status.parse()?;

    if !raw.location.is_valid() {
        return Err(RejectReason::InvalidLocation {
            lat: raw.location.lat,
            lng: raw.location.lng,
        });
    }
    non_negative("area", raw.area)?;
    non_negative("carbonStorage", raw.carbon_storage)?;

    Ok(EcosystemRecord {
        id: raw.id,
        ecosystem_type,
        name: raw.name,
        location: raw.location,
        area: raw.area,
        carbon_storage: raw.carbon_storage,
        storage_level,
        project_status,
        biodiversity_score: raw.biodiversity_score,
        community_impact: raw.community_impact,
        description: raw.description,
    })
}

fn non_negative(field: &'static str, value: f64) -> std::result::Result<(), RejectReason> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RejectReason::InvalidQuantity { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"[
        {
            "id": "mangrove-1", "type": "mangrove", "name": "Sundarbans Mangrove Reserve",
            "location": { "lat": 21.9497, "lng": 89.1833 },
            "area": 10000, "carbonStorage": 25000,
            "storageLevel": "high", "projectStatus": "active",
            "biodiversityScore": 95, "communityImpact": 8500
        },
        {
            "id": "wetland-1", "type": "coastal_wetland",
            "location": { "lat": 27.1592, "lng": 77.525 },
            "area": 680, "carbonStorage": 2400,
            "storageLevel": "low", "projectStatus": "completed"
        }
    ]"#;

    #[test]
    fn test_valid_records_are_accepted() {
        let report = ingest_json(VALID).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[1].ecosystem_type, EcosystemType::CoastalWetland);
        assert_eq!(report.records[1].name, "");
    }

    #[test]
    fn test_unknown_enum_value_is_rejected_not_hidden() {
        let json = r#"[
            { "id": "reef-1", "type": "coral_reef", "location": { "lat": 0, "lng": 0 },
              "area": 1, "carbonStorage": 1, "storageLevel": "high", "projectStatus": "active" },
            { "id": "kelp-1", "type": "kelp_forest", "location": { "lat": 36.6, "lng": -121.9 },
              "area": 1, "carbonStorage": 1, "storageLevel": "extreme", "projectStatus": "active" }
        ]"#;
        let report = ingest_json(json).unwrap();
        assert!(report.records.is_empty());
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].id.as_deref(), Some("reef-1"));
        match &report.rejected[1].reason {
            RejectReason::UnknownValue(e) => assert_eq!(e.value, "extreme"),
            other => panic!("unexpected reason {other:?}"),
        }
    }

    #[test]
    fn test_bad_location_and_quantities_are_rejected() {
        let json = r#"[
            { "id": "x", "type": "mangrove", "location": { "lat": 95, "lng": 0 },
              "area": 1, "carbonStorage": 1, "storageLevel": "high", "projectStatus": "active" },
            { "id": "y", "type": "mangrove", "location": { "lat": 5, "lng": 0 },
              "area": -3, "carbonStorage": 1, "storageLevel": "high", "projectStatus": "active" }
        ]"#;
        let report = ingest_json(json).unwrap();
        assert!(matches!(report.rejected[0].reason, RejectReason::InvalidLocation { .. }));
        assert_eq!(
            report.rejected[1].reason,
            RejectReason::InvalidQuantity { field: "area", value: -3.0 }
        );
    }

    #[test]
    fn test_duplicate_and_malformed_records() {
        let json = r#"[
            { "id": "a", "type": "seagrass", "location": { "lat": 1, "lng": 1 },
              "area": 1, "carbonStorage": 1, "storageLevel": "low", "projectStatus": "planned" },
            { "id": "a", "type": "seagrass", "location": { "lat": 2, "lng": 2 },
              "area": 1, "carbonStorage": 1, "storageLevel": "low", "projectStatus": "planned" },
            { "id": "b", "type": "seagrass" }
        ]"#;
        let report = ingest_json(json).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.rejected[0].reason, RejectReason::DuplicateId);
        assert_eq!(report.rejected[0].index, 1);
        assert!(matches!(report.rejected[1].reason, RejectReason::Malformed(_)));
        assert_eq!(report.rejected[1].id.as_deref(), Some("b"));
    }

    #[test]
    fn test_numeric_id_is_named_in_rejection() {
        let json = r#"[
            { "id": 42, "type": "seagrass", "location": { "lat": 1, "lng": 1 },
              "area": 1, "carbonStorage": 1, "storageLevel": "low", "projectStatus": "planned" }
        ]"#;
        let report = ingest_json(json).unwrap();
        assert!(report.records.is_empty());
        assert!(matches!(report.rejected[0].reason, RejectReason::Malformed(_)));
        assert_eq!(report.rejected[0].id.as_deref(), Some("42"));
    }

    #[test]
    fn test_non_array_input_is_an_error() {
        assert!(matches!(ingest_json("{}"), Err(MapError::Json(_))));
    }

    #[test]
    fn test_geojson_points_become_records() {
        let geojson = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "id": "wadden-sea-1",
                    "geometry": { "type": "Point", "coordinates": [8.7167, 53.5511] },
                    "properties": {
                        "type": "salt_marsh", "name": "Wadden Sea Salt Marshes",
                        "area": 2800, "carbonStorage": 12200,
                        "storageLevel": "high", "projectStatus": "protected"
                    }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "LineString", "coordinates": [[0, 0], [1, 1]] },
                    "properties": {
                        "id": "line-1", "type": "tidal_flat", "area": 1, "carbonStorage": 1,
                        "storageLevel": "low", "projectStatus": "planned"
                    }
                }
            ]
        }"#;
        let report = ingest_geojson(geojson).unwrap();
        assert_eq!(report.records.len(), 1);
        let wadden = &report.records[0];
        assert_eq!(wadden.id, "wadden-sea-1");
        assert_eq!(wadden.location, GeoPoint::new(53.5511, 8.7167));
        assert_eq!(report.rejected[0].id.as_deref(), Some("line-1"));
    }
}
