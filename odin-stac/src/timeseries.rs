//! WTSS time-series records.
//!
//! The wire format is `{"query": {...}, "result": {"coverage"?, "timeline": [...],
//! "attributes": [{"attribute": "NDVI", "values": [...]}], "coordinates": {...}}}`.
//! Decoding is lenient at the attribute level: an attribute whose `values` is
//! not an array is kept with `raw_values: None` so downstream assembly can drop
//! it without losing its siblings.

use crate::{date_range::DateRange, point::GeoPoint};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Parameters of a single time-series request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesQuery {
    pub coverage: String,
    pub point: GeoPoint,
    pub attributes: Vec<String>,
    pub date_range: DateRange,
}

impl TimeSeriesQuery {
    /// Query-string pairs for `GET /time_series`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("coverage", self.coverage.clone()),
            ("attributes", self.attributes.join(",")),
            ("start_date", self.date_range.start_str()),
            ("end_date", self.date_range.end_str()),
            ("latitude", self.point.latitude.to_string()),
            ("longitude", self.point.longitude.to_string()),
        ]
    }
}

/// One attribute column of a time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesAttribute {
    #[serde(rename = "attribute")]
    pub name: String,
    /// `None` when the upstream `values` field was not an array.
    #[serde(rename = "values", default, deserialize_with = "lenient_values")]
    pub raw_values: Option<Vec<Option<f64>>>,
}

/// A per-point time series for one coverage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesResponse {
    pub coverage_id: String,
    pub timeline: Vec<String>,
    pub attributes: Vec<SeriesAttribute>,
    pub coordinates: Option<GeoPoint>,
}

#[derive(Debug, Deserialize)]
struct WireEnvelope {
    #[serde(default)]
    query: Option<WireQuery>,
    result: Option<WireResult>,
}

#[derive(Debug, Deserialize)]
struct WireQuery {
    coverage: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireResult {
    coverage: Option<String>,
    #[serde(default)]
    timeline: Vec<String>,
    #[serde(default)]
    attributes: Vec<Value>,
    coordinates: Option<GeoPoint>,
}

fn lenient_values<'de, D>(deserializer: D) -> Result<Option<Vec<Option<f64>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(values_from_json(&value))
}

fn values_from_json(value: &Value) -> Option<Vec<Option<f64>>> {
    value
        .as_array()
        .map(|items| items.iter().map(Value::as_f64).collect())
}

impl TimeSeriesResponse {
    /// Decode a WTSS body. `coverage_hint` names the coverage when the body
    /// does not.
    ///
    /// Attribute entries that are not objects with a string `attribute` are
    /// skipped here; entries whose `values` is malformed are kept.
    pub fn from_json(body: &str, coverage_hint: &str) -> serde_json::Result<Self> {
        let envelope: WireEnvelope = serde_json::from_str(body)?;
        let query_coverage = envelope.query.and_then(|q| q.coverage);
        let result = envelope.result.unwrap_or(WireResult {
            coverage: None,
            timeline: Vec::new(),
            attributes: Vec::new(),
            coordinates: None,
        });
        let attributes = result
            .attributes
            .iter()
            .filter_map(|attr| {
                let name = attr.get("attribute")?.as_str()?.to_string();
                let raw_values = attr.get("values").and_then(values_from_json);
                Some(SeriesAttribute { name, raw_values })
            })
            .collect();
        Ok(TimeSeriesResponse {
            coverage_id: result
                .coverage
                .or(query_coverage)
                .unwrap_or_else(|| coverage_hint.to_string()),
            timeline: result.timeline,
            attributes,
            coordinates: result.coordinates,
        })
    }

    /// An empty series for a coverage that returned no data.
    pub fn empty(coverage_id: &str) -> Self {
        TimeSeriesResponse {
            coverage_id: coverage_id.to_string(),
            timeline: Vec::new(),
            attributes: Vec::new(),
            coordinates: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty() || self.attributes.is_empty()
    }
}
