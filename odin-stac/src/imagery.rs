use crate::{date_range::DateRange, point::GeoPoint};
use odin_utils::dates::date_part;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Maximum number of features requested per STAC search.
pub const SEARCH_LIMIT: u32 = 2500;

/// Placeholder date for features that carry no datetime at all.
pub const UNKNOWN_DATE: &str = "N/A";

/// One matched scene from a STAC search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageryResult {
    pub id: String,
    pub collection: String,
    /// Date part ("YYYY-MM-DD") of the scene acquisition time.
    pub date: String,
    pub cloud_cover: Option<f64>,
    pub thumbnail_url: Option<String>,
}

/// Request body for `POST /search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPayload {
    pub collections: Vec<String>,
    pub intersects: PointGeometry,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub coordinates: [f64; 2],
}

impl SearchPayload {
    pub fn new(point: &GeoPoint, collections: &[String], date_range: Option<&DateRange>) -> Self {
        SearchPayload {
            collections: collections.to_vec(),
            intersects: PointGeometry {
                kind: "Point",
                coordinates: point.as_geojson_coordinates(),
            },
            limit: SEARCH_LIMIT,
            datetime: date_range.map(DateRange::as_stac_interval),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub id: Option<String>,
    pub collection: Option<String>,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub assets: BTreeMap<String, Asset>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Properties {
    pub datetime: Option<String>,
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
    #[serde(rename = "eo:cloud_cover")]
    pub cloud_cover: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct Asset {
    pub href: Option<String>,
}

impl Feature {
    /// Acquisition date, preferring `datetime`, then the interval bounds.
    fn acquisition_date(&self) -> String {
        let p = &self.properties;
        p.datetime
            .as_deref()
            .or(p.start_datetime.as_deref())
            .or(p.end_datetime.as_deref())
            .map(|s| date_part(s).to_string())
            .unwrap_or_else(|| UNKNOWN_DATE.to_string())
    }

    /// Convert into an `ImageryResult`; features without an id are dropped.
    pub fn into_imagery_result(self) -> Option<ImageryResult> {
        let date = self.acquisition_date();
        let thumbnail_url = self.assets.get("thumbnail").and_then(|a| a.href.clone());
        Some(ImageryResult {
            id: self.id?,
            collection: self.collection.unwrap_or_default(),
            date,
            cloud_cover: self.properties.cloud_cover,
            thumbnail_url,
        })
    }
}

impl FeatureCollection {
    pub fn into_imagery_results(self) -> Vec<ImageryResult> {
        self.features
            .into_iter()
            .filter_map(Feature::into_imagery_result)
            .collect()
    }

    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

/// Merge result batches, keeping the first occurrence of every id.
pub fn dedupe_by_id(results: Vec<ImageryResult>) -> Vec<ImageryResult> {
    let mut seen: HashSet<String> = HashSet::new();
    results
        .into_iter()
        .filter(|item| !item.id.is_empty() && seen.insert(item.id.clone()))
        .collect()
}

/// Group results by collection id (sorted by id).
pub fn group_by_collection(results: &[ImageryResult]) -> BTreeMap<String, Vec<&ImageryResult>> {
    let mut groups: BTreeMap<String, Vec<&ImageryResult>> = BTreeMap::new();
    for item in results {
        groups.entry(item.collection.clone()).or_default().push(item);
    }
    groups
}
