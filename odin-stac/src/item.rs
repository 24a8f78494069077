use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Geometry, footprint and preview of a single STAC item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemDetail {
    pub id: String,
    pub collection: String,
    pub geometry: Option<Value>,
    pub bbox: Option<Vec<f64>>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireItem {
    id: String,
    collection: Option<String>,
    geometry: Option<Value>,
    bbox: Option<Vec<f64>>,
    #[serde(default)]
    assets: BTreeMap<String, WireAsset>,
}

#[derive(Debug, Deserialize)]
struct WireAsset {
    href: Option<String>,
}

impl ItemDetail {
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        let item: WireItem = serde_json::from_str(body)?;
        let thumbnail_url = item.assets.get("thumbnail").and_then(|a| a.href.clone());
        Ok(ItemDetail {
            id: item.id,
            collection: item.collection.unwrap_or_default(),
            geometry: item.geometry,
            bbox: item.bbox,
            thumbnail_url,
        })
    }

    /// Image-overlay corners `[[south, west], [north, east]]`, only for a
    /// four-element `[west, south, east, north]` bbox.
    pub fn overlay_bounds(&self) -> Option<[[f64; 2]; 2]> {
        match self.bbox.as_deref() {
            Some(&[west, south, east, north]) => Some([[south, west], [north, east]]),
            _ => None,
        }
    }
}
