//! Static knowledge about the Brazil Data Cube collections: which ones serve
//! WTSS time series, which attributes each exposes, and the logical groups
//! used to pick collections by family.

use crate::collection::Collection;

/// A time-series attribute a collection exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeInfo {
    pub id: &'static str,
    pub label: &'static str,
}

/// Per-collection WTSS configuration.
#[derive(Debug, Clone, Copy)]
pub struct SatelliteConfig {
    pub collection: &'static str,
    pub label: &'static str,
    pub attributes: &'static [AttributeInfo],
}

const fn attr(id: &'static str, label: &'static str) -> AttributeInfo {
    AttributeInfo { id, label }
}

pub static SATELLITE_CONFIG: &[SatelliteConfig] = &[
    SatelliteConfig {
        collection: "S2-16D-2",
        label: "Sentinel-2 (16 days)",
        attributes: &[
            attr("NDVI", "NDVI (vegetation index)"),
            attr("EVI", "EVI (enhanced vegetation index)"),
            attr("B02", "B02 (Blue)"),
            attr("B03", "B03 (Green)"),
            attr("B04", "B04 (Red)"),
            attr("B08", "B08 (NIR)"),
            attr("B11", "B11 (SWIR 1)"),
            attr("B12", "B12 (SWIR 2)"),
        ],
    },
    SatelliteConfig {
        collection: "LANDSAT-16D-1",
        label: "Landsat 8/9 (16 days)",
        attributes: &[
            attr("NDVI", "NDVI"),
            attr("EVI", "EVI"),
            attr("blue", "Blue (B2)"),
            attr("green", "Green (B3)"),
            attr("red", "Red (B4)"),
            attr("nir08", "NIR (B5)"),
            attr("swir16", "SWIR 1 (B6)"),
            attr("swir22", "SWIR 2 (B7)"),
        ],
    },
    SatelliteConfig {
        collection: "CBERS4-WFI-16D-2",
        label: "CBERS-4 WFI (16 days)",
        attributes: &[
            attr("NDVI", "NDVI"),
            attr("EVI", "EVI"),
            attr("BAND13", "Band 13 (Blue)"),
            attr("BAND14", "Band 14 (Green)"),
            attr("BAND15", "Band 15 (Red)"),
            attr("BAND16", "Band 16 (NIR)"),
        ],
    },
    SatelliteConfig {
        collection: "CBERS4-MUX-2M-1",
        label: "CBERS-4 MUX (2 months)",
        attributes: &[
            attr("NDVI", "NDVI"),
            attr("EVI", "EVI"),
            attr("BAND5", "Band 5 (Blue)"),
            attr("BAND6", "Band 6 (Green)"),
            attr("BAND7", "Band 7 (Red)"),
            attr("BAND8", "Band 8 (NIR)"),
        ],
    },
    SatelliteConfig {
        collection: "MOD13Q1-6.1",
        label: "MODIS Terra (vegetation)",
        attributes: &[
            attr("NDVI", "NDVI"),
            attr("EVI", "EVI"),
            attr("red_reflectance", "Red Reflectance"),
            attr("NIR_reflectance", "NIR Reflectance"),
        ],
    },
    SatelliteConfig {
        collection: "MYD13Q1-6.1",
        label: "MODIS Aqua (vegetation)",
        attributes: &[
            attr("NDVI", "NDVI"),
            attr("EVI", "EVI"),
            attr("red_reflectance", "Red Reflectance"),
            attr("NIR_reflectance", "NIR Reflectance"),
        ],
    },
];

/// Collections that answer WTSS time-series queries.
pub static WTSS_COMPATIBLE_COLLECTIONS: &[&str] = &[
    "CBERS4-MUX-2M-1",
    "CBERS4-WFI-16D-2",
    "CBERS-WFI-8D-1",
    "LANDSAT-16D-1",
    "mod11a2-6.1",
    "mod13q1-6.1",
    "myd11a2-6.1",
    "myd13q1-6.1",
    "S2-16D-2",
];

/// Fallback attributes for WTSS collections missing from `SATELLITE_CONFIG`.
pub static DEFAULT_ATTRIBUTES: &[&str] = &["NDVI", "EVI"];

/// Look up a collection's configuration, exact id first, then case-insensitively.
pub fn satellite_config(collection_id: &str) -> Option<&'static SatelliteConfig> {
    if collection_id.is_empty() {
        return None;
    }
    SATELLITE_CONFIG
        .iter()
        .find(|c| c.collection == collection_id)
        .or_else(|| {
            SATELLITE_CONFIG
                .iter()
                .find(|c| c.collection.eq_ignore_ascii_case(collection_id))
        })
}

/// Attribute ids to request for a collection.
///
/// Configured collections use their full attribute list. Other WTSS
/// collections fall back to the vegetation indices. Anything else gets
/// nothing.
pub fn attributes_for_collection(collection_id: &str) -> Vec<String> {
    if let Some(config) = satellite_config(collection_id) {
        return config.attributes.iter().map(|a| a.id.to_string()).collect();
    }
    if is_wtss_compatible(collection_id) {
        return DEFAULT_ATTRIBUTES.iter().map(|s| s.to_string()).collect();
    }
    Vec::new()
}

pub fn is_wtss_compatible(collection_id: &str) -> bool {
    WTSS_COMPATIBLE_COLLECTIONS
        .iter()
        .any(|c| c.eq_ignore_ascii_case(collection_id))
}

/// Logical groups for picking collections by family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionGroup {
    All,
    Wtss,
    Amazonia,
    Cbers,
    Eta,
    Goes,
    Landsat,
    LandCover,
    Merge,
    Modis,
    Samet,
    Sentinel1,
    Sentinel2,
    Sentinel3,
    Sentinel5p,
}

impl CollectionGroup {
    pub const ALL: [CollectionGroup; 15] = [
        CollectionGroup::All,
        CollectionGroup::Wtss,
        CollectionGroup::Amazonia,
        CollectionGroup::Cbers,
        CollectionGroup::Eta,
        CollectionGroup::Goes,
        CollectionGroup::Landsat,
        CollectionGroup::LandCover,
        CollectionGroup::Merge,
        CollectionGroup::Modis,
        CollectionGroup::Samet,
        CollectionGroup::Sentinel1,
        CollectionGroup::Sentinel2,
        CollectionGroup::Sentinel3,
        CollectionGroup::Sentinel5p,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CollectionGroup::All => "all",
            CollectionGroup::Wtss => "wtss",
            CollectionGroup::Amazonia => "amazonia",
            CollectionGroup::Cbers => "cbers",
            CollectionGroup::Eta => "eta",
            CollectionGroup::Goes => "goes",
            CollectionGroup::Landsat => "landsat",
            CollectionGroup::LandCover => "lcc",
            CollectionGroup::Merge => "merge",
            CollectionGroup::Modis => "modis",
            CollectionGroup::Samet => "samet",
            CollectionGroup::Sentinel1 => "sentinel1",
            CollectionGroup::Sentinel2 => "sentinel2",
            CollectionGroup::Sentinel3 => "sentinel3",
            CollectionGroup::Sentinel5p => "sentinel5p",
        }
    }

    pub fn from_key(key: &str) -> Option<CollectionGroup> {
        CollectionGroup::ALL
            .into_iter()
            .find(|g| g.key().eq_ignore_ascii_case(key.trim()))
    }

    fn title_prefixes(&self) -> &'static [&'static str] {
        match self {
            CollectionGroup::All | CollectionGroup::Wtss => &[],
            CollectionGroup::Amazonia => &["amazonia"],
            CollectionGroup::Cbers => &["cbers"],
            CollectionGroup::Eta => &["eta model"],
            CollectionGroup::Goes => &["goes"],
            CollectionGroup::Landsat => &["landsat"],
            CollectionGroup::LandCover => &["lcc -"],
            CollectionGroup::Merge => &["merge"],
            CollectionGroup::Modis => &["modis", "mod11", "mod13", "myd11", "myd13"],
            CollectionGroup::Samet => &["samet"],
            CollectionGroup::Sentinel1 => &["sentinel-1"],
            CollectionGroup::Sentinel2 => &["sentinel-2", "s2 "],
            CollectionGroup::Sentinel3 => &["sentinel-3"],
            CollectionGroup::Sentinel5p => &["sentinel-5p"],
        }
    }

    /// Collection ids in this group, in listing order.
    pub fn select(&self, collections: &[Collection]) -> Vec<String> {
        collections
            .iter()
            .filter(|c| match self {
                CollectionGroup::All => true,
                CollectionGroup::Wtss => is_wtss_compatible(&c.id),
                _ => {
                    let title = c.title.to_lowercase();
                    self.title_prefixes().iter().any(|p| title.starts_with(p))
                }
            })
            .map(|c| c.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Vec<Collection> {
        [
            ("AMAZONIA1-WFI-L2-DN-1", "Amazonia-1 WFI Level 2"),
            ("CBERS4-WFI-16D-2", "CBERS-4 WFI 16 days"),
            ("mod13q1-6.1", "MOD13Q1 Vegetation Indices"),
            ("S2-16D-2", "Sentinel-2 16 days"),
            ("S2_L2A-1", "S2 L2A"),
        ]
        .iter()
        .map(|(id, title)| Collection {
            id: id.to_string(),
            title: title.to_string(),
        })
        .collect()
    }

    #[test]
    fn test_case_insensitive_config_lookup() {
        assert_eq!(
            satellite_config("mod13q1-6.1").map(|c| c.collection),
            Some("MOD13Q1-6.1")
        );
        assert!(satellite_config("").is_none());
        assert_eq!(attributes_for_collection("S2-16D-2").len(), 8);
    }

    #[test]
    fn test_attribute_fallbacks() {
        assert_eq!(attributes_for_collection("CBERS-WFI-8D-1"), vec!["NDVI", "EVI"]);
        assert!(attributes_for_collection("GOES19-L2-CMI-1").is_empty());
    }

    #[test]
    fn test_group_selection() {
        let collections = listing();
        assert_eq!(CollectionGroup::All.select(&collections).len(), 5);
        assert_eq!(
            CollectionGroup::Wtss.select(&collections),
            vec!["CBERS4-WFI-16D-2", "mod13q1-6.1", "S2-16D-2"]
        );
        assert_eq!(
            CollectionGroup::Sentinel2.select(&collections),
            vec!["S2-16D-2", "S2_L2A-1"]
        );
        assert_eq!(CollectionGroup::Modis.select(&collections), vec!["mod13q1-6.1"]);
    }

    #[test]
    fn test_group_keys() {
        assert_eq!(CollectionGroup::from_key("LCC"), Some(CollectionGroup::LandCover));
        assert_eq!(CollectionGroup::from_key("nope"), None);
    }
}
