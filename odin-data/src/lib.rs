//! Data processing for WTSS time series.
//!
//! This crate turns raw time-series responses and imagery search results
//! into chart-ready datasets: values are cleaned and scaled, each sample is
//! paired with the nearest scene thumbnail, and every attribute gets a stable
//! colour.

pub mod assembler;
pub mod cache;
pub mod matcher;
pub mod model;

/// Raw value cleaning and index scaling.
pub mod normalize {
    use std::collections::BTreeSet;

    /// Raw values at or below this are the catalog's "no data" marker.
    pub const MISSING_VALUE_THRESHOLD: f64 = -3000.0;

    /// Vegetation indices are stored multiplied by this factor.
    pub const INDEX_SCALE_DIVISOR: f64 = 10000.0;

    /// Attributes stored scaled by `INDEX_SCALE_DIVISOR`.
    pub const SCALED_ATTRIBUTES: [&str; 2] = ["NDVI", "EVI"];

    #[derive(Debug, Clone, PartialEq)]
    pub struct NormalizerConfig {
        pub missing_threshold: f64,
        pub scale_divisor: f64,
        pub scaled_attributes: BTreeSet<String>,
    }

    impl Default for NormalizerConfig {
        fn default() -> Self {
            NormalizerConfig {
                missing_threshold: MISSING_VALUE_THRESHOLD,
                scale_divisor: INDEX_SCALE_DIVISOR,
                scaled_attributes: SCALED_ATTRIBUTES.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    impl NormalizerConfig {
        pub fn is_scaled(&self, attribute_name: &str) -> bool {
            self.scaled_attributes.contains(attribute_name)
        }

        /// Map a raw sample to its display value.
        ///
        /// Missing, non-finite and sentinel values become `None`. Scaled
        /// attributes are divided by the scale divisor. Everything else
        /// passes through.
        pub fn normalize(&self, attribute_name: &str, raw_value: Option<f64>) -> Option<f64> {
            let raw = raw_value.filter(|v| v.is_finite())?;
            if raw <= self.missing_threshold {
                return None;
            }
            if self.is_scaled(attribute_name) && self.scale_divisor != 0.0 {
                Some(raw / self.scale_divisor)
            } else {
                Some(raw)
            }
        }
    }

    /// `normalize` with the default configuration.
    pub fn normalize(attribute_name: &str, raw_value: Option<f64>) -> Option<f64> {
        NormalizerConfig::default().normalize(attribute_name, raw_value)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_sentinel_and_missing_are_none() {
            for name in ["NDVI", "EVI", "B04", "red_reflectance", ""] {
                assert_eq!(normalize(name, None), None);
                assert_eq!(normalize(name, Some(-3000.0)), None);
                assert_eq!(normalize(name, Some(-9999.0)), None);
                assert_eq!(normalize(name, Some(f64::NAN)), None);
            }
        }

        #[test]
        fn test_scaled_indices() {
            assert_eq!(normalize("NDVI", Some(8000.0)), Some(0.8));
            assert_eq!(normalize("EVI", Some(-2999.0)), Some(-0.2999));
            assert_eq!(normalize("NDVI", Some(0.0)), Some(0.0));
        }

        #[test]
        fn test_unscaled_pass_through() {
            assert_eq!(normalize("B04", Some(1234.0)), Some(1234.0));
            assert_eq!(normalize("ndvi", Some(8000.0)), Some(8000.0));
            assert_eq!(normalize("nir08", Some(-2999.5)), Some(-2999.5));
        }

        #[test]
        fn test_custom_config() {
            let config = NormalizerConfig {
                missing_threshold: -1.0,
                scale_divisor: 100.0,
                scaled_attributes: ["LST".to_string()].into_iter().collect(),
            };
            assert_eq!(config.normalize("LST", Some(1500.0)), Some(15.0));
            assert_eq!(config.normalize("NDVI", Some(8000.0)), Some(8000.0));
            assert_eq!(config.normalize("LST", Some(-1.0)), None);
        }
    }
}

/// Deterministic per-attribute colours.
pub mod color {
    use serde::Serialize;

    /// Hue step between consecutive attributes, in degrees.
    pub const HUE_STEP_DEGREES: f64 = 137.5;
    pub const SATURATION: f64 = 0.70;
    pub const LIGHTNESS: f64 = 0.60;
    pub const BORDER_ALPHA: f64 = 1.0;
    pub const FILL_ALPHA: f64 = 0.7;

    /// An HSL colour assigned to one series.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
    pub struct SeriesColor {
        /// Hue in degrees, `[0, 360)`.
        pub hue: f64,
        pub saturation: f64,
        pub lightness: f64,
    }

    impl SeriesColor {
        /// Colour for the attribute at `index` in its response.
        pub fn for_index(index: usize) -> Self {
            SeriesColor {
                hue: (index as f64 * HUE_STEP_DEGREES) % 360.0,
                saturation: SATURATION,
                lightness: LIGHTNESS,
            }
        }

        fn hsla(&self, alpha: f64) -> String {
            format!(
                "hsla({}, {}%, {}%, {})",
                self.hue,
                (self.saturation * 100.0).round(),
                (self.lightness * 100.0).round(),
                alpha
            )
        }

        /// CSS colour for lines and labels.
        pub fn border(&self) -> String {
            self.hsla(BORDER_ALPHA)
        }

        /// CSS colour for point fills.
        pub fn background(&self) -> String {
            self.hsla(FILL_ALPHA)
        }

        /// Convert to 8-bit RGB.
        pub fn to_rgb(&self) -> (u8, u8, u8) {
            let c = (1.0 - (2.0 * self.lightness - 1.0).abs()) * self.saturation;
            let h = self.hue / 60.0;
            let x = c * (1.0 - (h % 2.0 - 1.0).abs());
            let (r, g, b) = match h as u32 {
                0 => (c, x, 0.0),
                1 => (x, c, 0.0),
                2 => (0.0, c, x),
                3 => (0.0, x, c),
                4 => (x, 0.0, c),
                _ => (c, 0.0, x),
            };
            let m = self.lightness - c / 2.0;
            let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
            (to_byte(r), to_byte(g), to_byte(b))
        }
    }

}
