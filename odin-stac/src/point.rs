use serde::{Deserialize, Serialize};

/// A geographic point in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    /// True when both coordinates are finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// GeoJSON coordinate order: `[lng, lat]`.
    pub fn as_geojson_coordinates(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

#[cfg(test)]
mod tests {
    use super::GeoPoint;

    #[test]
    fn test_point_validity() {
        assert!(GeoPoint::new(-14.235, -51.925).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::NAN).is_valid());
    }

    #[test]
    fn test_geojson_order() {
        let p = GeoPoint::new(-12.5, -45.25);
        assert_eq!(p.as_geojson_coordinates(), [-45.25, -12.5]);
    }
}
