//! Chart-ready records produced by the assembler.
//!
//! These are rebuilt from the source responses whenever they change and are
//! never mutated in place.

use crate::color::SeriesColor;
use odin_stac::point::GeoPoint;
use serde::Serialize;

/// One timestamped value of a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Timeline entry exactly as the service sent it.
    pub raw_date: String,
    /// Timeline entry formatted for display.
    pub display_date: String,
    /// Normalized value; `None` when the sample is missing.
    pub value: Option<f64>,
    /// Value before normalization.
    pub raw_value: Option<f64>,
    /// Thumbnail of the nearest scene within the matching window.
    pub thumbnail: Option<String>,
}

/// One renderable series: all samples of one attribute of one coverage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub points: Vec<Sample>,
    /// Position of the attribute in its response.
    pub color_index: usize,
    pub color: SeriesColor,
    /// Whether values were divided by the index scale divisor.
    pub scaled: bool,
}

impl Dataset {
    /// `(index, value)` pairs for the non-missing samples, in order.
    ///
    /// Missing samples are skipped rather than breaking the series, so a
    /// renderer draws one continuous line through the remaining points.
    pub fn spanned_points(&self) -> Vec<(usize, f64)> {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.value.map(|v| (i, v)))
            .collect()
    }

    /// Smallest and largest non-missing value.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .filter_map(|s| s.value)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Everything assembled for a single coverage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageDatasets {
    pub coverage_id: String,
    /// Raw timeline entries, one per sample index.
    pub timeline: Vec<String>,
    /// Display labels for the x axis, aligned with `timeline`.
    pub labels: Vec<String>,
    pub coordinates: Option<GeoPoint>,
    pub datasets: Vec<Dataset>,
}

impl CoverageDatasets {
    /// Value range across every dataset, or `None` if all samples are missing.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.datasets
            .iter()
            .filter_map(Dataset::value_bounds)
            .reduce(|(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)))
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }
}
