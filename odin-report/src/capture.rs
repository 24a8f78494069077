//! Raster snapshots of charts for embedding in the PDF.

use crate::error::{ReportError, Result};
use image::RgbImage;
use odin_chart::{layout::ChartLayout, render::render_rgb, ChartPresenter, PresentationMode};
use odin_data::model::CoverageDatasets;
use std::sync::Arc;

/// Pixel density of report captures relative to the on-screen layout.
pub const CAPTURE_SCALE: f64 = 2.0;

/// Produces one bitmap per selected coverage.
///
/// An error for any coverage aborts the export that asked for it.
pub trait ChartCapture {
    fn capture(&self, coverage: &Arc<CoverageDatasets>) -> Result<RgbImage>;
}

/// Renders charts with plotters, the same way they appear on screen.
#[derive(Debug, Clone)]
pub struct PlottersCapture {
    pub layout: ChartLayout,
    pub mode: PresentationMode,
    pub scale: f64,
}

impl Default for PlottersCapture {
    fn default() -> Self {
        PlottersCapture {
            layout: ChartLayout::default(),
            mode: PresentationMode::Summary,
            scale: CAPTURE_SCALE,
        }
    }
}

impl ChartCapture for PlottersCapture {
    fn capture(&self, coverage: &Arc<CoverageDatasets>) -> Result<RgbImage> {
        let presenter =
            ChartPresenter::new(Arc::clone(coverage), self.mode).with_layout(self.layout);
        render_rgb(&presenter, self.scale).map_err(|e| ReportError::Capture {
            coverage: coverage.coverage_id.clone(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odin_chart::layout::ChartSize;
    use odin_data::{
        color::SeriesColor,
        model::{Dataset, Sample},
    };

    fn coverage() -> Arc<CoverageDatasets> {
        let dates = ["2024-01-01", "2024-01-17"];
        Arc::new(CoverageDatasets {
            coverage_id: "S2-16D-2".to_string(),
            timeline: dates.iter().map(|d| d.to_string()).collect(),
            labels: dates.iter().map(|d| d.to_string()).collect(),
            coordinates: None,
            datasets: vec![Dataset {
                label: "NDVI".to_string(),
                points: dates
                    .iter()
                    .map(|d| Sample {
                        raw_date: d.to_string(),
                        display_date: d.to_string(),
                        value: Some(0.8),
                        raw_value: Some(8000.0),
                        thumbnail: None,
                    })
                    .collect(),
                color_index: 0,
                color: SeriesColor::for_index(0),
                scaled: true,
            }],
        })
    }

    #[test]
    fn test_capture_at_double_scale() {
        let capture = PlottersCapture::default();
        let img = capture.capture(&coverage()).unwrap();
        let size = capture.layout.size;
        assert_eq!(img.width(), size.width * 2);
        assert_eq!(img.height(), size.height * 2);
    }

    #[test]
    fn test_capture_uses_custom_layout() {
        let capture = PlottersCapture {
            layout: ChartLayout::new(ChartSize {
                width: 400,
                height: 300,
            }),
            scale: 1.0,
            ..PlottersCapture::default()
        };
        let img = capture.capture(&coverage()).unwrap();
        assert_eq!((img.width(), img.height()), (400, 300));
    }
}
