//! Interactive behaviour of one coverage chart.
//!
//! A `ChartPresenter` owns the assembled datasets, the presentation mode and
//! the layout. Hover and click handling work in the same pixel space the
//! renderer draws in, so what is hit is what is shown.

use crate::layout::{index_range, value_range, ChartLayout, Projection, Rect};
use odin_data::{
    color::SeriesColor,
    model::{CoverageDatasets, Sample},
};
use serde::Serialize;
use std::sync::Arc;

/// Text shown in the overlay when no scene is close enough to the sample.
pub const NO_THUMBNAIL_PLACEHOLDER: &str = "(no nearby thumbnail)";

/// Distance between the caret and a flipped overlay.
pub const OVERLAY_OFFSET: f64 = 20.0;

/// Fraction of the overlay height kept between its bottom and the caret.
const OVERLAY_LIFT: f64 = 0.1;

const OVERLAY_WIDTH: f64 = 170.0;
const OVERLAY_TEXT_HEIGHT: f64 = 44.0;
const OVERLAY_THUMBNAIL_HEIGHT: f64 = 150.0;
const OVERLAY_PLACEHOLDER_HEIGHT: f64 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PresentationMode {
    /// Expanded view: custom overlay with the matched thumbnail.
    Detail,
    /// Dashboard view: plain tooltip without thumbnails.
    #[default]
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TooltipStrategy {
    CustomOverlay,
    BuiltIn,
}

impl PresentationMode {
    pub fn tooltip_strategy(self) -> TooltipStrategy {
        match self {
            PresentationMode::Detail => TooltipStrategy::CustomOverlay,
            PresentationMode::Summary => TooltipStrategy::BuiltIn,
        }
    }
}

/// A rendered point under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointHit {
    pub dataset_index: usize,
    pub point_index: usize,
    /// Caret position in pixels.
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ThumbnailSlot {
    Image(String),
    Placeholder,
    /// The tooltip strategy does not show thumbnails.
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipContent {
    pub label: String,
    pub color: SeriesColor,
    pub date: String,
    pub value: String,
    pub thumbnail: ThumbnailSlot,
}

impl TooltipContent {
    /// Approximate overlay box, used for placement.
    pub fn estimated_size(&self) -> (f64, f64) {
        let extra = match self.thumbnail {
            ThumbnailSlot::Image(_) => OVERLAY_THUMBNAIL_HEIGHT,
            ThumbnailSlot::Placeholder => OVERLAY_PLACEHOLDER_HEIGHT,
            ThumbnailSlot::Hidden => 0.0,
        };
        (OVERLAY_WIDTH, OVERLAY_TEXT_HEIGHT + extra)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverlaySide {
    Above,
    Below,
}

/// Top-left corner of an overlay box and the side it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayPlacement {
    pub left: f64,
    pub top: f64,
    pub side: OverlaySide,
}

/// Centre the overlay on the caret, above it unless that would clip the top.
pub fn place_overlay(caret_x: f64, caret_y: f64, width: f64, height: f64) -> OverlayPlacement {
    let left = caret_x - width / 2.0;
    if caret_y < height + OVERLAY_OFFSET {
        OverlayPlacement {
            left,
            top: caret_y + OVERLAY_OFFSET,
            side: OverlaySide::Below,
        }
    } else {
        OverlayPlacement {
            left,
            top: caret_y - height * (1.0 + OVERLAY_LIFT),
            side: OverlaySide::Above,
        }
    }
}

/// Result of hovering a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverState {
    pub hit: PointHit,
    pub content: TooltipContent,
    /// Only set for the custom overlay; the built-in tooltip places itself.
    pub overlay: Option<OverlayPlacement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Expanded,
    LegendIgnored,
}

/// Format like a default chart tooltip: at most three decimals, no trailing zeros.
pub fn format_value(value: f64) -> String {
    let text = format!("{:.3}", value);
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text.as_str()
    };
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct ChartPresenter {
    coverage: Arc<CoverageDatasets>,
    mode: PresentationMode,
    layout: ChartLayout,
}

impl ChartPresenter {
    pub fn new(coverage: Arc<CoverageDatasets>, mode: PresentationMode) -> Self {
        ChartPresenter {
            coverage,
            mode,
            layout: ChartLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: ChartLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Same chart in another mode; used when a summary chart is expanded.
    pub fn with_mode(&self, mode: PresentationMode) -> Self {
        ChartPresenter {
            coverage: Arc::clone(&self.coverage),
            mode,
            layout: self.layout,
        }
    }

    pub fn coverage(&self) -> &CoverageDatasets {
        &self.coverage
    }

    pub fn mode(&self) -> PresentationMode {
        self.mode
    }

    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    pub fn title(&self) -> String {
        match self.coverage.coordinates {
            Some(point) => format!(
                "Time series for point ({:.4}, {:.4})",
                point.latitude, point.longitude
            ),
            None => format!("Time series: {}", self.coverage.coverage_id),
        }
    }

    pub fn legend_labels(&self) -> Vec<&str> {
        self.coverage
            .datasets
            .iter()
            .map(|d| d.label.as_str())
            .collect()
    }

    pub fn legend_bounds(&self) -> Option<Rect> {
        self.layout.legend_bounds(&self.legend_labels())
    }

    pub fn projection(&self) -> Projection {
        Projection {
            plot: self.layout.plot_area(),
            x_range: index_range(self.coverage.len()),
            y_range: value_range(self.coverage.value_bounds()),
        }
    }

    /// Pixel polyline for one dataset through its non-missing samples only.
    pub fn polyline(&self, dataset_index: usize) -> Vec<(f64, f64)> {
        let projection = self.projection();
        self.coverage
            .datasets
            .get(dataset_index)
            .map(|dataset| {
                dataset
                    .spanned_points()
                    .into_iter()
                    .map(|(i, v)| projection.to_pixel(i as f64, v))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Nearest non-missing point to the cursor across every dataset.
    ///
    /// The cursor does not need to touch the point. On equal distances the
    /// point seen first (dataset order, then sample order) wins.
    pub fn nearest_point(&self, x: f64, y: f64) -> Option<PointHit> {
        let projection = self.projection();
        let mut best: Option<(f64, PointHit)> = None;
        for (dataset_index, dataset) in self.coverage.datasets.iter().enumerate() {
            for (point_index, value) in dataset.spanned_points() {
                let (px, py) = projection.to_pixel(point_index as f64, value);
                let distance = (px - x).powi(2) + (py - y).powi(2);
                if best.map_or(true, |(d, _)| distance < d) {
                    best = Some((
                        distance,
                        PointHit {
                            dataset_index,
                            point_index,
                            x: px,
                            y: py,
                        },
                    ));
                }
            }
        }
        best.map(|(_, hit)| hit)
    }

    pub fn sample(&self, hit: &PointHit) -> Option<&Sample> {
        self.coverage
            .datasets
            .get(hit.dataset_index)?
            .points
            .get(hit.point_index)
    }

    /// Tooltip content for a hit, shaped by the mode's strategy.
    pub fn tooltip(&self, hit: &PointHit) -> Option<TooltipContent> {
        let dataset = self.coverage.datasets.get(hit.dataset_index)?;
        let sample = dataset.points.get(hit.point_index)?;
        let thumbnail = match self.mode.tooltip_strategy() {
            TooltipStrategy::BuiltIn => ThumbnailSlot::Hidden,
            TooltipStrategy::CustomOverlay => match &sample.thumbnail {
                Some(url) => ThumbnailSlot::Image(url.clone()),
                None => ThumbnailSlot::Placeholder,
            },
        };
        Some(TooltipContent {
            label: dataset.label.clone(),
            color: dataset.color,
            date: sample.display_date.clone(),
            value: sample.value.map(format_value).unwrap_or_default(),
            thumbnail,
        })
    }

    pub fn hover(&self, x: f64, y: f64) -> Option<HoverState> {
        let hit = self.nearest_point(x, y)?;
        let content = self.tooltip(&hit)?;
        let overlay = match self.mode.tooltip_strategy() {
            TooltipStrategy::BuiltIn => None,
            TooltipStrategy::CustomOverlay => {
                let (width, height) = content.estimated_size();
                Some(place_overlay(hit.x, hit.y, width, height))
            }
        };
        Some(HoverState {
            hit,
            content,
            overlay,
        })
    }

    /// Run `on_expand` unless the click lands on the legend.
    pub fn click<F: FnOnce()>(&self, x: f64, y: f64, on_expand: F) -> ClickOutcome {
        if self.legend_bounds().is_some_and(|b| b.contains(x, y)) {
            return ClickOutcome::LegendIgnored;
        }
        on_expand();
        ClickOutcome::Expanded
    }
}
