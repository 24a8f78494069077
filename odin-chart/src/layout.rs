//! Pixel geometry of a chart.
//!
//! ```text
//! +--------------------------------------+
//! |               title band             |
//! |   [-- NDVI]  [-- EVI]  legend band   |
//! |      +---------------------------+   |
//! |  y   |         plot area         |   |
//! | lbl  |                           |   |
//! |      +---------------------------+   |
//! |             x labels                 |
//! +--------------------------------------+
//! ```

use serde::Serialize;

pub const DEFAULT_WIDTH: u32 = 900;
pub const DEFAULT_HEIGHT: u32 = 450;

/// Legend swatch length in unscaled pixels.
const SWATCH: f64 = 20.0;
const SWATCH_GAP: f64 = 6.0;
const ENTRY_GAP: f64 = 16.0;
/// Rough glyph advance for legend labels at the legend font size.
const CHAR_WIDTH: f64 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSize {
    fn default() -> Self {
        ChartSize {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl ChartSize {
    /// Height over width, used to keep the aspect ratio when embedding.
    pub fn aspect_ratio(&self) -> f64 {
        self.height as f64 / self.width as f64
    }
}

/// Axis-aligned rectangle in pixels. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// One legend entry and the box it occupies.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub bounds: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartLayout {
    pub size: ChartSize,
    /// Multiplier applied to every band, margin and font.
    pub scale: f64,
    pub title_band: f64,
    pub legend_band: f64,
    pub margin: f64,
    pub y_label_area: f64,
    pub x_label_area: f64,
    pub title_font: f64,
    pub label_font: f64,
}

impl Default for ChartLayout {
    fn default() -> Self {
        ChartLayout::new(ChartSize::default())
    }
}

impl ChartLayout {
    pub fn new(size: ChartSize) -> Self {
        ChartLayout {
            size,
            scale: 1.0,
            title_band: 30.0,
            legend_band: 30.0,
            margin: 10.0,
            y_label_area: 60.0,
            x_label_area: 40.0,
            title_font: 16.0,
            label_font: 12.0,
        }
    }

    /// The same layout drawn `factor` times larger.
    pub fn scaled(&self, factor: f64) -> Self {
        ChartLayout {
            size: ChartSize {
                width: (self.size.width as f64 * factor).round() as u32,
                height: (self.size.height as f64 * factor).round() as u32,
            },
            scale: self.scale * factor,
            title_band: self.title_band * factor,
            legend_band: self.legend_band * factor,
            margin: self.margin * factor,
            y_label_area: self.y_label_area * factor,
            x_label_area: self.x_label_area * factor,
            title_font: self.title_font * factor,
            label_font: self.label_font * factor,
        }
    }

    pub fn header_height(&self) -> f64 {
        self.title_band + self.legend_band
    }

    pub fn plot_area(&self) -> Rect {
        Rect {
            left: self.margin + self.y_label_area,
            top: self.header_height() + self.margin,
            right: self.size.width as f64 - self.margin,
            bottom: self.size.height as f64 - self.margin - self.x_label_area,
        }
    }

    /// Centred, single-row legend entries in draw order.
    pub fn legend_entries<S: AsRef<str>>(&self, labels: &[S]) -> Vec<LegendEntry> {
        let widths: Vec<f64> = labels
            .iter()
            .map(|l| {
                (SWATCH + SWATCH_GAP + l.as_ref().chars().count() as f64 * CHAR_WIDTH) * self.scale
            })
            .collect();
        let gap = ENTRY_GAP * self.scale;
        let total = widths.iter().sum::<f64>() + gap * widths.len().saturating_sub(1) as f64;
        let mut left = (self.size.width as f64 - total) / 2.0;
        let top = self.title_band;
        let bottom = self.title_band + self.legend_band;
        labels
            .iter()
            .zip(widths)
            .map(|(label, width)| {
                let entry = LegendEntry {
                    label: label.as_ref().to_string(),
                    bounds: Rect {
                        left,
                        top,
                        right: left + width,
                        bottom,
                    },
                };
                left += width + gap;
                entry
            })
            .collect()
    }

    /// Box around all legend entries, or `None` with no entries.
    pub fn legend_bounds<S: AsRef<str>>(&self, labels: &[S]) -> Option<Rect> {
        let entries = self.legend_entries(labels);
        let first = entries.first()?;
        let last = entries.last()?;
        Some(Rect {
            left: first.bounds.left,
            top: first.bounds.top,
            right: last.bounds.right,
            bottom: first.bounds.bottom,
        })
    }

    pub fn swatch_length(&self) -> f64 {
        SWATCH * self.scale
    }

    pub fn swatch_gap(&self) -> f64 {
        SWATCH_GAP * self.scale
    }
}

/// Linear data-to-pixel mapping over the plot area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub plot: Rect,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl Projection {
    pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let (x0, x1) = self.x_range;
        let (y0, y1) = self.y_range;
        let px = self.plot.left + (x - x0) / (x1 - x0) * self.plot.width();
        let py = self.plot.bottom - (y - y0) / (y1 - y0) * self.plot.height();
        (px, py)
    }
}

/// X range over sample indices. A single sample is centred.
pub fn index_range(len: usize) -> (f64, f64) {
    if len <= 1 {
        (-0.5, 0.5)
    } else {
        (0.0, (len - 1) as f64)
    }
}

/// Y range over `bounds` with 5 % headroom on each side.
pub fn value_range(bounds: Option<(f64, f64)>) -> (f64, f64) {
    match bounds {
        None => (0.0, 1.0),
        Some((lo, hi)) if hi > lo => {
            let pad = (hi - lo) * 0.05;
            (lo - pad, hi + pad)
        }
        Some((lo, _)) => (lo - 0.5, lo + 0.5),
    }
}
