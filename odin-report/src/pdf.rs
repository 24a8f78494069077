//! Paginated A4 report with one chart image per selected coverage.
//!
//! Positions are planned top-down in millimetres and only converted to the
//! PDF bottom-left origin when drawing.

use crate::{capture::ChartCapture, error::Result};
use image::{DynamicImage, RgbImage};
use log::debug;
use odin_data::model::CoverageDatasets;
use odin_stac::point::GeoPoint;
use printpdf::{BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument};
use std::sync::Arc;

pub const REPORT_TITLE: &str = "Time Series Report";

const TITLE_SIZE: f32 = 18.0;
const BODY_SIZE: f32 = 12.0;
const MM_PER_INCH: f64 = 25.4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    /// Vertical space after each chart.
    pub chart_gap: f64,
}

impl Default for PageLayout {
    /// A4 portrait with 15 mm margins.
    fn default() -> Self {
        PageLayout {
            page_width: 210.0,
            page_height: 297.0,
            margin: 15.0,
            chart_gap: 10.0,
        }
    }
}

impl PageLayout {
    pub fn content_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }
}

/// A line of text at a top-down position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub size: f32,
    pub bold: bool,
}

/// Where one chart image lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPlacement {
    pub page: usize,
    pub x: f64,
    /// Top edge, measured from the top of the page.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportPlan {
    /// Header lines, all on the first page.
    pub header: Vec<TextLine>,
    pub charts: Vec<ChartPlacement>,
    pub page_count: usize,
}

/// Lay out the header and charts. `aspect_ratios` are height over width.
pub fn plan_report(
    layout: &PageLayout,
    coordinates: Option<GeoPoint>,
    aspect_ratios: &[f64],
) -> ReportPlan {
    let margin = layout.margin;
    let mut y = margin;
    let mut header = vec![TextLine {
        text: REPORT_TITLE.to_string(),
        x: margin,
        y,
        size: TITLE_SIZE,
        bold: true,
    }];
    y += 10.0;

    if let Some(point) = coordinates {
        let lines = [
            ("Point coordinates:".to_string(), margin, 6.0),
            (format!("Lat: {:.6}", point.latitude), margin + 5.0, 6.0),
            (format!("Lng: {:.6}", point.longitude), margin + 5.0, 10.0),
        ];
        for (text, x, advance) in lines {
            header.push(TextLine {
                text,
                x,
                y,
                size: BODY_SIZE,
                bold: false,
            });
            y += advance;
        }
    }

    let width = layout.content_width();
    let mut page = 0;
    let mut charts = Vec::with_capacity(aspect_ratios.len());
    for ratio in aspect_ratios {
        let height = width * ratio;
        if y + height + margin > layout.page_height {
            page += 1;
            y = margin;
        }
        charts.push(ChartPlacement {
            page,
            x: margin,
            y,
            width,
            height,
        });
        y += height + layout.chart_gap;
    }

    ReportPlan {
        header,
        charts,
        page_count: page + 1,
    }
}

/// Capture every selected chart, then lay out and write the report.
///
/// Captures run before anything is drawn, so one failure yields no document.
pub fn to_pdf<C: ChartCapture>(
    layout: &PageLayout,
    selected: &[Arc<CoverageDatasets>],
    coordinates: Option<GeoPoint>,
    capture: &C,
) -> Result<(Vec<u8>, ReportPlan)> {
    let images = selected
        .iter()
        .map(|coverage| capture.capture(coverage))
        .collect::<Result<Vec<_>>>()?;
    let ratios: Vec<f64> = images
        .iter()
        .map(|img| img.height() as f64 / img.width().max(1) as f64)
        .collect();
    let plan = plan_report(layout, coordinates, &ratios);
    let bytes = write_pdf(layout, &plan, &images)?;
    Ok((bytes, plan))
}

/// Write a planned report. `images` must line up with `plan.charts`.
pub fn write_pdf(layout: &PageLayout, plan: &ReportPlan, images: &[RgbImage]) -> Result<Vec<u8>> {
    let page_w = Mm(layout.page_width as f32);
    let page_h = Mm(layout.page_height as f32);
    let (doc, first_page, first_layer) = PdfDocument::new(REPORT_TITLE, page_w, page_h, "Layer 1");
    let mut pages = vec![(first_page, first_layer)];
    for _ in 1..plan.page_count {
        pages.push(doc.add_page(page_w, page_h, "Layer 1"));
    }

    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let (page, layer) = pages[0];
    let first = doc.get_page(page).get_layer(layer);
    for line in &plan.header {
        let font: &IndirectFontRef = if line.bold { &bold } else { &regular };
        first.use_text(
            line.text.as_str(),
            line.size,
            Mm(line.x as f32),
            Mm((layout.page_height - line.y) as f32),
            font,
        );
    }

    for (placement, bitmap) in plan.charts.iter().zip(images) {
        let Some(&(page, layer)) = pages.get(placement.page) else {
            continue;
        };
        let dpi = bitmap.width() as f64 * MM_PER_INCH / placement.width;
        let image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(bitmap.clone()));
        image.add_to_layer(
            doc.get_page(page).get_layer(layer),
            ImageTransform {
                translate_x: Some(Mm(placement.x as f32)),
                translate_y: Some(Mm(
                    (layout.page_height - placement.y - placement.height) as f32,
                )),
                dpi: Some(dpi as f32),
                ..Default::default()
            },
        );
    }
    debug!(
        "pdf: {} charts on {} pages",
        plan.charts.len(),
        plan.page_count
    );
    Ok(doc.save_to_bytes()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_with_coordinates() {
        let plan = plan_report(&PageLayout::default(), Some(GeoPoint::new(-12.5, -45.25)), &[]);
        let texts: Vec<(&str, f64)> = plan.header.iter().map(|l| (l.text.as_str(), l.y)).collect();
        assert_eq!(
            texts,
            vec![
                (REPORT_TITLE, 15.0),
                ("Point coordinates:", 25.0),
                ("Lat: -12.500000", 31.0),
                ("Lng: -45.250000", 37.0),
            ]
        );
        assert!(plan.header[0].bold);
        assert_eq!(plan.page_count, 1);
    }

    #[test]
    fn test_charts_fill_width_and_keep_ratio() {
        let plan = plan_report(&PageLayout::default(), None, &[0.5]);
        let chart = plan.charts[0];
        assert_eq!(chart.x, 15.0);
        assert_eq!(chart.y, 25.0);
        assert_eq!(chart.width, 180.0);
        assert_eq!(chart.height, 90.0);
    }

    #[test]
    fn test_pagination() {
        // 25 + 90 + 10 = 125, 125 + 90 + 10 = 225; a third chart would end at 315.
        let plan = plan_report(&PageLayout::default(), None, &[0.5, 0.5, 0.5, 0.5]);
        let pages: Vec<usize> = plan.charts.iter().map(|c| c.page).collect();
        assert_eq!(pages, vec![0, 0, 1, 1]);
        assert_eq!(plan.charts[1].y, 125.0);
        assert_eq!(plan.charts[2].y, 15.0);
        assert_eq!(plan.charts[3].y, 115.0);
        assert_eq!(plan.page_count, 2);
    }

    #[test]
    fn test_chart_touching_bottom_margin_stays() {
        // 25 + 90 + 15 = 130 exactly.
        let layout = PageLayout {
            page_height: 130.0,
            ..PageLayout::default()
        };
        let plan = plan_report(&layout, None, &[0.5, 0.5]);
        assert_eq!(plan.charts[0].page, 0);
        assert_eq!(plan.charts[1].page, 1);
    }

    #[test]
    fn test_write_pdf_bytes() {
        let layout = PageLayout::default();
        let plan = plan_report(&layout, Some(GeoPoint::new(-12.0, -45.0)), &[0.5, 0.5, 0.5]);
        let images = vec![RgbImage::from_pixel(40, 20, image::Rgb([255, 0, 0])); 3];
        let bytes = write_pdf(&layout, &plan, &images).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
