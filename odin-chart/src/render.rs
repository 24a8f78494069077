//! plotters output for a `ChartPresenter`.

use crate::{layout::ChartLayout, presenter::ChartPresenter, ChartError, Result};
use image::RgbImage;
use log::debug;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

/// Upper bound on x-axis labels.
pub const MAX_X_LABELS: usize = 12;

const FONT: &str = "sans-serif";
const POINT_RADIUS: f64 = 3.0;
const LINE_WIDTH: f64 = 2.0;

fn series_color(color: &odin_data::color::SeriesColor) -> RGBColor {
    let (r, g, b) = color.to_rgb();
    RGBColor(r, g, b)
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    presenter: &ChartPresenter,
    layout: &ChartLayout,
) -> DrawResult<(), DB> {
    root.fill(&WHITE)?;
    let coverage = presenter.coverage();
    let width = layout.size.width as i32;

    let title_style = TextStyle::from((FONT, layout.title_font).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    root.draw_text(
        &presenter.title(),
        &title_style,
        (width / 2, (layout.title_band / 2.0) as i32),
    )?;

    let legend_style = TextStyle::from((FONT, layout.label_font).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    let labels = presenter.legend_labels();
    for (entry, dataset) in layout.legend_entries(&labels).iter().zip(&coverage.datasets) {
        let color = series_color(&dataset.color);
        let mid_y = ((entry.bounds.top + entry.bounds.bottom) / 2.0) as i32;
        let x0 = entry.bounds.left as i32;
        let x1 = (entry.bounds.left + layout.swatch_length()) as i32;
        root.draw(&PathElement::new(
            vec![(x0, mid_y), (x1, mid_y)],
            color.stroke_width((LINE_WIDTH * layout.scale) as u32),
        ))?;
        root.draw_text(
            &entry.label,
            &legend_style,
            (x1 + layout.swatch_gap() as i32, mid_y),
        )?;
    }

    let (_, body) = root.split_vertically(layout.header_height() as u32);
    let projection = presenter.projection();
    let (x0, x1) = projection.x_range;
    let (y0, y1) = projection.y_range;
    let mut chart = ChartBuilder::on(&body)
        .margin(layout.margin as u32)
        .x_label_area_size(layout.x_label_area as u32)
        .y_label_area_size(layout.y_label_area as u32)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    let x_labels = &coverage.labels;
    let label_at = |x: &f64| {
        let index = x.round();
        if (x - index).abs() > 1e-6 || index < 0.0 {
            return String::new();
        }
        x_labels.get(index as usize).cloned().unwrap_or_default()
    };
    let axis_font = (FONT, layout.label_font).into_font();
    chart
        .configure_mesh()
        .x_labels(MAX_X_LABELS.min(coverage.len().max(1)))
        .x_label_formatter(&label_at)
        .x_label_style(axis_font.clone())
        .y_label_style(axis_font.clone())
        .x_desc("Date")
        .y_desc("Index value")
        .axis_desc_style(axis_font)
        .draw()?;

    let stroke = (LINE_WIDTH * layout.scale).max(1.0) as u32;
    let radius = (POINT_RADIUS * layout.scale).max(1.0) as u32;
    for dataset in &coverage.datasets {
        let color = series_color(&dataset.color);
        let points: Vec<(f64, f64)> = dataset
            .spanned_points()
            .into_iter()
            .map(|(i, v)| (i as f64, v))
            .collect();
        chart.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(stroke)))?;
        chart.draw_series(
            points
                .iter()
                .map(|&p| Circle::new(p, radius, color.mix(0.7).filled())),
        )?;
    }
    root.present()?;
    Ok(())
}

/// Render `presenter` as an SVG document at its layout size.
pub fn render_svg(presenter: &ChartPresenter) -> Result<String> {
    let layout = *presenter.layout();
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (layout.size.width, layout.size.height))
            .into_drawing_area();
        draw_chart(&root, presenter, &layout).map_err(|e| ChartError::Drawing(e.to_string()))?;
    }
    debug!(
        "rendered {} as svg ({} bytes)",
        presenter.coverage().coverage_id,
        svg.len()
    );
    Ok(svg)
}

/// Render `presenter` into an RGB bitmap, `scale` times the layout size.
pub fn render_rgb(presenter: &ChartPresenter, scale: f64) -> Result<RgbImage> {
    let layout = presenter.layout().scaled(scale);
    let (width, height) = (layout.size.width, layout.size.height);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_chart(&root, presenter, &layout).map_err(|e| ChartError::Drawing(e.to_string()))?;
    }
    debug!(
        "rendered {} as {}x{} bitmap",
        presenter.coverage().coverage_id,
        width,
        height
    );
    RgbImage::from_raw(width, height, buffer).ok_or(ChartError::Buffer { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PresentationMode;
    use odin_data::{
        color::SeriesColor,
        model::{CoverageDatasets, Dataset, Sample},
    };
    use odin_stac::point::GeoPoint;
    use std::sync::Arc;

    fn coverage(len: usize) -> Arc<CoverageDatasets> {
        let labels: Vec<String> = (0..len).map(|i| format!("L{i:02}")).collect();
        let points = (0..len)
            .map(|i| Sample {
                raw_date: labels[i].clone(),
                display_date: labels[i].clone(),
                value: if i % 4 == 1 { None } else { Some(0.5 + i as f64 / 100.0) },
                raw_value: None,
                thumbnail: None,
            })
            .collect();
        Arc::new(CoverageDatasets {
            coverage_id: "S2-16D-2".to_string(),
            timeline: labels.clone(),
            labels,
            coordinates: Some(GeoPoint::new(-12.0, -45.0)),
            datasets: vec![Dataset {
                label: "NDVI".to_string(),
                points,
                color_index: 0,
                color: SeriesColor::for_index(0),
                scaled: true,
            }],
        })
    }

    #[test]
    fn test_svg_has_title_and_axis_titles() {
        let presenter = ChartPresenter::new(coverage(3), PresentationMode::Summary);
        let svg = render_svg(&presenter).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Time series for point (-12.0000, -45.0000)"));
        assert!(svg.contains(">Date<"));
        assert!(svg.contains(">Index value<"));
        assert!(svg.contains(">NDVI<"));
    }

    #[test]
    fn test_svg_caps_x_labels() {
        let presenter = ChartPresenter::new(coverage(40), PresentationMode::Summary);
        let svg = render_svg(&presenter).unwrap();
        let shown = svg.matches(">L").count();
        assert!(shown > 0);
        assert!(shown <= MAX_X_LABELS);
    }

    #[test]
    fn test_bitmap_follows_scaled_layout() {
        let presenter = ChartPresenter::new(coverage(3), PresentationMode::Detail);
        let expected = presenter.layout().scaled(2.0).size;
        let img = render_rgb(&presenter, 2.0).unwrap();
        assert_eq!((img.width(), img.height()), (expected.width, expected.height));
        assert_eq!((img.width(), img.height()), (1800, 900));
        assert_eq!(img.get_pixel(1, 1).0, [255, 255, 255]);
    }
}
