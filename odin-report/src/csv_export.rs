//! Comma-separated export of selected coverages.
//!
//! Layout, one section per coverage:
//!
//! ```text
//! \u{feff}Coordinates,Lat: -12.000000,Lng: -45.000000
//!
//! WTSS coverage,S2-16D-2
//! Date,NDVI,EVI
//! 2024-01-01,0.8000,
//! ...
//!
//! ```

use crate::error::Result;
use csv::{Terminator, WriterBuilder};
use odin_data::model::{CoverageDatasets, Dataset};
use odin_stac::point::GeoPoint;
use std::sync::Arc;

/// UTF-8 byte order mark so spreadsheet tools pick the right encoding.
pub const BOM: &[u8] = "\u{feff}".as_bytes();

/// Decimals printed for scaled index values.
pub const SCALED_DECIMALS: usize = 4;

/// Fixed decimals for scaled values, or the shortest exact form when the
/// fixed rendering would not parse back to `value`.
fn scaled_cell(value: f64) -> String {
    let fixed = format!("{:.*}", SCALED_DECIMALS, value);
    if fixed.parse::<f64>().ok() == Some(value) {
        fixed
    } else {
        value.to_string()
    }
}

fn write_rows(out: &mut Vec<u8>, rows: &[Vec<String>]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn cell(dataset: &Dataset, index: usize) -> String {
    match dataset.points.get(index).and_then(|s| s.value) {
        None => String::new(),
        Some(v) if dataset.scaled => scaled_cell(v),
        Some(v) => v.to_string(),
    }
}

fn section_rows(coverage: &CoverageDatasets) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(coverage.len() + 2);
    rows.push(vec!["WTSS coverage".to_string(), coverage.coverage_id.clone()]);
    rows.push(
        std::iter::once("Date".to_string())
            .chain(coverage.datasets.iter().map(|d| d.label.clone()))
            .collect(),
    );
    for (index, date) in coverage.timeline.iter().enumerate() {
        rows.push(
            std::iter::once(date.clone())
                .chain(coverage.datasets.iter().map(|d| cell(d, index)))
                .collect(),
        );
    }
    rows
}

/// Encode `selected` coverages, in order, as CSV bytes.
pub fn to_csv(
    selected: &[Arc<CoverageDatasets>],
    coordinates: Option<GeoPoint>,
) -> Result<Vec<u8>> {
    let mut out = BOM.to_vec();
    if let Some(point) = coordinates {
        write_rows(
            &mut out,
            &[vec![
                "Coordinates".to_string(),
                format!("Lat: {:.6}", point.latitude),
                format!("Lng: {:.6}", point.longitude),
            ]],
        )?;
        out.push(b'\n');
    }
    for coverage in selected {
        write_rows(&mut out, &section_rows(coverage))?;
        out.push(b'\n');
    }
    Ok(out)
}
