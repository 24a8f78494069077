//! CSV and PDF reports for selected coverages.
//!
//! Exports run one at a time through an `ExportLock`. A PDF export captures
//! every chart before the document is built, so a failed capture leaves
//! nothing behind.

pub mod capture;
pub mod csv_export;
pub mod error;
pub mod lock;
pub mod pdf;

pub use capture::{ChartCapture, PlottersCapture};
pub use error::{ReportError, Result};
pub use lock::ExportLock;
pub use pdf::PageLayout;

use log::info;
use odin_data::model::CoverageDatasets;
use odin_stac::point::GeoPoint;
use std::sync::Arc;

pub const CSV_FILE_NAME: &str = "series-temporais-export.csv";
pub const PDF_FILE_NAME: &str = "relatorio-series-temporais.pdf";

#[derive(Debug, Default)]
pub struct ReportExporter {
    page: PageLayout,
    lock: ExportLock,
}

impl ReportExporter {
    pub fn new(page: PageLayout) -> Self {
        ReportExporter {
            page,
            lock: ExportLock::new(),
        }
    }

    pub fn lock(&self) -> &ExportLock {
        &self.lock
    }

    pub fn export_csv(
        &self,
        selected: &[Arc<CoverageDatasets>],
        coordinates: Option<GeoPoint>,
    ) -> Result<Vec<u8>> {
        let _guard = self.lock.try_acquire()?;
        let bytes = csv_export::to_csv(selected, coordinates)?;
        info!("csv export: {} coverages, {} bytes", selected.len(), bytes.len());
        Ok(bytes)
    }

    pub fn export_pdf<C: ChartCapture>(
        &self,
        selected: &[Arc<CoverageDatasets>],
        coordinates: Option<GeoPoint>,
        capture: &C,
    ) -> Result<Vec<u8>> {
        let _guard = self.lock.try_acquire()?;
        let (bytes, plan) = pdf::to_pdf(&self.page, selected, coordinates, capture)?;
        info!(
            "pdf export: {} charts on {} pages, {} bytes",
            plan.charts.len(),
            plan.page_count,
            bytes.len()
        );
        Ok(bytes)
    }
}
