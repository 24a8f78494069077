//! The `report` subcommand: search, fetch, select and export in one run.

use crate::{
    search::batched_search,
    session::{Session, ValidationError},
    timeseries::auto_fetch,
    AppContext, CollectionArgs, PointArgs,
};
use anyhow::Context;
use log::{info, warn};
use odin_chart::{render::render_svg, ChartPresenter, PresentationMode};
use odin_data::model::CoverageDatasets;
use odin_report::{PlottersCapture, ReportExporter, CSV_FILE_NAME, PDF_FILE_NAME};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

/// Which files a report run writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportOutputs {
    pub csv: Option<PathBuf>,
    pub pdf: Option<PathBuf>,
    pub svg_dir: Option<PathBuf>,
}

impl ReportOutputs {
    /// With nothing requested, write both documents under their default names.
    pub fn or_defaults(self) -> Self {
        if self.csv.is_none() && self.pdf.is_none() && self.svg_dir.is_none() {
            ReportOutputs {
                csv: Some(PathBuf::from(CSV_FILE_NAME)),
                pdf: Some(PathBuf::from(PDF_FILE_NAME)),
                svg_dir: None,
            }
        } else {
            self
        }
    }
}

fn write_bytes(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// File-system safe name for a coverage id.
fn svg_file_name(coverage_id: &str) -> String {
    let stem: String = coverage_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{stem}.svg")
}

/// Select the named coverages, or every assembled one when none are named,
/// and return them ready for export.
pub fn select_coverages(
    session: &mut Session,
    names: &[String],
) -> Result<Vec<Arc<CoverageDatasets>>, ValidationError> {
    if names.is_empty() {
        for coverage in session.assembled() {
            session.select(&coverage.coverage_id);
        }
    }
    for coverage in names {
        if session.series(coverage).is_none() {
            warn!("{} has no time series in this search", coverage);
        }
        session.select(coverage);
    }
    session.selected_datasets()
}

pub async fn run_report(
    ctx: &AppContext,
    point: PointArgs,
    collections: CollectionArgs,
    select: Vec<String>,
    outputs: ReportOutputs,
    concurrency: usize,
) -> anyhow::Result<()> {
    let mut session = point.session(ctx)?;
    let (geo, range) = session.fetch_params()?;
    let ticket = session.begin_search()?;

    let ids = ctx.resolve_collections(&collections).await?;
    let scenes = batched_search(&ctx.client, &geo, &ids, Some(&range)).await;
    session.apply_imagery(ticket, scenes);
    let applied = auto_fetch(&mut session, ticket, &ctx.client, concurrency).await;
    info!("{} time series loaded", applied);

    let selected = select_coverages(&mut session, &select)?;

    let outputs = outputs.or_defaults();
    let exporter = ReportExporter::default();
    let coordinates = Some(geo);

    if let Some(path) = &outputs.csv {
        let bytes = exporter.export_csv(&selected, coordinates)?;
        write_bytes(path, &bytes)?;
    }
    if let Some(path) = &outputs.pdf {
        let bytes = exporter.export_pdf(&selected, coordinates, &PlottersCapture::default())?;
        write_bytes(path, &bytes)?;
    }
    if let Some(dir) = &outputs.svg_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for coverage in &selected {
            let presenter = ChartPresenter::new(coverage.clone(), PresentationMode::Summary);
            let svg = render_svg(&presenter)?;
            write_bytes(&dir.join(svg_file_name(&coverage.coverage_id)), svg.as_bytes())?;
        }
    }
    Ok(())
}
