//! State of one point analysis: the search inputs, what came back, and
//! which coverages are selected for export.
//!
//! Every search opens a new generation. Fetches started under an older
//! generation hand in a stale `Ticket` and their results are dropped, so a
//! slow response can never overwrite the data of a newer search.

use log::{debug, info};
use odin_data::{
    assembler::AssemblerConfig,
    cache::{DatasetCache, SourceVersion},
    model::CoverageDatasets,
};
use odin_stac::{
    catalog::is_wtss_compatible, date_range::DateRange, imagery::ImageryResult, point::GeoPoint,
    timeseries::TimeSeriesResponse,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

/// A missing precondition, reported before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Select a point first (--lat and --lng)")]
    MissingPoint,
    #[error("Select a date range first (--start and --end)")]
    MissingDateRange,
    #[error("Select at least one chart to export")]
    EmptySelection,
}

/// Proof of which search generation a fetch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
struct StoredSeries {
    version: u64,
    response: TimeSeriesResponse,
}

#[derive(Debug, Default)]
pub struct Session {
    point: Option<GeoPoint>,
    date_range: Option<DateRange>,
    generation: u64,
    imagery: Vec<ImageryResult>,
    imagery_version: u64,
    series: BTreeMap<String, StoredSeries>,
    next_series_version: u64,
    selection: BTreeSet<String>,
    assembler: AssemblerConfig,
    cache: DatasetCache,
}

impl Session {
    pub fn new(assembler: AssemblerConfig) -> Self {
        Session {
            assembler,
            ..Session::default()
        }
    }

    pub fn set_point(&mut self, point: Option<GeoPoint>) {
        self.point = point;
    }

    pub fn set_date_range(&mut self, date_range: Option<DateRange>) {
        self.date_range = date_range;
    }

    pub fn point(&self) -> Option<GeoPoint> {
        self.point
    }

    pub fn date_range(&self) -> Option<DateRange> {
        self.date_range
    }

    /// Point and date range for time-series requests.
    pub fn fetch_params(&self) -> Result<(GeoPoint, DateRange), ValidationError> {
        let point = self.point.ok_or(ValidationError::MissingPoint)?;
        let range = self.date_range.ok_or(ValidationError::MissingDateRange)?;
        Ok((point, range))
    }

    /// Start a new search: results of earlier searches are cleared and any
    /// fetch still holding an older ticket will be ignored.
    pub fn begin_search(&mut self) -> Result<Ticket, ValidationError> {
        if self.point.is_none() {
            return Err(ValidationError::MissingPoint);
        }
        self.reset();
        debug!("search generation {}", self.generation);
        Ok(Ticket(self.generation))
    }

    /// Drop all results. In-flight fetches become stale.
    pub fn close(&mut self) {
        self.reset();
        info!("session closed at generation {}", self.generation);
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.imagery.clear();
        self.imagery_version += 1;
        self.series.clear();
        self.selection.clear();
        self.cache.clear();
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    pub fn apply_imagery(&mut self, ticket: Ticket, results: Vec<ImageryResult>) -> bool {
        if !self.is_current(ticket) {
            debug!("discarding {} stale imagery results", results.len());
            return false;
        }
        self.imagery = results;
        self.imagery_version += 1;
        true
    }

    /// Insert or replace the series for `coverage`.
    pub fn apply_series(
        &mut self,
        ticket: Ticket,
        coverage: &str,
        response: TimeSeriesResponse,
    ) -> bool {
        if !self.is_current(ticket) {
            debug!("discarding stale series for {}", coverage);
            return false;
        }
        self.next_series_version += 1;
        self.series.insert(
            coverage.to_string(),
            StoredSeries {
                version: self.next_series_version,
                response,
            },
        );
        true
    }

    pub fn imagery(&self) -> &[ImageryResult] {
        &self.imagery
    }

    pub fn series(&self, coverage: &str) -> Option<&TimeSeriesResponse> {
        self.series.get(coverage).map(|s| &s.response)
    }

    pub fn coverages(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Distinct WTSS-compatible collections in the imagery, in result order.
    pub fn wtss_coverages(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.imagery
            .iter()
            .filter(|item| is_wtss_compatible(&item.collection))
            .filter(|item| seen.insert(item.collection.clone()))
            .map(|item| item.collection.clone())
            .collect()
    }

    /// Flip membership of `coverage`; returns whether it is now selected.
    pub fn toggle_selection(&mut self, coverage: &str) -> bool {
        if self.selection.remove(coverage) {
            false
        } else {
            self.selection.insert(coverage.to_string());
            true
        }
    }

    /// Add `coverage` to the selection; selecting it again changes nothing.
    pub fn select(&mut self, coverage: &str) {
        self.selection.insert(coverage.to_string());
    }

    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selection
    }

    /// Assembled datasets for one coverage, reused until its inputs change.
    pub fn coverage_datasets(&mut self, coverage: &str) -> Option<Arc<CoverageDatasets>> {
        let stored = self.series.get(coverage)?;
        let version = SourceVersion {
            series: stored.version,
            imagery: self.imagery_version,
        };
        self.cache
            .get_or_assemble(&self.assembler, &stored.response, &self.imagery, version)
    }

    /// Every coverage that assembled into at least one dataset.
    pub fn assembled(&mut self) -> Vec<Arc<CoverageDatasets>> {
        let coverages: Vec<String> = self.series.keys().cloned().collect();
        coverages
            .iter()
            .filter_map(|c| self.coverage_datasets(c))
            .filter(|c| !c.datasets.is_empty())
            .collect()
    }

    /// Selected coverages in sorted order, for export. Coverages that
    /// assembled into no dataset are left out.
    pub fn selected_datasets(&mut self) -> Result<Vec<Arc<CoverageDatasets>>, ValidationError> {
        let selected: Vec<String> = self.selection.iter().cloned().collect();
        let datasets: Vec<_> = selected
            .iter()
            .filter_map(|c| self.coverage_datasets(c))
            .filter(|c| !c.datasets.is_empty())
            .collect();
        if datasets.is_empty() {
            return Err(ValidationError::EmptySelection);
        }
        Ok(datasets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odin_stac::timeseries::SeriesAttribute;

    fn response(coverage: &str, values: Vec<Option<f64>>) -> TimeSeriesResponse {
        TimeSeriesResponse {
            coverage_id: coverage.to_string(),
            timeline: (1..=values.len()).map(|d| format!("2024-01-{:02}", d)).collect(),
            attributes: vec![SeriesAttribute {
                name: "NDVI".to_string(),
                raw_values: Some(values),
            }],
            coordinates: None,
        }
    }

    fn scene(id: &str, collection: &str) -> ImageryResult {
        ImageryResult {
            id: id.to_string(),
            collection: collection.to_string(),
            date: "2024-01-02".to_string(),
            cloud_cover: None,
            thumbnail_url: Some(format!("{id}.png")),
        }
    }

    fn session() -> Session {
        let mut session = Session::default();
        session.set_point(Some(GeoPoint::new(-12.0, -45.0)));
        session.set_date_range(DateRange::parse("2024-01-01", "2024-12-31").ok());
        session
    }

    #[test]
    fn test_validation() {
        let mut empty = Session::default();
        assert_eq!(empty.begin_search(), Err(ValidationError::MissingPoint));
        assert_eq!(empty.fetch_params(), Err(ValidationError::MissingPoint));
        empty.set_point(Some(GeoPoint::new(0.0, 0.0)));
        assert_eq!(empty.fetch_params(), Err(ValidationError::MissingDateRange));
        assert_eq!(
            empty.selected_datasets().unwrap_err(),
            ValidationError::EmptySelection
        );
    }

    #[test]
    fn test_stale_ticket_discarded() {
        let mut session = session();
        let old = session.begin_search().unwrap();
        let new = session.begin_search().unwrap();
        assert!(!session.apply_series(old, "S2-16D-2", response("S2-16D-2", vec![Some(1.0)])));
        assert!(session.series("S2-16D-2").is_none());
        assert!(session.apply_series(new, "S2-16D-2", response("S2-16D-2", vec![Some(1.0)])));
        session.close();
        assert!(!session.is_current(new));
        assert!(session.series("S2-16D-2").is_none());
    }

    #[test]
    fn test_upsert_keyed_by_coverage() {
        let mut session = session();
        let ticket = session.begin_search().unwrap();
        session.apply_series(ticket, "S2-16D-2", response("S2-16D-2", vec![Some(1000.0)]));
        let first = session.coverage_datasets("S2-16D-2").unwrap();
        session.apply_series(ticket, "S2-16D-2", response("S2-16D-2", vec![Some(2000.0)]));
        let second = session.coverage_datasets("S2-16D-2").unwrap();
        assert_eq!(session.coverages().count(), 1);
        assert_eq!(first.datasets[0].points[0].value, Some(0.1));
        assert_eq!(second.datasets[0].points[0].value, Some(0.2));
    }

    #[test]
    fn test_imagery_change_reassembles_thumbnails() {
        let mut session = session();
        let ticket = session.begin_search().unwrap();
        session.apply_series(ticket, "S2-16D-2", response("S2-16D-2", vec![Some(1.0)]));
        let before = session.coverage_datasets("S2-16D-2").unwrap();
        assert_eq!(before.datasets[0].points[0].thumbnail, None);
        session.apply_imagery(ticket, vec![scene("a", "S2-16D-2")]);
        let after = session.coverage_datasets("S2-16D-2").unwrap();
        assert_eq!(after.datasets[0].points[0].thumbnail.as_deref(), Some("a.png"));
    }

    #[test]
    fn test_wtss_coverages_in_result_order() {
        let mut session = session();
        let ticket = session.begin_search().unwrap();
        session.apply_imagery(
            ticket,
            vec![
                scene("1", "MOD13Q1-6.1"),
                scene("2", "AMAZONIA1-WFI-L2-DN-1"),
                scene("3", "S2-16D-2"),
                scene("4", "MOD13Q1-6.1"),
            ],
        );
        assert_eq!(session.wtss_coverages(), vec!["MOD13Q1-6.1", "S2-16D-2"]);
    }

    #[test]
    fn test_selection_is_sorted_and_toggles() {
        let mut session = session();
        let ticket = session.begin_search().unwrap();
        for coverage in ["S2-16D-2", "LANDSAT-16D-1"] {
            session.apply_series(ticket, coverage, response(coverage, vec![Some(1.0)]));
        }
        assert!(session.toggle_selection("S2-16D-2"));
        assert!(session.toggle_selection("LANDSAT-16D-1"));
        assert!(session.toggle_selection("MOD13Q1-6.1"));
        assert!(!session.toggle_selection("MOD13Q1-6.1"));
        let ids: Vec<String> = session
            .selected_datasets()
            .unwrap()
            .iter()
            .map(|c| c.coverage_id.clone())
            .collect();
        assert_eq!(ids, vec!["LANDSAT-16D-1", "S2-16D-2"]);
    }

    #[test]
    fn test_repeated_select_keeps_coverage() {
        let mut session = session();
        let ticket = session.begin_search().unwrap();
        session.apply_series(ticket, "S2-16D-2", response("S2-16D-2", vec![Some(1.0)]));
        session.select("S2-16D-2");
        session.select("S2-16D-2");
        let selected = session.selected_datasets().unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].coverage_id, "S2-16D-2");
    }

    #[test]
    fn test_selection_skips_coverages_without_datasets() {
        let mut session = session();
        let ticket = session.begin_search().unwrap();
        let mut broken = response("LANDSAT-16D-1", vec![Some(1.0)]);
        broken.attributes[0].raw_values = None;
        session.apply_series(ticket, "LANDSAT-16D-1", broken);
        session.apply_series(ticket, "S2-16D-2", response("S2-16D-2", vec![Some(1.0)]));

        session.select("LANDSAT-16D-1");
        assert_eq!(
            session.selected_datasets().unwrap_err(),
            ValidationError::EmptySelection
        );

        session.select("S2-16D-2");
        let ids: Vec<String> = session
            .selected_datasets()
            .unwrap()
            .iter()
            .map(|c| c.coverage_id.clone())
            .collect();
        assert_eq!(ids, vec!["S2-16D-2"]);
    }
}
