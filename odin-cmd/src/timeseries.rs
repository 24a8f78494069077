//! Time-series fetch orchestration and the `timeseries` subcommand.

use crate::{search::batched_search, session::Session, session::Ticket, AppContext, PointArgs};
use anyhow::Context;
use futures::{stream, StreamExt};
use log::{error, info, warn};
use odin_data::model::CoverageDatasets;
use odin_stac::{
    catalog::attributes_for_collection,
    date_range::DateRange,
    error::Result as StacResult,
    point::GeoPoint,
    source::TimeSeriesSource,
    timeseries::{TimeSeriesQuery, TimeSeriesResponse},
};

/// One query per coverage with its configured attributes.
///
/// Coverages without any attribute are skipped with a warning.
pub fn build_queries(
    coverages: &[String],
    point: GeoPoint,
    range: DateRange,
) -> Vec<TimeSeriesQuery> {
    coverages
        .iter()
        .filter_map(|coverage| {
            let attributes = attributes_for_collection(coverage);
            if attributes.is_empty() {
                warn!("No WTSS attributes mapped for {}, skipping", coverage);
                return None;
            }
            Some(TimeSeriesQuery {
                coverage: coverage.clone(),
                point,
                attributes,
                date_range: range,
            })
        })
        .collect()
}

/// Run `queries`, one at a time or up to `concurrency` in flight.
///
/// Results come back keyed by the requested coverage. With concurrency the
/// order is completion order.
pub async fn fetch_all<S: TimeSeriesSource>(
    source: &S,
    queries: Vec<TimeSeriesQuery>,
    concurrency: usize,
) -> Vec<(String, StacResult<TimeSeriesResponse>)> {
    if concurrency <= 1 {
        let mut outcomes = Vec::with_capacity(queries.len());
        for query in queries {
            let result = source.fetch_time_series(&query).await;
            outcomes.push((query.coverage, result));
        }
        return outcomes;
    }
    stream::iter(queries)
        .map(|query| async move {
            let result = source.fetch_time_series(&query).await;
            (query.coverage, result)
        })
        .buffer_unordered(concurrency)
        .collect()
        .await
}

/// Fetch every WTSS-compatible collection found by the last search and store
/// the results in `session`. Returns how many series were applied.
///
/// Failures are logged and skipped: "no data" answers as warnings, anything
/// else as errors. Series already in the session are left untouched.
pub async fn auto_fetch<S: TimeSeriesSource>(
    session: &mut Session,
    ticket: Ticket,
    source: &S,
    concurrency: usize,
) -> usize {
    let Ok((point, range)) = session.fetch_params() else {
        return 0;
    };
    let coverages = session.wtss_coverages();
    info!("Fetching time series for {} collections", coverages.len());
    let queries = build_queries(&coverages, point, range);

    let mut applied = 0;
    for (coverage, result) in fetch_all(source, queries, concurrency).await {
        match result {
            Ok(response) => {
                if session.apply_series(ticket, &coverage, response) {
                    applied += 1;
                }
            }
            Err(e) if e.is_no_data() => warn!("{}", e),
            Err(e) => error!("Time series for {} failed: {}", coverage, e),
        }
    }
    applied
}

fn print_coverage(coverage: &CoverageDatasets) {
    println!("{} ({} dates)", coverage.coverage_id, coverage.len());
    for dataset in &coverage.datasets {
        println!("  {}", dataset.label);
        for sample in &dataset.points {
            let value = sample
                .value
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "    {}  {:>10}  {}",
                sample.display_date,
                value,
                sample.thumbnail.as_deref().unwrap_or("")
            );
        }
    }
}

pub async fn run_timeseries(
    ctx: &AppContext,
    point: PointArgs,
    coverage: String,
    attributes: Vec<String>,
    json: bool,
) -> anyhow::Result<()> {
    let mut session = point.session(ctx)?;
    let (geo, range) = session.fetch_params()?;
    let ticket = session.begin_search()?;

    let attributes = if attributes.is_empty() {
        attributes_for_collection(&coverage)
    } else {
        attributes
    };
    let query = TimeSeriesQuery {
        coverage: coverage.clone(),
        point: geo,
        attributes,
        date_range: range,
    };

    // Scenes only supply thumbnails here, so a failed search is not fatal.
    let scenes =
        batched_search(&ctx.client, &geo, std::slice::from_ref(&coverage), Some(&range)).await;
    session.apply_imagery(ticket, scenes);

    let response = ctx
        .client
        .fetch_time_series(&query)
        .await
        .with_context(|| format!("Failed to fetch time series for {}", coverage))?;
    session.apply_series(ticket, &coverage, response);

    let assembled = session
        .coverage_datasets(&coverage)
        .with_context(|| format!("{} returned an empty time series", coverage))?;
    if json {
        println!("{}", serde_json::to_string_pretty(assembled.as_ref())?);
    } else {
        print_coverage(&assembled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use odin_stac::{error::StacError, imagery::ImageryResult, timeseries::SeriesAttribute};
    use std::collections::HashMap;

    #[derive(Clone)]
    enum Answer {
        Series(f64),
        NoData,
        Down,
    }

    struct FakeWtss(HashMap<String, Answer>);

    impl TimeSeriesSource for FakeWtss {
        async fn fetch_time_series(
            &self,
            query: &TimeSeriesQuery,
        ) -> StacResult<TimeSeriesResponse> {
            tokio::task::yield_now().await;
            match self.0.get(&query.coverage).cloned() {
                Some(Answer::Series(value)) => Ok(TimeSeriesResponse {
                    coverage_id: query.coverage.clone(),
                    timeline: vec!["2024-01-01".to_string()],
                    attributes: vec![SeriesAttribute {
                        name: "NDVI".to_string(),
                        raw_values: Some(vec![Some(value)]),
                    }],
                    coordinates: Some(query.point),
                }),
                Some(Answer::NoData) => Err(StacError::NoData {
                    coverage: query.coverage.clone(),
                    description: Some("no data in range".to_string()),
                }),
                _ => Err(StacError::UnexpectedStatus {
                    status: 503,
                    url: "time_series".to_string(),
                }),
            }
        }
    }

    fn scene(collection: &str) -> ImageryResult {
        ImageryResult {
            id: format!("{collection}-1"),
            collection: collection.to_string(),
            date: "2024-01-01".to_string(),
            cloud_cover: None,
            thumbnail_url: None,
        }
    }

    fn searched_session() -> (Session, Ticket) {
        let mut session = Session::default();
        session.set_point(Some(GeoPoint::new(-12.0, -45.0)));
        session.set_date_range(DateRange::parse("2024-01-01", "2024-12-31").ok());
        let ticket = session.begin_search().unwrap();
        session.apply_imagery(
            ticket,
            vec![
                scene("S2-16D-2"),
                scene("AMAZONIA1-WFI-L2-DN-1"),
                scene("LANDSAT-16D-1"),
                scene("MOD13Q1-6.1"),
            ],
        );
        (session, ticket)
    }

    fn fake() -> FakeWtss {
        FakeWtss(HashMap::from([
            ("S2-16D-2".to_string(), Answer::Series(8000.0)),
            ("LANDSAT-16D-1".to_string(), Answer::NoData),
            ("MOD13Q1-6.1".to_string(), Answer::Series(4000.0)),
        ]))
    }

    #[test]
    fn test_build_queries_use_catalog_attributes() {
        let queries = build_queries(
            &["S2-16D-2".to_string(), "UNKNOWN-1".to_string()],
            GeoPoint::new(-12.0, -45.0),
            DateRange::parse("2024-01-01", "2024-02-01").unwrap(),
        );
        assert_eq!(queries.len(), 1);
        assert!(queries[0].attributes.contains(&"NDVI".to_string()));
    }

    #[tokio::test]
    async fn test_auto_fetch_skips_failures() {
        let (mut session, ticket) = searched_session();
        let applied = auto_fetch(&mut session, ticket, &fake(), 1).await;
        assert_eq!(applied, 2);
        let stored: Vec<&str> = session.coverages().collect();
        assert_eq!(stored, vec!["MOD13Q1-6.1", "S2-16D-2"]);
        assert!(session.series("LANDSAT-16D-1").is_none());
    }

    #[tokio::test]
    async fn test_concurrent_fetch_matches_sequential() {
        let (mut sequential, t1) = searched_session();
        auto_fetch(&mut sequential, t1, &fake(), 1).await;
        let (mut parallel, t2) = searched_session();
        auto_fetch(&mut parallel, t2, &fake(), 4).await;
        for coverage in ["S2-16D-2", "MOD13Q1-6.1"] {
            assert_eq!(sequential.series(coverage), parallel.series(coverage));
        }
    }

    #[tokio::test]
    async fn test_transport_error_keeps_prior_state() {
        let (mut session, ticket) = searched_session();
        auto_fetch(&mut session, ticket, &fake(), 1).await;
        let before = session.series("S2-16D-2").cloned();
        let mut down = fake();
        down.0.insert("S2-16D-2".to_string(), Answer::Down);
        auto_fetch(&mut session, ticket, &down, 2).await;
        assert_eq!(session.series("S2-16D-2").cloned(), before);
    }

    #[tokio::test]
    async fn test_stale_fetch_discarded() {
        let (mut session, old) = searched_session();
        let current = session.begin_search().unwrap();
        session.apply_imagery(current, vec![scene("S2-16D-2")]);
        assert_eq!(auto_fetch(&mut session, old, &fake(), 1).await, 0);
        assert!(session.series("S2-16D-2").is_none());
    }
}
