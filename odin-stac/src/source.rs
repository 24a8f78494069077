//! Seams between the fetch orchestration and the HTTP client.

use crate::{
    date_range::DateRange,
    error::Result,
    imagery::ImageryResult,
    point::GeoPoint,
    timeseries::{TimeSeriesQuery, TimeSeriesResponse},
};

/// Something that can answer STAC searches.
#[allow(async_fn_in_trait)]
pub trait ImagerySource {
    async fn search_imagery(
        &self,
        point: &GeoPoint,
        collections: &[String],
        date_range: Option<&DateRange>,
    ) -> Result<Vec<ImageryResult>>;
}

/// Something that can answer WTSS time-series queries.
#[allow(async_fn_in_trait)]
pub trait TimeSeriesSource {
    async fn fetch_time_series(&self, query: &TimeSeriesQuery) -> Result<TimeSeriesResponse>;
}
