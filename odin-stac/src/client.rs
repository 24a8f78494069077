//! HTTP client for the Brazil Data Cube STAC and WTSS services.
//!
//! Every call is a single request/response. Failures are returned to the
//! caller, which decides whether to log or report them; nothing is retried.

use crate::{
    collection::Collection,
    date_range::DateRange,
    error::{Result, StacError},
    imagery::{FeatureCollection, ImageryResult, SearchPayload},
    item::ItemDetail,
    point::GeoPoint,
    source::{ImagerySource, TimeSeriesSource},
    timeseries::{TimeSeriesQuery, TimeSeriesResponse},
};
use log::{debug, warn};
use reqwest::{Client, Response};
use serde::Deserialize;

/// Public STAC endpoint of the Brazil Data Cube.
pub const DEFAULT_STAC_URL: &str = "https://data.inpe.br/bdc/stac/v1";

/// Public WTSS endpoint of the Brazil Data Cube.
pub const DEFAULT_WTSS_URL: &str = "https://data.inpe.br/bdc/wtss/v4";

/// Endpoint configuration for `StacClient`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub stac_url: String,
    pub wtss_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            stac_url: DEFAULT_STAC_URL.to_string(),
            wtss_url: DEFAULT_WTSS_URL.to_string(),
        }
    }
}

/// Error bodies carry a `description` (WTSS) or a `message` (STAC).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    description: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StacClient {
    http: Client,
    config: ClientConfig,
}

impl StacClient {
    pub fn new(config: ClientConfig) -> Self {
        StacClient {
            http: Client::new(),
            config,
        }
    }

    pub fn with_client(http: Client, config: ClientConfig) -> Self {
        StacClient { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn stac(&self, path: &str) -> String {
        format!("{}/{}", self.config.stac_url.trim_end_matches('/'), path)
    }

    fn wtss(&self, path: &str) -> String {
        format!("{}/{}", self.config.wtss_url.trim_end_matches('/'), path)
    }

    /// Turn a response into its body text, mapping 4xx to `NoData`.
    async fn body_text(response: Response, subject: &str) -> Result<String> {
        let status = response.status();
        let url = response.url().to_string();
        if status.is_success() {
            return Ok(response.text().await?);
        }
        if status.is_client_error() {
            let text = response.text().await.unwrap_or_default();
            let description = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.description.or(b.message));
            warn!("{} answered {} for {}", url, status, subject);
            return Err(StacError::NoData {
                coverage: subject.to_string(),
                description,
            });
        }
        Err(StacError::UnexpectedStatus {
            status: status.as_u16(),
            url,
        })
    }

    /// List catalog collections (deduplicated, sorted by title).
    pub async fn list_collections(&self) -> Result<Vec<Collection>> {
        let url = self.stac("collections");
        debug!("GET {}", url);
        let response = self.http.get(&url).send().await?;
        let body = Self::body_text(response, "collections").await?;
        Ok(Collection::list_from_json(&body)?)
    }

    /// Fetch geometry, bbox and thumbnail for one item.
    pub async fn fetch_item_detail(&self, collection: &str, item_id: &str) -> Result<ItemDetail> {
        let url = self.stac(&format!("collections/{}/items/{}", collection, item_id));
        debug!("GET {}", url);
        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;
        let body = Self::body_text(response, item_id).await?;
        Ok(ItemDetail::from_json(&body)?)
    }
}

impl ImagerySource for StacClient {
    async fn search_imagery(
        &self,
        point: &GeoPoint,
        collections: &[String],
        date_range: Option<&DateRange>,
    ) -> Result<Vec<ImageryResult>> {
        if collections.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.stac("search");
        let payload = SearchPayload::new(point, collections, date_range);
        debug!("POST {} for {}", url, collections.join(", "));
        let response = self.http.post(&url).json(&payload).send().await?;
        let body = Self::body_text(response, &collections.join(",")).await?;
        let features: FeatureCollection = serde_json::from_str(&body)?;
        Ok(features.into_imagery_results())
    }
}

impl TimeSeriesSource for StacClient {
    async fn fetch_time_series(&self, query: &TimeSeriesQuery) -> Result<TimeSeriesResponse> {
        if query.attributes.is_empty() {
            return Err(StacError::InvalidQuery(format!(
                "no attributes requested for {}",
                query.coverage
            )));
        }
        let url = self.wtss("time_series");
        debug!("GET {} for {}", url, query.coverage);
        let response = self
            .http
            .get(&url)
            .query(&query.query_pairs())
            .send()
            .await?;
        let body = Self::body_text(response, &query.coverage).await?;
        Ok(TimeSeriesResponse::from_json(&body, &query.coverage)?)
    }
}
