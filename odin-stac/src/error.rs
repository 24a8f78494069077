/// Error types for the STAC/WTSS client
use thiserror::Error;

/// Main error type for catalog and time-series operations
#[derive(Error, Debug)]
pub enum StacError {
    /// HTTP request failed before a response arrived
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered a 4xx: no data for this query
    #[error("No data for {coverage}: {}", .description.as_deref().unwrap_or("no description"))]
    NoData {
        coverage: String,
        description: Option<String>,
    },

    /// The service answered with an unexpected status
    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// Failed to decode a JSON body
    #[error("Failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// Date parsing failed
    #[error("Failed to parse date: {0}")]
    DateParse(String),

    /// Invalid query parameters
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl StacError {
    /// True when the error only means "nothing to show for this query".
    pub fn is_no_data(&self) -> bool {
        matches!(self, StacError::NoData { .. })
    }
}

/// Type alias for Results using StacError
pub type Result<T> = std::result::Result<T, StacError>;
