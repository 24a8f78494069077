//! Command implementations for the ODIN CLI.
//!
//! Provides subcommands for browsing the Brazil Data Cube catalog, searching
//! imagery at a point, fetching WTSS time series and exporting reports.

use anyhow::{anyhow, bail};
use clap::{Args, Subcommand};
use log::debug;
use odin_data::{
    assembler::AssemblerConfig,
    matcher::{MatcherConfig, MAX_MATCH_WINDOW_DAYS},
    normalize::{NormalizerConfig, INDEX_SCALE_DIVISOR, MISSING_VALUE_THRESHOLD},
};
use odin_report::{CSV_FILE_NAME, PDF_FILE_NAME};
use odin_stac::{
    catalog::CollectionGroup,
    client::{ClientConfig, StacClient, DEFAULT_STAC_URL, DEFAULT_WTSS_URL},
    date_range::DateRange,
    point::GeoPoint,
};
use std::path::PathBuf;

pub mod collections;
pub mod report;
pub mod search;
pub mod session;
pub mod timeseries;

use session::Session;

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// STAC catalog base URL
    #[arg(long, global = true, default_value = DEFAULT_STAC_URL)]
    pub stac_url: String,

    /// WTSS base URL
    #[arg(long, global = true, default_value = DEFAULT_WTSS_URL)]
    pub wtss_url: String,

    /// Largest gap in days between a sample and its thumbnail scene
    #[arg(long, global = true, default_value_t = MAX_MATCH_WINDOW_DAYS)]
    pub window_days: i64,

    /// Divisor applied to NDVI and EVI raw values
    #[arg(long, global = true, default_value_t = INDEX_SCALE_DIVISOR)]
    pub scale_divisor: f64,

    /// Raw values at or below this are treated as missing
    #[arg(
        long,
        global = true,
        allow_negative_numbers = true,
        default_value_t = MISSING_VALUE_THRESHOLD
    )]
    pub missing_threshold: f64,
}

impl Default for GlobalArgs {
    fn default() -> Self {
        GlobalArgs {
            stac_url: DEFAULT_STAC_URL.to_string(),
            wtss_url: DEFAULT_WTSS_URL.to_string(),
            window_days: MAX_MATCH_WINDOW_DAYS,
            scale_divisor: INDEX_SCALE_DIVISOR,
            missing_threshold: MISSING_VALUE_THRESHOLD,
        }
    }
}

impl GlobalArgs {
    pub fn assembler_config(&self) -> AssemblerConfig {
        AssemblerConfig {
            normalizer: NormalizerConfig {
                missing_threshold: self.missing_threshold,
                scale_divisor: self.scale_divisor,
                ..NormalizerConfig::default()
            },
            matcher: MatcherConfig::with_window_days(self.window_days),
            ..AssemblerConfig::default()
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            stac_url: self.stac_url.clone(),
            wtss_url: self.wtss_url.clone(),
        }
    }
}

/// What every command needs: the HTTP client and the assembly settings.
pub struct AppContext {
    pub client: StacClient,
    pub assembler: AssemblerConfig,
}

impl AppContext {
    pub fn new(global: &GlobalArgs) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("odin-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(AppContext {
            client: StacClient::with_client(http, global.client_config()),
            assembler: global.assembler_config(),
        })
    }

    /// Collection ids to search: the explicit list when given, else the
    /// members of the requested group (WTSS-compatible by default).
    pub async fn resolve_collections(&self, args: &CollectionArgs) -> anyhow::Result<Vec<String>> {
        if !args.collections.is_empty() {
            return Ok(args.collections.clone());
        }
        let group = match args.group.as_deref() {
            Some(key) => CollectionGroup::from_key(key)
                .ok_or_else(|| anyhow!("Unknown collection group: {}", key))?,
            None => CollectionGroup::Wtss,
        };
        let listing = self.client.list_collections().await?;
        let ids = group.select(&listing);
        debug!("group {} resolved to {} collections", group.key(), ids.len());
        if ids.is_empty() {
            bail!("No collections in group {}", group.key());
        }
        Ok(ids)
    }
}

/// The analysed point and date range.
#[derive(Args, Debug, Clone, Default)]
pub struct PointArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
}

impl PointArgs {
    /// A fresh session holding this point and, when both dates are given,
    /// the date range.
    pub fn session(&self, ctx: &AppContext) -> anyhow::Result<Session> {
        let mut session = Session::new(ctx.assembler.clone());
        if let (Some(lat), Some(lng)) = (self.lat, self.lng) {
            let point = GeoPoint::new(lat, lng);
            if !point.is_valid() {
                bail!("Invalid coordinates: {}, {}", lat, lng);
            }
            session.set_point(Some(point));
        }
        if let (Some(start), Some(end)) = (self.start.as_deref(), self.end.as_deref()) {
            session.set_date_range(Some(DateRange::parse(start, end)?));
        }
        Ok(session)
    }
}

/// Which collections to search.
#[derive(Args, Debug, Clone, Default)]
pub struct CollectionArgs {
    /// Comma separated collection ids
    #[arg(long, value_delimiter = ',')]
    pub collections: Vec<String>,

    /// Collection group (all, wtss, landsat, sentinel2, modis, ...)
    #[arg(long, conflicts_with = "collections")]
    pub group: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List catalog collections
    Collections {
        /// Only collections with WTSS time series
        #[arg(long)]
        wtss_only: bool,
    },

    /// Search imagery at a point
    Search {
        #[command(flatten)]
        point: PointArgs,
        #[command(flatten)]
        collections: CollectionArgs,
    },

    /// Show footprint and thumbnail of one catalog item
    Item {
        /// Collection id
        #[arg(long)]
        collection: String,

        /// Item id
        #[arg(long)]
        id: String,
    },

    /// Fetch one time series and print its samples
    Timeseries {
        #[command(flatten)]
        point: PointArgs,

        /// WTSS coverage id
        #[arg(long)]
        coverage: String,

        /// Comma separated attributes (defaults to the catalog's list)
        #[arg(long, value_delimiter = ',')]
        attributes: Vec<String>,

        /// Print the assembled datasets as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search, fetch every WTSS series and export CSV/PDF reports
    Report {
        #[command(flatten)]
        point: PointArgs,
        #[command(flatten)]
        collections: CollectionArgs,

        /// Coverages to export (defaults to every loaded series)
        #[arg(long, num_args = 1..)]
        select: Vec<String>,

        /// Write the CSV export
        #[arg(long, num_args = 0..=1, default_missing_value = CSV_FILE_NAME)]
        csv: Option<PathBuf>,

        /// Write the PDF report
        #[arg(long, num_args = 0..=1, default_missing_value = PDF_FILE_NAME)]
        pdf: Option<PathBuf>,

        /// Write one SVG chart per coverage into this directory
        #[arg(long)]
        svg_dir: Option<PathBuf>,

        /// Time series requests in flight at once
        #[arg(long, default_value_t = 1)]
        concurrency: usize,
    },
}

pub async fn run(global: GlobalArgs, command: Command) -> anyhow::Result<()> {
    let ctx = AppContext::new(&global)?;
    match command {
        Command::Collections { wtss_only } => collections::run_collections(&ctx, wtss_only).await,
        Command::Search { point, collections } => {
            search::run_search(&ctx, point, collections).await
        }
        Command::Item { collection, id } => collections::run_item(&ctx, &collection, &id).await,
        Command::Timeseries {
            point,
            coverage,
            attributes,
            json,
        } => timeseries::run_timeseries(&ctx, point, coverage, attributes, json).await,
        Command::Report {
            point,
            collections,
            select,
            csv,
            pdf,
            svg_dir,
            concurrency,
        } => {
            let outputs = report::ReportOutputs { csv, pdf, svg_dir };
            report::run_report(&ctx, point, collections, select, outputs, concurrency).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use session::ValidationError;

    fn ctx() -> AppContext {
        AppContext::new(&GlobalArgs::default()).unwrap()
    }

    #[test]
    fn test_global_args_feed_assembler() {
        let global = GlobalArgs {
            window_days: 10,
            scale_divisor: 100.0,
            ..GlobalArgs::default()
        };
        let config = global.assembler_config();
        assert_eq!(config.matcher, MatcherConfig::with_window_days(10));
        assert_eq!(config.normalizer.scale_divisor, 100.0);
        assert_eq!(config.normalizer.missing_threshold, MISSING_VALUE_THRESHOLD);
    }

    #[test]
    fn test_point_args_session() {
        let args = PointArgs {
            lat: Some(-12.5),
            lng: Some(-45.0),
            start: Some("2024-01-01".to_string()),
            end: Some("2024-06-30".to_string()),
        };
        let session = args.session(&ctx()).unwrap();
        assert_eq!(session.point(), Some(GeoPoint::new(-12.5, -45.0)));
        assert!(session.fetch_params().is_ok());
    }

    #[test]
    fn test_point_args_missing_inputs() {
        let no_dates = PointArgs {
            lat: Some(-12.5),
            lng: Some(-45.0),
            ..PointArgs::default()
        };
        let session = no_dates.session(&ctx()).unwrap();
        assert_eq!(session.fetch_params(), Err(ValidationError::MissingDateRange));

        let empty = PointArgs::default().session(&ctx()).unwrap();
        assert_eq!(empty.fetch_params(), Err(ValidationError::MissingPoint));
    }

    #[test]
    fn test_point_args_rejects_bad_input() {
        let off_globe = PointArgs {
            lat: Some(95.0),
            lng: Some(0.0),
            ..PointArgs::default()
        };
        assert!(off_globe.session(&ctx()).is_err());

        let reversed = PointArgs {
            lat: Some(0.0),
            lng: Some(0.0),
            start: Some("2024-06-30".to_string()),
            end: Some("2024-01-01".to_string()),
        };
        assert!(reversed.session(&ctx()).is_err());
    }

    #[tokio::test]
    async fn test_explicit_collections_skip_listing() {
        let args = CollectionArgs {
            collections: vec!["S2-16D-2".to_string()],
            group: None,
        };
        assert_eq!(ctx().resolve_collections(&args).await.unwrap(), vec!["S2-16D-2"]);
    }

    #[tokio::test]
    async fn test_unknown_group_rejected() {
        let args = CollectionArgs {
            collections: Vec::new(),
            group: Some("pluto".to_string()),
        };
        assert!(ctx().resolve_collections(&args).await.is_err());
    }
}
