use crate::error::{Result, StacError};
use chrono::NaiveDate;
use odin_utils::dates::{format_date, parse_date, stac_interval};
use serde::Serialize;

/// An inclusive query window from the start date through the end date.
#[derive(Clone, Eq, PartialEq, Copy, Debug, Serialize)]
pub struct DateRange(pub NaiveDate, pub NaiveDate);

impl DateRange {
    /// Build a range, rejecting windows whose start is after their end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(StacError::InvalidQuery(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        Ok(DateRange(start, end))
    }

    /// Parse two "YYYY-MM-DD" strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = parse_date(start).map_err(|e| StacError::DateParse(format!("{start}: {e}")))?;
        let end = parse_date(end).map_err(|e| StacError::DateParse(format!("{end}: {e}")))?;
        DateRange::new(start, end)
    }

    pub fn start_str(&self) -> String {
        format_date(&self.0)
    }

    pub fn end_str(&self) -> String {
        format_date(&self.1)
    }

    /// The STAC `datetime` filter for this window.
    pub fn as_stac_interval(&self) -> String {
        stac_interval(&self.0, &self.1)
    }
}
