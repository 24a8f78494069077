//! Shared utility functions for ODIN crates.

/// Date utility functions
pub mod dates {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

    /// Date format used for query parameters: "YYYY-MM-DD"
    pub const QUERY_DATE_FORMAT: &str = "%Y-%m-%d";

    /// Default format for human-facing dates (day/month/year).
    pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(QUERY_DATE_FORMAT).to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), QUERY_DATE_FORMAT)?)
    }

    /// Parse a catalog timestamp into a naive UTC datetime.
    ///
    /// Accepts RFC 3339 (`2024-01-01T10:30:00Z`), a bare
    /// `YYYY-MM-DDTHH:MM:SS`, or a plain `YYYY-MM-DD` (taken as midnight).
    /// Returns `None` for anything else.
    pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_utc());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(dt);
        }
        NaiveDate::parse_from_str(s, QUERY_DATE_FORMAT)
            .ok()
            .map(|d| d.and_time(NaiveTime::MIN))
    }

    /// Keep only the date part of an ISO timestamp ("2024-01-01T13:00:00Z" -> "2024-01-01").
    pub fn date_part(s: &str) -> &str {
        s.split('T').next().unwrap_or(s)
    }

    /// Render a timeline entry for display, falling back to the raw string
    /// when it does not parse.
    pub fn display_date(s: &str, format: &str) -> String {
        match parse_timestamp(s) {
            Some(dt) => dt.format(format).to_string(),
            None => s.to_string(),
        }
    }

    /// STAC `datetime` interval covering whole days: "<start>T00:00:00Z/<end>T23:59:59Z".
    pub fn stac_interval(start: &NaiveDate, end: &NaiveDate) -> String {
        format!(
            "{}T00:00:00Z/{}T23:59:59Z",
            format_date(start),
            format_date(end)
        )
    }

}
