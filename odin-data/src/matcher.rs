//! Nearest-in-time thumbnail lookup.

use chrono::{NaiveDateTime, TimeDelta};
use odin_stac::imagery::ImageryResult;
use odin_utils::dates::parse_timestamp;

/// Default maximum distance between a sample and its thumbnail.
pub const MAX_MATCH_WINDOW_DAYS: i64 = 30;

/// A scene date paired with its thumbnail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub date: &'a str,
    pub thumbnail_url: Option<&'a str>,
}

impl<'a> From<&'a ImageryResult> for Candidate<'a> {
    fn from(item: &'a ImageryResult) -> Self {
        Candidate {
            date: &item.date,
            thumbnail_url: item.thumbnail_url.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherConfig {
    pub window: TimeDelta,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig {
            window: TimeDelta::days(MAX_MATCH_WINDOW_DAYS),
        }
    }
}

impl MatcherConfig {
    pub fn with_window_days(days: i64) -> Self {
        MatcherConfig {
            window: TimeDelta::days(days),
        }
    }

    /// Thumbnail of the candidate closest to `target_date`.
    ///
    /// Candidates without a thumbnail or with an unparsable date are skipped.
    /// On equal distances the first candidate in iteration order wins. Returns `None` when
    /// nothing qualifies or the best distance exceeds the window.
    pub fn find_nearest<'a, I>(&self, target_date: &str, candidates: I) -> Option<String>
    where
        I: IntoIterator<Item = Candidate<'a>>,
    {
        let target = parse_timestamp(target_date)?;
        self.find_nearest_to(target, candidates)
    }

    /// `find_nearest` for an already parsed target.
    pub fn find_nearest_to<'a, I>(&self, target: NaiveDateTime, candidates: I) -> Option<String>
    where
        I: IntoIterator<Item = Candidate<'a>>,
    {
        let mut best: Option<(TimeDelta, &str)> = None;
        for candidate in candidates {
            let Some(url) = candidate.thumbnail_url.filter(|u| !u.is_empty()) else {
                continue;
            };
            let Some(when) = parse_timestamp(candidate.date) else {
                continue;
            };
            let diff = (target - when).abs();
            match best {
                Some((best_diff, _)) if diff >= best_diff => {}
                _ => best = Some((diff, url)),
            }
        }
        best.filter(|(diff, _)| *diff <= self.window)
            .map(|(_, url)| url.to_string())
    }
}

/// `find_nearest` with the default 30-day window.
pub fn find_nearest<'a, I>(target_date: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Candidate<'a>>,
{
    MatcherConfig::default().find_nearest(target_date, candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate<'a>(date: &'a str, url: Option<&'a str>) -> Candidate<'a> {
        Candidate {
            date,
            thumbnail_url: url,
        }
    }

    #[test]
    fn test_empty_candidates() {
        assert_eq!(find_nearest("2024-01-01", Vec::new()), None);
    }

    #[test]
    fn test_unparsable_target() {
        let candidates = vec![candidate("2024-01-01", Some("a.png"))];
        assert_eq!(find_nearest("not a date", candidates), None);
    }

    #[test]
    fn test_nearest_within_window_wins() {
        let candidates = vec![
            candidate("2024-03-01", Some("far.png")),
            candidate("2024-01-02", Some("near.png")),
        ];
        assert_eq!(
            find_nearest("2024-01-01", candidates),
            Some("near.png".to_string())
        );
    }

    #[test]
    fn test_outside_window() {
        let candidates = vec![candidate("2024-03-01", Some("far.png"))];
        assert_eq!(find_nearest("2024-01-01", candidates), None);
    }

    #[test]
    fn test_window_boundary() {
        let exactly = vec![candidate("2024-01-31", Some("edge.png"))];
        assert_eq!(
            find_nearest("2024-01-01", exactly),
            Some("edge.png".to_string())
        );
        let beyond = vec![candidate("2024-01-31T00:00:01Z", Some("edge.png"))];
        assert_eq!(find_nearest("2024-01-01", beyond), None);
    }

    #[test]
    fn test_tie_keeps_first() {
        let candidates = vec![
            candidate("2024-01-06", Some("after.png")),
            candidate("2023-12-27", Some("before.png")),
        ];
        assert_eq!(
            find_nearest("2024-01-01", candidates),
            Some("after.png".to_string())
        );
    }

    #[test]
    fn test_skips_unusable_candidates() {
        let candidates = vec![
            candidate("2024-01-01", None),
            candidate("N/A", Some("undated.png")),
            candidate("2024-01-10", Some("usable.png")),
        ];
        assert_eq!(
            find_nearest("2024-01-01", candidates),
            Some("usable.png".to_string())
        );
    }

    #[test]
    fn test_custom_window() {
        let config = MatcherConfig::with_window_days(5);
        let candidates = vec![candidate("2024-01-10", Some("x.png"))];
        assert_eq!(config.find_nearest("2024-01-01", candidates), None);
    }
}
