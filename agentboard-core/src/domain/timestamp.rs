//! Raw, comparable timestamp strings.
//!
//! Timestamps arrive as strings of one of two shapes:
//! - daily: `2025-10-01`
//! - intraday: `2025-10-01 15:00:00` (or with a `T` separator)
//!
//! Ordering is plain lexicographic string ordering and equality is exact
//! string equality. Within one shape that is chronological order; across
//! shapes no normalization is attempted (see [`Granularity::Mixed`]).

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

const DAILY_FORMAT: &str = "%Y-%m-%d";
const INTRADAY_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// A raw timestamp string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

/// The sampling shape of one timestamp, or of a whole axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    Daily,
    Intraday,
    /// Daily and intraday strings in the same collection.
    Mixed,
}

impl Timestamp {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Intraday when a time component is present.
    pub fn granularity(&self) -> Granularity {
        if self.0.contains(' ') || self.0.contains('T') || self.0.contains(':') {
            Granularity::Intraday
        } else {
            Granularity::Daily
        }
    }

    /// Parse to a datetime. Daily timestamps resolve to midnight.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        let raw = self.0.trim();
        match self.granularity() {
            Granularity::Daily => NaiveDate::parse_from_str(raw, DAILY_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            _ => INTRADAY_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok()),
        }
    }

    /// Calendar date part, if parseable.
    pub fn date(&self) -> Option<NaiveDate> {
        self.to_datetime().map(|dt| dt.date())
    }
}

impl Granularity {
    /// Combine the granularity of every timestamp in `iter`.
    ///
    /// Returns `None` for an empty iterator.
    pub fn of<'a>(iter: impl IntoIterator<Item = &'a Timestamp>) -> Option<Granularity> {
        let mut acc: Option<Granularity> = None;
        for ts in iter {
            let g = ts.granularity();
            acc = match acc {
                None => Some(g),
                Some(prev) if prev == g => Some(prev),
                Some(_) => return Some(Granularity::Mixed),
            };
        }
        acc
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Timestamp {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl AsRef<str> for Timestamp {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granularity_detection() {
        assert_eq!(Timestamp::from("2025-10-01").granularity(), Granularity::Daily);
        assert_eq!(
            Timestamp::from("2025-10-01 15:00:00").granularity(),
            Granularity::Intraday
        );
        assert_eq!(
            Timestamp::from("2025-10-01T15:00:00").granularity(),
            Granularity::Intraday
        );
    }

    #[test]
    fn daily_parses_as_midnight() {
        let dt = Timestamp::from("2025-10-01").to_datetime().unwrap();
        assert_eq!(dt.to_string(), "2025-10-01 00:00:00");
    }

    #[test]
    fn intraday_parses_both_separators() {
        let a = Timestamp::from("2025-10-01 15:30:00").to_datetime().unwrap();
        let b = Timestamp::from("2025-10-01T15:30:00").to_datetime().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn garbage_does_not_parse() {
        assert!(Timestamp::from("yesterday").to_datetime().is_none());
    }

    #[test]
    fn ordering_is_lexicographic() {
        let mut v = vec![
            Timestamp::from("2025-10-03"),
            Timestamp::from("2025-10-01"),
            Timestamp::from("2025-10-02"),
        ];
        v.sort();
        let raw: Vec<&str> = v.iter().map(|t| t.as_str()).collect();
        assert_eq!(raw, ["2025-10-01", "2025-10-02", "2025-10-03"]);
    }

    #[test]
    fn combined_granularity() {
        let daily = [Timestamp::from("2025-10-01"), Timestamp::from("2025-10-02")];
        assert_eq!(Granularity::of(&daily), Some(Granularity::Daily));

        let mixed = [Timestamp::from("2025-10-01"), Timestamp::from("2025-10-01 10:00:00")];
        assert_eq!(Granularity::of(&mixed), Some(Granularity::Mixed));

        assert_eq!(Granularity::of(&[] as &[Timestamp]), None);
    }
}
