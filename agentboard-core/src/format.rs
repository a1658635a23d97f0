//! Display formatting shared by the CLI and the TUI.

use std::fmt::Write as _;

use crate::config::DateFormats;
use crate::domain::{Granularity, Timestamp};

/// `$12,345` with no decimals; `-$1,200` for negatives.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".into();
    }
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let magnitude = rounded.abs();
    // Beyond u64 the cast saturates; print the float digits ungrouped.
    if magnitude >= u64::MAX as f64 {
        return format!("{sign}${magnitude:.0}");
    }
    format!("{sign}${}", group_thousands(magnitude as u64))
}

/// As [`format_currency`], with `N/A` for a missing value.
pub fn format_currency_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".into(), format_currency)
}

/// `+1.23%` / `-4.50%`.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".into();
    }
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{value:.2}%")
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format with the hourly or daily pattern depending on the timestamp's
/// shape. Unparseable timestamps, and patterns chrono rejects, show the raw
/// string.
pub fn format_timestamp(ts: &Timestamp, formats: &DateFormats) -> String {
    let Some(dt) = ts.to_datetime() else {
        return ts.to_string();
    };
    let pattern = match ts.granularity() {
        Granularity::Daily => &formats.daily,
        _ => &formats.hourly,
    };
    let mut out = String::new();
    match write!(out, "{}", dt.format(pattern)) {
        Ok(()) => out,
        Err(_) => ts.to_string(),
    }
}

/// Date part only (`2025-10-01`), used for date ranges.
pub fn format_date(ts: &Timestamp) -> String {
    ts.date()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Short activity feed time: `Oct 1, 15:00`, or `Oct 1` for daily stamps.
pub fn format_activity_time(ts: &Timestamp) -> String {
    match (ts.to_datetime(), ts.granularity()) {
        (Some(dt), Granularity::Daily) => dt.format("%b %-d").to_string(),
        (Some(dt), _) => dt.format("%b %-d, %H:%M").to_string(),
        (None, _) => ts.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency() {
        assert_eq!(format_currency(12_345.4), "$12,345");
        assert_eq!(format_currency(999.5), "$1,000");
        assert_eq!(format_currency(-1_200.0), "-$1,200");
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(1_234_567.0), "$1,234,567");
        assert_eq!(format_currency_opt(None), "N/A");
    }

    #[test]
    fn currency_beyond_u64_is_not_saturated() {
        let out = format_currency(1e20);
        assert_eq!(out, "$100000000000000000000");
        assert_eq!(format_currency(-1e20), "-$100000000000000000000");
    }

    #[test]
    fn percent() {
        assert_eq!(format_percent(1.234), "+1.23%");
        assert_eq!(format_percent(0.0), "+0.00%");
        assert_eq!(format_percent(-4.5), "-4.50%");
    }

    #[test]
    fn timestamps_use_configured_patterns() {
        let formats = DateFormats::default();
        assert_eq!(format_timestamp(&"2025-10-01".into(), &formats), "2025-10-01");
        assert_eq!(format_timestamp(&"2025-10-01 15:00:00".into(), &formats), "10/01 15:00");
        assert_eq!(format_timestamp(&"soon".into(), &formats), "soon");
    }

    #[test]
    fn invalid_pattern_falls_back_to_raw_timestamp() {
        let formats = DateFormats {
            hourly: "%m/%d %H:%M".into(),
            daily: "%Q".into(),
        };
        assert_eq!(format_timestamp(&"2025-10-01".into(), &formats), "2025-10-01");
    }

    #[test]
    fn activity_time() {
        assert_eq!(format_activity_time(&"2025-10-01 15:00:00".into()), "Oct 1, 15:00");
        assert_eq!(format_activity_time(&"2025-10-01".into()), "Oct 1");
    }

    #[test]
    fn date_only() {
        assert_eq!(format_date(&"2025-10-01 15:00:00".into()), "2025-10-01");
    }
}
