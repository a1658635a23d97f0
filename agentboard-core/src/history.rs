//! Agent value histories.
//!
//! Two sources, chosen by `data.history_source`:
//! - `positions`: value each position snapshot as cash plus holdings priced
//!   at that timestamp's close, one point per timestamp (the snapshot with
//!   the highest id wins).
//! - `precomputed`: read `agent_data/{folder}/asset_history.json`.
//!
//! The benchmark is its price file scaled so the first close equals the
//! configured starting value.
//!
//! Price files use the Alpha Vantage layout:
//!
//! ```json
//! {"Meta Data": {"2. Symbol": "NVDA"},
//!  "Time Series (Daily)": {"2025-10-01": {"1. buy price": "185.2", "4. sell price": "187.0"}}}
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{DataConfig, HistorySource};
use crate::domain::{HistoryPoint, Timestamp};
use crate::position::{position_log_path, PositionRecord};
use crate::source::{DataSource, FetchError};

const CLOSE_FIELDS: [&str; 2] = ["4. sell price", "4. close"];

/// Errors from building one agent's history.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected layout in {path}: {reason}")]
    Format { path: String, reason: String },
}

/// Closing prices of one symbol keyed by timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    closes: BTreeMap<Timestamp, f64>,
}

impl PriceSeries {
    /// Parse an Alpha Vantage style price document.
    pub fn parse(symbol: &str, path: &str, text: &str) -> Result<Self, HistoryError> {
        let doc: Value = serde_json::from_str(text).map_err(|source| HistoryError::Json {
            path: path.to_string(),
            source,
        })?;
        let series = doc
            .as_object()
            .and_then(|obj| {
                obj.iter()
                    .find(|(key, _)| key.starts_with("Time Series"))
                    .map(|(_, v)| v)
            })
            .and_then(Value::as_object)
            .ok_or_else(|| HistoryError::Format {
                path: path.to_string(),
                reason: "no \"Time Series\" object".into(),
            })?;

        let closes = series
            .iter()
            .filter_map(|(ts, bar)| {
                let close = CLOSE_FIELDS
                    .iter()
                    .find_map(|field| bar.get(*field).and_then(number))?;
                Some((Timestamp::from(ts.as_str()), close))
            })
            .collect();

        Ok(Self {
            symbol: symbol.to_string(),
            closes,
        })
    }

    pub fn from_closes(symbol: &str, closes: impl IntoIterator<Item = (Timestamp, f64)>) -> Self {
        Self {
            symbol: symbol.to_string(),
            closes: closes.into_iter().collect(),
        }
    }

    /// Close at `ts`, or the most recent earlier close.
    pub fn close_at(&self, ts: &Timestamp) -> Option<f64> {
        self.closes.range(..=ts.clone()).next_back().map(|(_, v)| *v)
    }

    pub fn closes(&self) -> impl Iterator<Item = (&Timestamp, f64)> {
        self.closes.iter().map(|(t, v)| (t, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// Accept both `"187.0"` and `187.0`.
fn number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|f: &f64| f.is_finite())
}

pub fn price_file_path(data: &DataConfig, symbol: &str) -> String {
    format!("{}{}.json", data.price_file_prefix, symbol)
}

pub fn precomputed_history_path(folder: &str) -> String {
    format!("agent_data/{folder}/asset_history.json")
}

/// Fetch and parse one symbol's price file.
pub fn load_prices(
    source: &dyn DataSource,
    data: &DataConfig,
    symbol: &str,
) -> Result<PriceSeries, HistoryError> {
    let path = price_file_path(data, symbol);
    let text = source.fetch_text(&path)?;
    PriceSeries::parse(symbol, &path, &text)
}

/// Value every snapshot date: cash plus shares times close.
///
/// When a date has several snapshots the one with the highest id wins
/// (the later line on equal ids). Holdings whose symbol has no close at or
/// before the date contribute nothing; each such symbol is warned about once.
pub fn value_snapshots(
    records: &[PositionRecord],
    prices: &HashMap<String, PriceSeries>,
) -> Vec<HistoryPoint> {
    let mut latest: BTreeMap<&Timestamp, &PositionRecord> = BTreeMap::new();
    for record in records {
        match latest.get(&record.date) {
            Some(prev) if prev.id > record.id => {}
            _ => {
                latest.insert(&record.date, record);
            }
        }
    }

    let mut unpriced: BTreeSet<&str> = BTreeSet::new();
    let points = latest
        .into_iter()
        .map(|(ts, record)| {
            let holdings: f64 = record
                .holdings()
                .map(|(symbol, shares)| {
                    match prices.get(symbol).and_then(|p| p.close_at(ts)) {
                        Some(close) => shares * close,
                        None => {
                            unpriced.insert(symbol);
                            0.0
                        }
                    }
                })
                .sum();
            HistoryPoint::new(ts.clone(), record.cash() + holdings)
        })
        .collect();

    for symbol in unpriced {
        warn!(symbol, "no price at or before snapshot date, valued at 0");
    }
    points
}

/// Rebuild an agent's value history from its position log and price files.
pub fn positions_history(
    source: &dyn DataSource,
    data: &DataConfig,
    folder: &str,
) -> Result<Vec<HistoryPoint>, HistoryError> {
    let path = position_log_path(folder);
    let text = source.fetch_text(&path)?;

    let mut records = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match PositionRecord::parse(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!(agent = folder, line = line_no + 1, error = %e, "skipping malformed position record"),
        }
    }

    let symbols: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.holdings().map(|(symbol, _)| symbol))
        .collect();

    let mut prices = HashMap::new();
    for symbol in symbols {
        match load_prices(source, data, symbol) {
            Ok(series) => {
                prices.insert(symbol.to_string(), series);
            }
            Err(e) => warn!(agent = folder, symbol, error = %e, "price file unavailable"),
        }
    }
    debug!(agent = folder, records = records.len(), symbols = prices.len(), "valuing snapshots");

    Ok(value_snapshots(&records, &prices))
}

#[derive(Debug, Deserialize)]
struct PrecomputedPoint {
    #[serde(alias = "timestamp")]
    date: Timestamp,
    value: f64,
}

/// Read a precomputed `[{date, value}]` history.
pub fn precomputed_history(
    source: &dyn DataSource,
    folder: &str,
) -> Result<Vec<HistoryPoint>, HistoryError> {
    let path = precomputed_history_path(folder);
    let text = source.fetch_text(&path)?;
    let points: Vec<PrecomputedPoint> =
        serde_json::from_str(&text).map_err(|source| HistoryError::Json { path, source })?;
    Ok(points
        .into_iter()
        .map(|p| HistoryPoint::new(p.date, p.value))
        .collect())
}

/// One agent's history from the configured source.
pub fn agent_history(
    source: &dyn DataSource,
    data: &DataConfig,
    folder: &str,
) -> Result<Vec<HistoryPoint>, HistoryError> {
    match data.history_source {
        HistorySource::Positions => positions_history(source, data, folder),
        HistorySource::Precomputed => precomputed_history(source, folder),
    }
}

/// Scale closes so the first one equals `initial_value`.
pub fn normalize_closes(prices: &PriceSeries, initial_value: f64) -> Result<Vec<HistoryPoint>, HistoryError> {
    let Some((_, first)) = prices.closes().next() else {
        return Ok(Vec::new());
    };
    if first <= 0.0 {
        return Err(HistoryError::Format {
            path: prices.symbol.clone(),
            reason: format!("first close {first} is not positive"),
        });
    }
    Ok(prices
        .closes()
        .map(|(ts, close)| HistoryPoint::new(ts.clone(), initial_value * close / first))
        .collect())
}

/// The benchmark's history, normalized to `initial_value`.
pub fn benchmark_history(
    source: &dyn DataSource,
    data: &DataConfig,
    symbol: &str,
    initial_value: f64,
) -> Result<Vec<HistoryPoint>, HistoryError> {
    let path = data.benchmark_file.clone();
    let text = source.fetch_text(&path)?;
    let prices = PriceSeries::parse(symbol, &path, &text)?;
    normalize_closes(&prices, initial_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    const NVDA: &str = r#"{"Meta Data": {"2. Symbol": "NVDA"},
 "Time Series (Daily)": {
   "2025-10-01": {"1. buy price": "99.0", "4. sell price": "100.0"},
   "2025-10-02": {"1. buy price": "100.0", "4. sell price": "110.0"},
   "2025-10-06": {"1. buy price": "100.0", "4. close": 120}
 }}"#;

    fn ts(s: &str) -> Timestamp {
        Timestamp::from(s)
    }

    #[test]
    fn parses_price_file_with_both_close_fields() {
        let p = PriceSeries::parse("NVDA", "p.json", NVDA).unwrap();
        assert_eq!(p.close_at(&ts("2025-10-01")), Some(100.0));
        assert_eq!(p.close_at(&ts("2025-10-06")), Some(120.0));
    }

    #[test]
    fn close_carries_forward_but_not_backward() {
        let p = PriceSeries::parse("NVDA", "p.json", NVDA).unwrap();
        assert_eq!(p.close_at(&ts("2025-10-04")), Some(110.0));
        assert_eq!(p.close_at(&ts("2025-09-30")), None);
    }

    #[test]
    fn price_file_without_series_is_format_error() {
        let err = PriceSeries::parse("X", "x.json", r#"{"Note": "rate limited"}"#).unwrap_err();
        assert!(matches!(err, HistoryError::Format { .. }));
    }

    #[test]
    fn values_last_snapshot_per_date() {
        let log = [
            r#"{"date":"2025-10-01","id":0,"positions":{"CASH":10000}}"#,
            r#"{"date":"2025-10-01","id":1,"positions":{"NVDA":10,"CASH":9000}}"#,
            r#"{"date":"2025-10-02","id":2,"positions":{"NVDA":10,"CASH":9000}}"#,
        ];
        let records: Vec<_> = log.iter().map(|l| PositionRecord::parse(l).unwrap()).collect();
        let mut prices = HashMap::new();
        prices.insert("NVDA".into(), PriceSeries::parse("NVDA", "p", NVDA).unwrap());

        let points = value_snapshots(&records, &prices);
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, [10_000.0, 10_100.0]);
    }

    #[test]
    fn unpriced_symbol_contributes_zero() {
        let record = PositionRecord::parse(r#"{"date":"2025-10-01","id":0,"positions":{"ZZZ":5,"CASH":50}}"#).unwrap();
        let points = value_snapshots(&[record], &HashMap::new());
        assert_eq!(points[0].value, 50.0);
    }

    #[test]
    fn positions_history_from_source() {
        let source = MemorySource::new()
            .with(
                "agent_data/a/position/position.jsonl",
                "{\"date\":\"2025-10-01\",\"id\":0,\"positions\":{\"CASH\":10000}}\nnot json\n{\"date\":\"2025-10-02\",\"id\":1,\"positions\":{\"NVDA\":10,\"CASH\":9000}}\n",
            )
            .with("daily_prices_NVDA.json", NVDA);
        let points = positions_history(&source, &DataConfig::default(), "a").unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].value, 10_100.0);
    }

    #[test]
    fn precomputed_accepts_date_or_timestamp() {
        let source = MemorySource::new().with(
            "agent_data/a/asset_history.json",
            r#"[{"date":"2025-10-01","value":1.5},{"timestamp":"2025-10-02","value":2.5}]"#,
        );
        let data = DataConfig {
            history_source: HistorySource::Precomputed,
            ..DataConfig::default()
        };
        let points = agent_history(&source, &data, "a").unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].timestamp.as_str(), "2025-10-02");
    }

    #[test]
    fn benchmark_is_normalized_to_initial_value() {
        let source = MemorySource::new().with("Adaily_prices_QQQ.json", NVDA);
        let points = benchmark_history(&source, &DataConfig::default(), "QQQ", 10_000.0).unwrap();
        assert_eq!(points[0].value, 10_000.0);
        assert!((points[1].value - 11_000.0).abs() < 1e-9);
    }
}
