//! Trade extraction from position logs.
//!
//! Every line of a position log is decoded on its own. The outcome is kept
//! three-way so that snapshots without a trade are never confused with
//! lines that failed to decode.

use std::cmp::Ordering;

use tracing::warn;

use crate::domain::Transaction;
use crate::position::{position_log_path, PositionRecord};
use crate::source::{DataSource, FetchError};

/// What one position log line turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Trade(Transaction),
    /// A valid snapshot without a retained trade (initial, no_trade, zero
    /// amount, empty symbol, missing action).
    NoTrade,
    /// Invalid JSON or a record that does not match the schema.
    Malformed(String),
}

pub fn classify_line(agent: &str, line: &str) -> LineOutcome {
    match PositionRecord::parse(line) {
        Ok(record) => match record.to_transaction(agent) {
            Some(tx) => LineOutcome::Trade(tx),
            None => LineOutcome::NoTrade,
        },
        Err(e) => LineOutcome::Malformed(e.to_string()),
    }
}

/// Trades of one agent plus per-outcome counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentTrades {
    pub trades: Vec<Transaction>,
    pub no_trade: usize,
    pub malformed: usize,
}

/// Decode a whole position log. Blank lines are ignored.
pub fn parse_position_log(agent: &str, text: &str) -> AgentTrades {
    let mut out = AgentTrades::default();
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match classify_line(agent, line) {
            LineOutcome::Trade(tx) => out.trades.push(tx),
            LineOutcome::NoTrade => out.no_trade += 1,
            LineOutcome::Malformed(reason) => {
                warn!(agent, line = line_no + 1, %reason, "skipping malformed position record");
                out.malformed += 1;
            }
        }
    }
    out
}

/// Fetch and decode one agent's position log.
pub fn load_agent_trades(source: &dyn DataSource, agent: &str) -> Result<AgentTrades, FetchError> {
    let text = source.fetch_text(&position_log_path(agent))?;
    Ok(parse_position_log(agent, &text))
}

/// Most recent first: parsed date descending, then record id descending.
///
/// Dates that do not parse sort after every parseable one. The sort is
/// stable, so equal keys keep the order they were gathered in.
pub fn sort_most_recent_first(trades: &mut [Transaction]) {
    trades.sort_by(|a, b| compare_recency(b, a));
}

fn compare_recency(a: &Transaction, b: &Transaction) -> Ordering {
    a.date
        .to_datetime()
        .cmp(&b.date.to_datetime())
        .then(a.id.cmp(&b.id))
}

/// The flat, sorted trade feed across all agents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeFeed {
    trades: Vec<Transaction>,
}

impl TradeFeed {
    /// Gather per-agent trades (in configuration order) into one feed.
    pub fn from_agents(per_agent: impl IntoIterator<Item = Vec<Transaction>>) -> Self {
        let mut trades: Vec<Transaction> = per_agent.into_iter().flatten().collect();
        sort_most_recent_first(&mut trades);
        Self { trades }
    }

    pub fn all(&self) -> &[Transaction] {
        &self.trades
    }

    /// The `n` most recent trades.
    pub fn recent(&self, n: usize) -> &[Transaction] {
        &self.trades[..n.min(self.trades.len())]
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    const LOG: &str = r#"{"date":"2025-10-01","id":0,"this_action":{"action":"initial"},"positions":{"CASH":10000}}
{"date":"2025-10-01","id":1,"this_action":{"action":"buy","symbol":"NVDA","amount":10},"positions":{"NVDA":10,"CASH":8200}}

{"date":"2025-10-02","id":2,"this_action":{"action":"no_trade","symbol":"","amount":0},"positions":{"NVDA":10,"CASH":8200}}
{this is not json
{"date":"2025-10-03","id":3,"this_action":{"action":"sell","symbol":"NVDA","amount":5},"positions":{"NVDA":5,"CASH":9100}}
"#;

    #[test]
    fn outcomes_are_counted_separately() {
        let parsed = parse_position_log("gpt-5", LOG);
        assert_eq!(parsed.trades.len(), 2);
        assert_eq!(parsed.no_trade, 2);
        assert_eq!(parsed.malformed, 1);
    }

    #[test]
    fn classify_distinguishes_malformed_from_no_trade() {
        assert_eq!(
            classify_line("a", r#"{"date":"2025-10-01","this_action":{"action":"initial"}}"#),
            LineOutcome::NoTrade
        );
        assert!(matches!(classify_line("a", "{"), LineOutcome::Malformed(_)));
    }

    #[test]
    fn feed_is_most_recent_first_across_agents() {
        let a = parse_position_log("a", LOG).trades;
        let b = parse_position_log(
            "b",
            r#"{"date":"2025-10-02 10:00:00","id":7,"this_action":{"action":"buy","symbol":"AAPL","amount":1}}"#,
        )
        .trades;
        let feed = TradeFeed::from_agents([a, b]);

        let order: Vec<(&str, i64)> = feed.all().iter().map(|t| (t.agent.as_str(), t.id)).collect();
        assert_eq!(order, [("a", 3), ("b", 7), ("a", 1)]);
        assert_eq!(feed.recent(1).len(), 1);
        assert_eq!(feed.recent(99).len(), 3);
    }

    #[test]
    fn same_date_orders_by_id_descending() {
        let log = r#"{"date":"2025-10-01","id":1,"this_action":{"action":"buy","symbol":"X","amount":1}}
{"date":"2025-10-01","id":2,"this_action":{"action":"buy","symbol":"Y","amount":1}}"#;
        let feed = TradeFeed::from_agents([parse_position_log("a", log).trades]);
        assert_eq!(feed.all()[0].symbol, "Y");
    }

    #[test]
    fn load_reports_missing_log() {
        let source = MemorySource::new();
        let err = load_agent_trades(&source, "ghost").unwrap_err();
        assert!(err.is_not_found());
    }
}
