//! Position log records.
//!
//! Each agent keeps an append-only JSONL log at
//! `agent_data/{folder}/position/position.jsonl`. One line per snapshot:
//!
//! ```json
//! {"date": "2025-10-02", "id": 3, "this_action": {"action": "buy", "symbol": "NVDA", "amount": 10},
//!  "positions": {"NVDA": 10, "AAPL": 0, "CASH": 8123.5}}
//! ```
//!
//! The first line is usually an `initial` snapshot and days without a trade
//! carry a `no_trade` action. Both are snapshots, not trades.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::{Timestamp, TradeAction, Transaction};

/// Key under which holdings maps carry the cash balance.
pub const CASH_KEY: &str = "CASH";

pub fn position_log_path(folder: &str) -> String {
    format!("agent_data/{folder}/position/position.jsonl")
}

/// The action recorded with a snapshot. Fields are optional because the
/// writers are not consistent about them.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RecordedAction {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
}

/// One decoded position log line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PositionRecord {
    pub date: Timestamp,
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub this_action: Option<RecordedAction>,
    #[serde(default)]
    pub positions: BTreeMap<String, f64>,
    #[serde(rename = "CASH", default)]
    pub cash: Option<f64>,
}

impl PositionRecord {
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Cash balance: the top-level `CASH` field, else the `CASH` holding, else 0.
    pub fn cash(&self) -> f64 {
        self.cash
            .or_else(|| self.positions.get(CASH_KEY).copied())
            .unwrap_or(0.0)
    }

    /// Non-cash holdings with a nonzero share count.
    pub fn holdings(&self) -> impl Iterator<Item = (&str, f64)> {
        self.positions
            .iter()
            .filter(|(symbol, shares)| symbol.as_str() != CASH_KEY && **shares != 0.0)
            .map(|(symbol, shares)| (symbol.as_str(), *shares))
    }

    /// The retained trade this snapshot records, if any.
    ///
    /// A trade needs a buy/sell action, a nonzero amount and a non-empty
    /// symbol. `initial`, `no_trade` and a missing action are not trades.
    pub fn to_transaction(&self, agent: &str) -> Option<Transaction> {
        let recorded = self.this_action.as_ref()?;
        let action = TradeAction::parse(recorded.action.as_deref()?)?;
        let amount = recorded.amount.filter(|a| *a != 0.0 && a.is_finite())?;
        let symbol = recorded.symbol.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some(Transaction {
            agent: agent.to_string(),
            date: self.date.clone(),
            id: self.id,
            action,
            symbol: symbol.to_string(),
            amount,
            positions: self.positions.clone(),
            cash: self.cash(),
        })
    }
}
