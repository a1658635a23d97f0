//! Retained trades from an agent's position log.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::timestamp::Timestamp;

/// Direction of a retained trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl TradeAction {
    /// Parse a raw action string. Sentinels (`initial`, `no_trade`) and
    /// anything unknown are not trades.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "buy" => Some(TradeAction::Buy),
            "sell" => Some(TradeAction::Sell),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TradeAction::Buy => "BUY",
            TradeAction::Sell => "SELL",
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A real trade: buy or sell, nonzero amount, named symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub agent: String,
    pub date: Timestamp,
    pub id: i64,
    pub action: TradeAction,
    pub symbol: String,
    pub amount: f64,
    /// Holdings after the trade (symbol → shares, plus `CASH`). Opaque to the dashboard.
    pub positions: BTreeMap<String, f64>,
    pub cash: f64,
}
