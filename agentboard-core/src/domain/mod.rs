//! Domain types: timestamps, value histories, trades.

pub mod series;
pub mod timestamp;
pub mod transaction;

pub use series::{AgentSeries, HistoryPoint};
pub use timestamp::{Granularity, Timestamp};
pub use transaction::{TradeAction, Transaction};
