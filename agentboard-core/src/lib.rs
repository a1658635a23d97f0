//! AgentBoard Core: domain types and the pure data pipeline behind the dashboard.
//!
//! - Domain types (timestamps, value histories, trades)
//! - TOML configuration document with defaults and validation
//! - Data sources (local directory, HTTP, in-memory)
//! - Value history reconstruction from position logs and price files
//! - Series merger onto a common timestamp axis
//! - Leaderboard builder, trade feed, reasoning lookup
//! - CSV export, display formatting, logging setup

pub mod config;
pub mod domain;
pub mod export;
pub mod format;
pub mod history;
pub mod leaderboard;
pub mod logging;
pub mod merge;
pub mod position;
pub mod reasoning;
pub mod source;
pub mod transactions;
