//! AgentBoard TUI: agent asset evolution against a benchmark, in the
//! terminal.
//!
//! - Asset evolution chart with linear/log scale and a ranked hover tooltip
//! - Leaderboard by final portfolio value
//! - Recent trades with per-trade reasoning
//! - CSV export of the merged series

pub mod app;
pub mod chart;
pub mod debounce;
pub mod input;
pub mod persistence;
pub mod theme;
pub mod tooltip;
pub mod ui;
pub mod worker;

pub use app::App;
pub use theme::Theme;
