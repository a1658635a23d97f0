//! AgentBoard Runner: session orchestration on top of `agentboard-core`.
//!
//! - Configuration provider (read once per session)
//! - Concurrent series and trade loaders with per-agent degradation
//! - Icon cache shared by concurrent loads
//! - Stat cards (agent count, date range, best performer)

pub mod icons;
pub mod loader;
pub mod provider;
pub mod session;
pub mod stats;

pub use icons::{Icon, IconCache};
pub use loader::{load_series, load_transactions, LoadProgress, LoadedSeries, NoProgress, SeriesSet};
pub use provider::{ConfigOrigin, ConfigProvider};
pub use session::{DashboardData, DashboardSession, DataLocation, SessionError};
pub use stats::{BestPerformer, DashboardStats};
