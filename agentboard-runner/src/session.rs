//! Dashboard session: one data root, one configuration, one icon cache.
//!
//! `load()` is the whole page build: read the configuration, fetch every
//! series and trade log concurrently, then merge, rank and summarize once
//! all fetches have settled.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use rayon::prelude::*;
use thiserror::Error;
use tracing::info;

use agentboard_core::config::{ConfigError, DashboardConfig};
use agentboard_core::domain::Timestamp;
use agentboard_core::leaderboard::{build_leaderboard, LeaderboardEntry};
use agentboard_core::merge::{merge_series, MergedSeries};
use agentboard_core::reasoning::{load_reasoning, REASONING_UNAVAILABLE};
use agentboard_core::source::{DataSource, FetchError, HttpSource, LocalSource};
use agentboard_core::transactions::TradeFeed;

use crate::icons::{Icon, IconCache};
use crate::loader::{load_series, load_transactions, LoadProgress, NoProgress, SeriesSet};
use crate::provider::ConfigProvider;
use crate::stats::DashboardStats;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("configuration unavailable: {0}")]
    Config(#[from] ConfigError),
    #[error("data source unavailable: {0}")]
    Source(#[from] FetchError),
}

/// Where agent data lives.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DataLocation {
    /// `data.base_path` from the configuration, relative to the config file.
    #[default]
    Configured,
    Dir(PathBuf),
    /// Base URL; icons are served from the same place.
    Url(String),
}

/// Everything the views need, derived fresh on each load.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub config: Arc<DashboardConfig>,
    pub series: SeriesSet,
    pub merged: MergedSeries,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub feed: TradeFeed,
    pub stats: DashboardStats,
    /// Agent id to icon; `None` when the icon failed to load.
    pub icons: HashMap<String, Option<Arc<Icon>>>,
}

impl DashboardData {
    pub fn icon(&self, agent: &str) -> Option<&Icon> {
        self.icons.get(agent).and_then(|i| i.as_deref())
    }

    /// The configured number of most recent trades.
    pub fn recent_trades(&self) -> &[agentboard_core::domain::Transaction] {
        self.feed.recent(self.config.ui().max_recent_trades)
    }
}

/// Agent data source, fixed up front or bound to `data.base_path` once the
/// configuration first loads.
enum DataRoot {
    Fixed(Arc<dyn DataSource>),
    Configured {
        config_dir: PathBuf,
        resolved: OnceLock<Arc<dyn DataSource>>,
    },
}

pub struct DashboardSession {
    root: DataRoot,
    config: ConfigProvider,
    icons: IconCache,
}

impl DashboardSession {
    /// `source` serves agent data; `icon_source` resolves icon paths.
    pub fn new(
        source: Arc<dyn DataSource>,
        config: ConfigProvider,
        icon_source: Arc<dyn DataSource>,
    ) -> Self {
        Self {
            root: DataRoot::Fixed(source),
            config,
            icons: IconCache::new(icon_source),
        }
    }

    /// Session for a configuration file on disk. Icon paths resolve next to
    /// the file. With [`DataLocation::Configured`] the data root is bound on
    /// the first successful configuration load, so a configuration that is
    /// broken at open and fixed before a retry still finds its data.
    pub fn open(config_path: &Path, location: DataLocation) -> Result<Self, SessionError> {
        let config = ConfigProvider::from_file(config_path);
        let config_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let (root, icon_source): (DataRoot, Arc<dyn DataSource>) = match location {
            DataLocation::Url(url) => {
                let http: Arc<dyn DataSource> = Arc::new(HttpSource::new(url)?);
                (DataRoot::Fixed(http.clone()), http)
            }
            DataLocation::Dir(dir) => (
                DataRoot::Fixed(Arc::new(LocalSource::new(dir))),
                Arc::new(LocalSource::new(&config_dir)),
            ),
            DataLocation::Configured => (
                DataRoot::Configured {
                    config_dir: config_dir.clone(),
                    resolved: OnceLock::new(),
                },
                Arc::new(LocalSource::new(&config_dir)),
            ),
        };
        Ok(Self {
            root,
            config,
            icons: IconCache::new(icon_source),
        })
    }

    /// The agent data source. Fails while a config-relative root is still
    /// waiting on a loadable configuration.
    pub fn source(&self) -> Result<Arc<dyn DataSource>, SessionError> {
        match &self.root {
            DataRoot::Fixed(source) => Ok(Arc::clone(source)),
            DataRoot::Configured { config_dir, resolved } => {
                if let Some(source) = resolved.get() {
                    return Ok(Arc::clone(source));
                }
                let config = self.config.get()?;
                let source = resolved.get_or_init(|| {
                    let dir = config_dir.join(&config.data().base_path);
                    info!(root = %dir.display(), "data root resolved from configuration");
                    Arc::new(LocalSource::new(dir))
                });
                Ok(Arc::clone(source))
            }
        }
    }

    /// Human-readable data root for logs.
    pub fn describe_source(&self) -> String {
        match (&self.root, self.source()) {
            (_, Ok(source)) => source.describe(),
            (DataRoot::Configured { config_dir, .. }, Err(_)) => {
                format!("{} (data.base_path pending)", config_dir.display())
            }
            (DataRoot::Fixed(source), Err(_)) => source.describe(),
        }
    }

    pub fn config(&self) -> Result<Arc<DashboardConfig>, SessionError> {
        Ok(self.config.get()?)
    }

    pub fn load(&self) -> Result<DashboardData, SessionError> {
        self.load_with_progress(&NoProgress)
    }

    pub fn load_with_progress(&self, progress: &dyn LoadProgress) -> Result<DashboardData, SessionError> {
        let config = self.config.get()?;
        let source = self.source()?;
        info!(source = %source.describe(), "loading dashboard");

        let source = source.as_ref();
        let (series, feed) = rayon::join(
            || load_series(source, &config, progress),
            || load_transactions(source, &config),
        );

        let merged = merge_series(&series.series());
        let leaderboard = build_leaderboard(&merged, &config, &series.returns());
        let stats = DashboardStats::compute(&series);
        let icons = self.load_icons(&config);

        info!(
            timestamps = merged.len(),
            agents = merged.agent_count(),
            trades = feed.len(),
            "dashboard ready"
        );
        Ok(DashboardData {
            config,
            series,
            merged,
            leaderboard,
            feed,
            stats,
            icons,
        })
    }

    fn load_icons(&self, config: &DashboardConfig) -> HashMap<String, Option<Arc<Icon>>> {
        let mut descriptors = config.enabled_agents();
        descriptors.extend(config.enabled_benchmark());
        descriptors
            .par_iter()
            .map(|d| (d.folder.clone(), self.icons.load(&d.icon)))
            .collect()
    }

    /// Reasoning text for one trade. Never fails.
    pub fn reasoning(&self, agent: &str, date: &Timestamp) -> String {
        match self.source() {
            Ok(source) => load_reasoning(source.as_ref(), agent, date),
            Err(_) => REASONING_UNAVAILABLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentboard_core::source::MemorySource;

    const CONFIG: &str = r##"
[[agents]]
folder = "a"
display_name = "A"
icon = "figs/a.txt"

[[agents]]
folder = "b"
display_name = "B"
icon = "figs/missing.svg"

[data]
history_source = "precomputed"
"##;

    fn session() -> DashboardSession {
        let data = MemorySource::new()
            .with(
                "agent_data/a/asset_history.json",
                r#"[{"date":"2025-10-01","value":100.0},{"date":"2025-10-03","value":120.0}]"#,
            )
            .with(
                "agent_data/b/asset_history.json",
                r#"[{"date":"2025-10-02","value":100.0},{"date":"2025-10-03","value":90.0}]"#,
            );
        let icons = MemorySource::new().with("figs/a.txt", "A+");
        DashboardSession::new(
            Arc::new(data),
            ConfigProvider::inline(CONFIG),
            Arc::new(icons),
        )
    }

    #[test]
    fn load_builds_every_view() {
        let data = session().load().unwrap();
        assert_eq!(data.merged.len(), 3);
        assert_eq!(data.leaderboard[0].agent, "a");
        assert_eq!(data.leaderboard[1].rank, 2);
        assert_eq!(data.stats.agent_count, 2);
        assert_eq!(data.icon("a").map(|i| i.glyph.as_str()), Some("A+"));
        assert!(data.icon("b").is_none());
        assert!(data.recent_trades().is_empty());
    }

    #[test]
    fn config_failure_is_fatal() {
        let session = DashboardSession::new(
            Arc::new(MemorySource::new()),
            ConfigProvider::inline("[[agents]\n"),
            Arc::new(MemorySource::new()),
        );
        assert!(matches!(session.load(), Err(SessionError::Config(_))));
    }

    #[test]
    fn open_with_unreadable_config_defers_the_error() {
        let session = DashboardSession::open(Path::new("/nonexistent/config.toml"), DataLocation::Configured).unwrap();
        assert!(session.describe_source().contains("pending"));
        assert!(matches!(session.source(), Err(SessionError::Config(_))));
        assert!(matches!(session.load(), Err(SessionError::Config(_))));
        assert_eq!(
            session.reasoning("a", &Timestamp::from("2025-10-01")),
            REASONING_UNAVAILABLE
        );
    }

    #[test]
    fn reasoning_falls_back_to_sentinel() {
        let text = session().reasoning("a", &Timestamp::from("2025-10-01"));
        assert_eq!(text, REASONING_UNAVAILABLE);
    }
}
