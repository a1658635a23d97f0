//! Concurrent series and trade loading.
//!
//! Every agent is fetched independently on the rayon pool and gathered in
//! configuration order. One agent failing never affects the others: its
//! series degrades to empty (and its trades to none) with a warning.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{info, warn};

use agentboard_core::config::{AgentDescriptor, DashboardConfig};
use agentboard_core::domain::{AgentSeries, Granularity, Transaction};
use agentboard_core::history::{agent_history, benchmark_history};
use agentboard_core::source::DataSource;
use agentboard_core::transactions::{load_agent_trades, TradeFeed};

/// Progress callback for per-agent loading.
pub trait LoadProgress: Send + Sync {
    /// Called when an agent's fetch completes (successfully or not).
    fn on_agent_loaded(&self, agent: &str, ok: bool);
}

/// Progress reporter that ignores everything.
pub struct NoProgress;

impl LoadProgress for NoProgress {
    fn on_agent_loaded(&self, _agent: &str, _ok: bool) {}
}

/// One agent's loaded history.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSeries {
    pub series: AgentSeries,
    pub return_percent: f64,
    /// Why the series is empty, when loading failed.
    pub error: Option<String>,
}

/// Every loaded series in configuration order, benchmark last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSet {
    entries: Vec<LoadedSeries>,
}

impl SeriesSet {
    pub fn new(entries: Vec<LoadedSeries>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[LoadedSeries] {
        &self.entries
    }

    pub fn get(&self, agent: &str) -> Option<&LoadedSeries> {
        self.entries.iter().find(|e| e.series.name == agent)
    }

    pub fn series(&self) -> Vec<AgentSeries> {
        self.entries.iter().map(|e| e.series.clone()).collect()
    }

    /// Agent id to loader-computed return.
    pub fn returns(&self) -> HashMap<String, f64> {
        self.entries
            .iter()
            .map(|e| (e.series.name.clone(), e.return_percent))
            .collect()
    }

    pub fn failed(&self) -> impl Iterator<Item = &LoadedSeries> {
        self.entries.iter().filter(|e| e.error.is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load every enabled agent plus the enabled benchmark.
pub fn load_series(
    source: &dyn DataSource,
    config: &DashboardConfig,
    progress: &dyn LoadProgress,
) -> SeriesSet {
    let data = config.data();
    let initial_value = config.ui().initial_value;

    let mut targets: Vec<(&AgentDescriptor, bool)> =
        config.enabled_agents().into_iter().map(|a| (a, false)).collect();
    if let Some(bench) = config.enabled_benchmark() {
        targets.push((bench, true));
    }

    let entries: Vec<LoadedSeries> = targets
        .par_iter()
        .map(|(descriptor, is_benchmark)| {
            let history = if *is_benchmark {
                benchmark_history(source, &data, &descriptor.folder, initial_value)
            } else {
                agent_history(source, &data, &descriptor.folder)
            };
            let color = descriptor.color.clone();
            let (series, error) = match history {
                Ok(points) => (
                    AgentSeries::new(&descriptor.folder, &descriptor.display_name, color, points),
                    None,
                ),
                Err(e) => {
                    warn!(agent = %descriptor.folder, error = %e, "series unavailable, showing empty");
                    (
                        AgentSeries::empty(&descriptor.folder, &descriptor.display_name, color),
                        Some(e.to_string()),
                    )
                }
            };
            let series = if *is_benchmark { series.benchmark() } else { series };
            progress.on_agent_loaded(&descriptor.folder, error.is_none());
            LoadedSeries {
                return_percent: series.return_percent(),
                series,
                error,
            }
        })
        .collect();

    let set = SeriesSet::new(entries);
    let all_timestamps = set
        .entries()
        .iter()
        .flat_map(|e| e.series.history().iter().map(|p| &p.timestamp));
    if Granularity::of(all_timestamps) == Some(Granularity::Mixed) {
        warn!("daily and intraday timestamps mixed across agents; merged as-is");
    }
    info!(
        loaded = set.len() - set.failed().count(),
        failed = set.failed().count(),
        "series loaded"
    );
    set
}

/// Load every enabled agent's trades into one most-recent-first feed.
pub fn load_transactions(source: &dyn DataSource, config: &DashboardConfig) -> TradeFeed {
    let agents = config.enabled_agents();
    let per_agent: Vec<Vec<Transaction>> = agents
        .par_iter()
        .map(|agent| match load_agent_trades(source, &agent.folder) {
            Ok(parsed) => {
                if parsed.malformed > 0 {
                    warn!(agent = %agent.folder, malformed = parsed.malformed, "position log had malformed lines");
                }
                parsed.trades
            }
            Err(e) => {
                warn!(agent = %agent.folder, error = %e, "trades unavailable");
                Vec::new()
            }
        })
        .collect();

    let feed = TradeFeed::from_agents(per_agent);
    info!(trades = feed.len(), "transactions loaded");
    feed
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentboard_core::config::{DataConfig, HistorySource};
    use agentboard_core::source::MemorySource;
    use std::sync::Mutex;

    fn config() -> DashboardConfig {
        let mut config = DashboardConfig::from_toml_str(
            r##"
[[agents]]
folder = "a"
display_name = "A"

[[agents]]
folder = "broken"
display_name = "Broken"

[[agents]]
folder = "off"
display_name = "Off"
enabled = false

[benchmark]
folder = "QQQ"
display_name = "QQQ"
"##,
        )
        .unwrap();
        config.data = Some(DataConfig {
            history_source: HistorySource::Precomputed,
            ..DataConfig::default()
        });
        config
    }

    fn source() -> MemorySource {
        MemorySource::new()
            .with(
                "agent_data/a/asset_history.json",
                r#"[{"date":"2025-10-01","value":100.0},{"date":"2025-10-02","value":150.0}]"#,
            )
            .with("agent_data/broken/asset_history.json", "{ nope")
            .with(
                "Adaily_prices_QQQ.json",
                r#"{"Time Series (Daily)":{"2025-10-01":{"4. sell price":"10"},"2025-10-02":{"4. sell price":"11"}}}"#,
            )
            .with(
                "agent_data/a/position/position.jsonl",
                r#"{"date":"2025-10-02","id":1,"this_action":{"action":"buy","symbol":"X","amount":1}}"#,
            )
    }

    struct Recorder(Mutex<Vec<(String, bool)>>);

    impl LoadProgress for Recorder {
        fn on_agent_loaded(&self, agent: &str, ok: bool) {
            self.0.lock().unwrap().push((agent.to_string(), ok));
        }
    }

    #[test]
    fn partial_failure_degrades_one_agent() {
        let recorder = Recorder(Mutex::new(Vec::new()));
        let set = load_series(&source(), &config(), &recorder);

        let names: Vec<&str> = set.entries().iter().map(|e| e.series.name.as_str()).collect();
        assert_eq!(names, ["a", "broken", "QQQ"]);

        let a = set.get("a").unwrap();
        assert!((a.return_percent - 50.0).abs() < 1e-12);
        assert!(a.error.is_none());

        let broken = set.get("broken").unwrap();
        assert!(broken.series.is_empty());
        assert_eq!(broken.return_percent, 0.0);
        assert!(broken.error.is_some());

        let bench = set.get("QQQ").unwrap();
        assert!(bench.series.is_benchmark);
        assert_eq!(bench.series.first().unwrap().value, 10_000.0);

        assert_eq!(recorder.0.lock().unwrap().len(), 3);
    }

    #[test]
    fn transactions_skip_missing_logs() {
        let feed = load_transactions(&source(), &config());
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.all()[0].agent, "a");
    }
}
