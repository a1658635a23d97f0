//! Agent ranking by current portfolio value.
//!
//! Built from the merged series: an agent's initial value is its first real
//! point and its final value its last. Agents without any point start and
//! end at the configured initial value.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::DashboardConfig;
use crate::merge::MergedSeries;

/// One ranked row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub agent: String,
    pub display_name: String,
    pub icon: String,
    pub color: Option<String>,
    pub is_benchmark: bool,
    pub initial_value: f64,
    pub final_value: f64,
    pub gain: f64,
    pub gain_percent: f64,
    pub return_percent: f64,
    /// 1-based.
    pub rank: usize,
}

/// Rank every merged agent by final value, highest first.
///
/// `returns` carries the return computed when each series was loaded; an
/// agent absent from it falls back to its gain percentage. Ties keep the
/// merged (configuration) order.
pub fn build_leaderboard(
    merged: &MergedSeries,
    config: &DashboardConfig,
    returns: &HashMap<String, f64>,
) -> Vec<LeaderboardEntry> {
    let default_initial = config.ui().initial_value;

    let mut entries: Vec<LeaderboardEntry> = merged
        .agents
        .iter()
        .enumerate()
        .map(|(i, agent)| {
            let initial_value = merged.first_real(i).map_or(default_initial, |(_, v)| v);
            let final_value = merged.last_real(i).map_or(initial_value, |(_, v)| v);
            let gain = final_value - initial_value;
            let gain_percent = if initial_value != 0.0 {
                gain / initial_value * 100.0
            } else {
                0.0
            };
            LeaderboardEntry {
                agent: agent.clone(),
                display_name: config.display_name(agent).to_string(),
                icon: config.icon(agent).to_string(),
                color: config.color(agent).map(str::to_string),
                is_benchmark: config.is_benchmark(agent),
                initial_value,
                final_value,
                gain,
                gain_percent,
                return_percent: returns.get(agent).copied().unwrap_or(gain_percent),
                rank: 0,
            }
        })
        .collect();

    entries.sort_by(|a, b| b.final_value.total_cmp(&a.final_value));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AgentSeries, HistoryPoint};
    use crate::merge::merge_series;

    fn series(name: &str, points: &[(&str, f64)]) -> AgentSeries {
        AgentSeries::new(
            name,
            name,
            None,
            points.iter().map(|(t, v)| HistoryPoint::new(*t, *v)).collect(),
        )
    }

    #[test]
    fn ranks_by_final_value() {
        let merged = merge_series(&[
            series("X", &[("2025-10-01", 10_000.0), ("2025-10-02", 12_000.0)]),
            series("Y", &[("2025-10-01", 10_000.0), ("2025-10-02", 9_000.0)]),
            series("Z", &[("2025-10-01", 10_000.0), ("2025-10-02", 15_000.0)]),
        ]);
        let board = build_leaderboard(&merged, &DashboardConfig::default(), &HashMap::new());

        let order: Vec<(&str, usize)> = board.iter().map(|e| (e.agent.as_str(), e.rank)).collect();
        assert_eq!(order, [("Z", 1), ("X", 2), ("Y", 3)]);
        assert!((board[0].gain_percent - 50.0).abs() < 1e-12);
        assert!((board[2].gain - -1_000.0).abs() < 1e-12);
    }

    #[test]
    fn empty_series_uses_configured_initial_value() {
        let merged = merge_series(&[AgentSeries::empty("ghost", "Ghost", None)]);
        let board = build_leaderboard(&merged, &DashboardConfig::default(), &HashMap::new());
        assert_eq!(board[0].initial_value, 10_000.0);
        assert_eq!(board[0].final_value, 10_000.0);
        assert_eq!(board[0].gain_percent, 0.0);
    }

    #[test]
    fn zero_initial_value_has_zero_gain_percent() {
        let merged = merge_series(&[series("a", &[("2025-10-01", 0.0), ("2025-10-02", 5.0)])]);
        let board = build_leaderboard(&merged, &DashboardConfig::default(), &HashMap::new());
        assert_eq!(board[0].gain, 5.0);
        assert_eq!(board[0].gain_percent, 0.0);
    }

    #[test]
    fn loader_return_overrides_gain_percent() {
        let merged = merge_series(&[series("a", &[("2025-10-01", 100.0), ("2025-10-02", 110.0)])]);
        let returns = HashMap::from([("a".to_string(), 42.0)]);
        let board = build_leaderboard(&merged, &DashboardConfig::default(), &returns);
        assert_eq!(board[0].return_percent, 42.0);
    }

    #[test]
    fn ties_keep_input_order() {
        let merged = merge_series(&[
            series("first", &[("2025-10-01", 100.0)]),
            series("second", &[("2025-10-01", 100.0)]),
        ]);
        let board = build_leaderboard(&merged, &DashboardConfig::default(), &HashMap::new());
        assert_eq!(board[0].agent, "first");
        assert_eq!(board[1].agent, "second");
    }
}
