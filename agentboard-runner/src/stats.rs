//! Headline stat cards.

use serde::Serialize;

use agentboard_core::domain::Timestamp;

use crate::loader::{LoadedSeries, SeriesSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestPerformer {
    pub agent: String,
    pub display_name: String,
    pub return_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardStats {
    /// Tracked agents, benchmark excluded.
    pub agent_count: usize,
    /// Earliest first point to latest last point over all non-empty series.
    pub date_range: Option<(Timestamp, Timestamp)>,
    /// Highest return among non-benchmark agents with data.
    pub best_performer: Option<BestPerformer>,
}

impl DashboardStats {
    pub fn compute(set: &SeriesSet) -> Self {
        let agents = || set.entries().iter().filter(|e| !e.series.is_benchmark);

        let start = set
            .entries()
            .iter()
            .filter_map(|e| e.series.first())
            .map(|p| &p.timestamp)
            .min();
        let end = set
            .entries()
            .iter()
            .filter_map(|e| e.series.last())
            .map(|p| &p.timestamp)
            .max();

        // First maximum wins on ties.
        let best = agents()
            .filter(|e| !e.series.is_empty())
            .fold(None, |best: Option<&LoadedSeries>, e| match best {
                Some(b) if b.return_percent >= e.return_percent => Some(b),
                _ => Some(e),
            })
            .map(|e| BestPerformer {
                agent: e.series.name.clone(),
                display_name: e.series.display_name.clone(),
                return_percent: e.return_percent,
            });

        Self {
            agent_count: agents().count(),
            date_range: start.zip(end).map(|(s, e)| (s.clone(), e.clone())),
            best_performer: best,
        }
    }
}
