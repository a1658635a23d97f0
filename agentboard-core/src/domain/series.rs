//! Per-agent value history.

use serde::{Deserialize, Serialize};

use super::timestamp::Timestamp;

/// One recorded portfolio value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub timestamp: Timestamp,
    pub value: f64,
}

impl HistoryPoint {
    pub fn new(timestamp: impl Into<Timestamp>, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            value,
        }
    }
}

/// An agent's (or the benchmark's) value history.
///
/// Invariant: `history` is sorted ascending by timestamp with one point per
/// timestamp. Not aligned with any other agent's series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSeries {
    pub name: String,
    pub display_name: String,
    pub color: Option<String>,
    pub is_benchmark: bool,
    history: Vec<HistoryPoint>,
}

impl AgentSeries {
    /// Build a series, sorting the history and keeping the last point for
    /// any repeated timestamp.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        color: Option<String>,
        mut history: Vec<HistoryPoint>,
    ) -> Self {
        history.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        let mut deduped: Vec<HistoryPoint> = Vec::with_capacity(history.len());
        for point in history {
            match deduped.last_mut() {
                Some(last) if last.timestamp == point.timestamp => *last = point,
                _ => deduped.push(point),
            }
        }
        Self {
            name: name.into(),
            display_name: display_name.into(),
            color,
            is_benchmark: false,
            history: deduped,
        }
    }

    /// An empty series. A failed load degrades to this.
    pub fn empty(name: impl Into<String>, display_name: impl Into<String>, color: Option<String>) -> Self {
        Self::new(name, display_name, color, Vec::new())
    }

    pub fn benchmark(mut self) -> Self {
        self.is_benchmark = true;
        self
    }

    pub fn history(&self) -> &[HistoryPoint] {
        &self.history
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn first(&self) -> Option<&HistoryPoint> {
        self.history.first()
    }

    pub fn last(&self) -> Option<&HistoryPoint> {
        self.history.last()
    }

    /// Total return relative to the first recorded value, in percent.
    ///
    /// Zero for an empty series or a zero starting value.
    pub fn return_percent(&self) -> f64 {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) if first.value != 0.0 => {
                (last.value - first.value) / first.value * 100.0
            }
            _ => 0.0,
        }
    }
}
