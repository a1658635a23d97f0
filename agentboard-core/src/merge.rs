//! Multi-agent time alignment.
//!
//! Agents record values on their own timestamps. The merger lays every
//! series onto the union of all timestamps; an agent without a value at a
//! timestamp gets `None` there (no zero-fill, no interpolation).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::{AgentSeries, Granularity, Timestamp};

/// All series aligned to one timestamp axis.
///
/// Invariants: `axis` is strictly ascending; `values[a].len() == axis.len()`
/// for every agent column `a`; `agents`, `display_names` and `values` are
/// parallel and in input order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MergedSeries {
    pub axis: Vec<Timestamp>,
    pub agents: Vec<String>,
    pub display_names: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

/// One axis position with every agent's value (or `None`).
#[derive(Debug, Clone, PartialEq)]
pub struct MergedPoint {
    pub timestamp: Timestamp,
    pub values_by_agent: BTreeMap<String, Option<f64>>,
}

/// Merge per-agent histories onto their common timestamp axis.
pub fn merge_series(series: &[AgentSeries]) -> MergedSeries {
    let axis: Vec<Timestamp> = series
        .iter()
        .flat_map(|s| s.history().iter().map(|p| &p.timestamp))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect();

    let values = series
        .iter()
        .map(|s| {
            let index: HashMap<&Timestamp, f64> = s
                .history()
                .iter()
                .map(|p| (&p.timestamp, p.value))
                .collect();
            axis.iter().map(|ts| index.get(ts).copied()).collect()
        })
        .collect();

    MergedSeries {
        axis,
        agents: series.iter().map(|s| s.name.clone()).collect(),
        display_names: series.iter().map(|s| s.display_name.clone()).collect(),
        values,
    }
}

impl MergedSeries {
    pub fn len(&self) -> usize {
        self.axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axis.is_empty()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn index_of(&self, agent: &str) -> Option<usize> {
        self.agents.iter().position(|a| a == agent)
    }

    /// The aligned value column for one agent.
    pub fn column(&self, agent: &str) -> Option<&[Option<f64>]> {
        self.index_of(agent).map(|i| self.values[i].as_slice())
    }

    /// The value of `agent` at axis position `index`.
    pub fn value(&self, agent: usize, index: usize) -> Option<f64> {
        self.values.get(agent).and_then(|col| col.get(index)).copied().flatten()
    }

    pub fn point(&self, index: usize) -> Option<MergedPoint> {
        let timestamp = self.axis.get(index)?.clone();
        let values_by_agent = self
            .agents
            .iter()
            .zip(&self.values)
            .map(|(agent, col)| (agent.clone(), col[index]))
            .collect();
        Some(MergedPoint {
            timestamp,
            values_by_agent,
        })
    }

    /// First non-missing value for an agent column, with its axis index.
    pub fn first_real(&self, agent: usize) -> Option<(usize, f64)> {
        self.values
            .get(agent)?
            .iter()
            .enumerate()
            .find_map(|(i, v)| v.map(|v| (i, v)))
    }

    /// Last non-missing value for an agent column, with its axis index.
    pub fn last_real(&self, agent: usize) -> Option<(usize, f64)> {
        self.values
            .get(agent)?
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, v)| v.map(|v| (i, v)))
    }

    /// Min and max over every real value.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .flatten()
            .flatten()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Combined granularity of the axis; `None` when the axis is empty.
    pub fn granularity(&self) -> Option<Granularity> {
        Granularity::of(&self.axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HistoryPoint;

    fn series(name: &str, points: &[(&str, f64)]) -> AgentSeries {
        AgentSeries::new(
            name,
            name.to_uppercase(),
            None,
            points.iter().map(|(t, v)| HistoryPoint::new(*t, *v)).collect(),
        )
    }

    #[test]
    fn union_axis_with_missing_markers() {
        let a = series("a", &[("2025-10-01", 100.0), ("2025-10-03", 110.0)]);
        let b = series("b", &[("2025-10-02", 200.0), ("2025-10-03", 190.0)]);

        let merged = merge_series(&[a, b]);

        let axis: Vec<&str> = merged.axis.iter().map(|t| t.as_str()).collect();
        assert_eq!(axis, ["2025-10-01", "2025-10-02", "2025-10-03"]);
        assert_eq!(merged.column("a").unwrap(), [Some(100.0), None, Some(110.0)]);
        assert_eq!(merged.column("b").unwrap(), [None, Some(200.0), Some(190.0)]);
    }

    #[test]
    fn point_view() {
        let a = series("a", &[("2025-10-01", 1.0)]);
        let b = series("b", &[("2025-10-02", 2.0)]);
        let merged = merge_series(&[a, b]);

        let p = merged.point(0).unwrap();
        assert_eq!(p.timestamp.as_str(), "2025-10-01");
        assert_eq!(p.values_by_agent["a"], Some(1.0));
        assert_eq!(p.values_by_agent["b"], None);
        assert!(merged.point(2).is_none());
    }

    #[test]
    fn empty_input_and_empty_series() {
        let merged = merge_series(&[]);
        assert!(merged.is_empty());
        assert_eq!(merged.granularity(), None);

        let merged = merge_series(&[AgentSeries::empty("a", "A", None)]);
        assert!(merged.is_empty());
        assert_eq!(merged.agents, ["a"]);
        assert_eq!(merged.values, vec![Vec::<Option<f64>>::new()]);
    }

    #[test]
    fn first_and_last_real() {
        let a = series("a", &[("2025-10-02", 5.0), ("2025-10-03", 6.0)]);
        let b = series("b", &[("2025-10-01", 1.0), ("2025-10-04", 2.0)]);
        let merged = merge_series(&[a, b]);
        assert_eq!(merged.first_real(0), Some((1, 5.0)));
        assert_eq!(merged.last_real(0), Some((2, 6.0)));
        assert_eq!(merged.value_range(), Some((1.0, 6.0)));
    }

    #[test]
    fn mixed_granularity_is_reported() {
        let a = series("a", &[("2025-10-01", 1.0)]);
        let b = series("b", &[("2025-10-01 15:00:00", 2.0)]);
        let merged = merge_series(&[a, b]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.granularity(), Some(Granularity::Mixed));
    }
}
