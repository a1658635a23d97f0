//! Criterion benchmarks for the dashboard hot paths.
//!
//! 1. Series merge (union axis + per-agent lookups) at growing history sizes
//! 2. Leaderboard build over a merged table
//! 3. CSV export of a merged table

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use agentboard_core::config::DashboardConfig;
use agentboard_core::domain::{AgentSeries, HistoryPoint};
use agentboard_core::export::export_merged_csv;
use agentboard_core::leaderboard::build_leaderboard;
use agentboard_core::merge::merge_series;

// ── Helpers ──────────────────────────────────────────────────────────

/// `agents` series of `points` daily values; agent `i` skips every
/// `(i + 2)`-th day so the axes only partially overlap.
fn make_series(agents: usize, points: usize) -> Vec<AgentSeries> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    (0..agents)
        .map(|a| {
            let history = (0..points)
                .filter(|d| d % (a + 2) != 0)
                .map(|d| {
                    let date = base + Duration::days(d as i64);
                    let value = 10_000.0 + (d as f64 * 0.05 + a as f64).sin() * 500.0;
                    HistoryPoint::new(date.format("%Y-%m-%d").to_string(), value)
                })
                .collect();
            AgentSeries::new(format!("agent-{a}"), format!("Agent {a}"), None, history)
        })
        .collect()
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    for points in [250usize, 1_000, 5_000] {
        let series = make_series(8, points);
        group.bench_with_input(BenchmarkId::new("8_agents", points), &series, |b, s| {
            b.iter(|| merge_series(black_box(s)))
        });
    }
    group.finish();
}

fn bench_leaderboard(c: &mut Criterion) {
    let merged = merge_series(&make_series(8, 1_000));
    let config = DashboardConfig::default();
    let returns = HashMap::new();
    c.bench_function("leaderboard_8_agents_1000_points", |b| {
        b.iter(|| build_leaderboard(black_box(&merged), &config, &returns))
    });
}

fn bench_export(c: &mut Criterion) {
    let merged = merge_series(&make_series(8, 1_000));
    c.bench_function("csv_export_8_agents_1000_points", |b| {
        b.iter(|| export_merged_csv(black_box(&merged)))
    });
}

criterion_group!(benches, bench_merge, bench_leaderboard, bench_export);
criterion_main!(benches);
