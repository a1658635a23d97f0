//! End-to-end reads from an on-disk data directory.

use std::fs;
use std::path::Path;

use agentboard_core::config::DashboardConfig;
use agentboard_core::domain::{AgentSeries, Timestamp, TradeAction};
use agentboard_core::history::{agent_history, benchmark_history};
use agentboard_core::merge::merge_series;
use agentboard_core::reasoning::{load_reasoning, REASONING_UNAVAILABLE};
use agentboard_core::source::LocalSource;
use agentboard_core::transactions::{load_agent_trades, TradeFeed};

const CONFIG: &str = r##"
[[agents]]
folder = "alpha"
display_name = "Alpha"

[[agents]]
folder = "beta"
display_name = "Beta"

[benchmark]
folder = "QQQ"
display_name = "QQQ"
color = "#ff6b00"
"##;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn prices(closes: &[(&str, f64)]) -> String {
    let body: Vec<String> = closes
        .iter()
        .map(|(d, c)| format!(r#""{d}": {{"1. buy price": "{c}", "4. sell price": "{c}"}}"#))
        .collect();
    format!(r#"{{"Meta Data": {{}}, "Time Series (Daily)": {{{}}}}}"#, body.join(","))
}

fn fixture() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(
        root,
        "agent_data/alpha/position/position.jsonl",
        concat!(
            r#"{"date":"2025-10-01","id":0,"this_action":{"action":"initial"},"positions":{"AAA":0,"CASH":10000}}"#,
            "\n",
            r#"{"date":"2025-10-01","id":1,"this_action":{"action":"buy","symbol":"AAA","amount":50},"positions":{"AAA":50,"CASH":5000}}"#,
            "\n",
            r#"{"date":"2025-10-02","id":2,"this_action":{"action":"no_trade"},"positions":{"AAA":50,"CASH":5000}}"#,
            "\n",
            r#"{"date":"2025-10-03","id":3,"this_action":{"action":"sell","symbol":"AAA","amount":20},"positions":{"AAA":30,"CASH":7400}}"#,
            "\n",
        ),
    );
    write(
        root,
        "agent_data/beta/position/position.jsonl",
        concat!(
            r#"{"date":"2025-10-02","id":0,"positions":{"CASH":10000}}"#,
            "\n",
            r#"{"date":"2025-10-02","id":1,"this_action":{"action":"buy","symbol":"AAA","amount":10},"positions":{"AAA":10,"CASH":9000}}"#,
            "\n",
        ),
    );
    write(
        root,
        "daily_prices_AAA.json",
        &prices(&[("2025-10-01", 100.0), ("2025-10-02", 110.0), ("2025-10-03", 120.0)]),
    );
    write(
        root,
        "Adaily_prices_QQQ.json",
        &prices(&[("2025-10-01", 500.0), ("2025-10-02", 505.0), ("2025-10-03", 495.0)]),
    );
    write(
        root,
        "agent_data/alpha/log/2025-10-03/log.jsonl",
        r#"{"new_messages":[{"role":"assistant","content":"Trimming AAA after the run-up.<FINISH_SIGNAL>"}]}"#,
    );
    dir
}

#[test]
fn histories_merge_with_benchmark() {
    let dir = fixture();
    let source = LocalSource::new(dir.path());
    let config = DashboardConfig::from_toml_str(CONFIG).unwrap();
    let data = config.data();

    let mut series = Vec::new();
    for agent in config.enabled_agents() {
        let history = agent_history(&source, &data, &agent.folder).unwrap();
        series.push(AgentSeries::new(&agent.folder, &agent.display_name, None, history));
    }
    let bench = benchmark_history(&source, &data, "QQQ", config.ui().initial_value).unwrap();
    series.push(AgentSeries::new("QQQ", "QQQ", None, bench).benchmark());

    let alpha: Vec<f64> = series[0].history().iter().map(|p| p.value).collect();
    assert_eq!(alpha, [10_000.0, 10_500.0, 11_000.0]);
    assert_eq!(series[1].len(), 1);
    assert_eq!(series[1].history()[0].value, 10_100.0);

    let merged = merge_series(&series);
    assert_eq!(merged.len(), 3);
    assert_eq!(merged.column("beta").unwrap(), [None, Some(10_100.0), None]);
    assert_eq!(merged.column("QQQ").unwrap()[0], Some(10_000.0));
}

#[test]
fn trade_feed_and_reasoning() {
    let dir = fixture();
    let source = LocalSource::new(dir.path());

    let alpha = load_agent_trades(&source, "alpha").unwrap();
    assert_eq!(alpha.trades.len(), 2);
    assert_eq!(alpha.no_trade, 2);
    let beta = load_agent_trades(&source, "beta").unwrap();

    let feed = TradeFeed::from_agents([alpha.trades, beta.trades]);
    let first = &feed.all()[0];
    assert_eq!(first.agent, "alpha");
    assert_eq!(first.action, TradeAction::Sell);
    assert_eq!(feed.all()[1].agent, "beta");

    assert_eq!(
        load_reasoning(&source, &first.agent, &first.date),
        "Trimming AAA after the run-up."
    );
    assert_eq!(
        load_reasoning(&source, "beta", &Timestamp::from("2025-10-02")),
        REASONING_UNAVAILABLE
    );
}

#[test]
fn missing_agent_directory_is_not_found() {
    let dir = fixture();
    let source = LocalSource::new(dir.path());
    let config = DashboardConfig::default();
    let err = agent_history(&source, &config.data(), "ghost").unwrap_err();
    assert!(err.to_string().contains("not found"));
}
