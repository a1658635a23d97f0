//! AgentBoard CLI: the dashboard's numbers without the terminal UI.
//!
//! Commands:
//! - `stats`: agent count, period, best performer
//! - `leaderboard`: every series ranked by final value
//! - `transactions`: most recent trades across agents
//! - `reasoning`: an agent's explanation for one trade
//! - `export`: write the merged asset table as CSV

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use agentboard_core::domain::{Timestamp, Transaction};
use agentboard_core::export::write_export;
use agentboard_core::format::{
    format_activity_time, format_currency, format_date, format_percent,
};
use agentboard_core::leaderboard::LeaderboardEntry;
use agentboard_core::logging::{init_logging, LogConfig, LogFormat};
use agentboard_runner::{DashboardData, DashboardSession, DashboardStats, DataLocation};

#[derive(Parser)]
#[command(
    name = "agentboard",
    version,
    about = "AgentBoard CLI: trading agents against a benchmark"
)]
struct Cli {
    /// Dashboard configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Data root directory (overrides `data.base_path`).
    #[arg(long, global = true, conflicts_with = "data_url")]
    data_dir: Option<PathBuf>,

    /// Fetch data over HTTP from this base URL.
    #[arg(long, global = true)]
    data_url: Option<String>,

    /// Log filter directive, e.g. `info` or `agentboard_core=debug`.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log format: pretty, json or compact.
    #[arg(long, global = true, default_value = "pretty")]
    log_format: LogFormat,

    /// Print JSON instead of a table.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Agent count, period covered and best performer.
    Stats,
    /// Every agent and the benchmark ranked by final value.
    Leaderboard,
    /// Most recent trades across all agents.
    Transactions {
        /// How many trades to show. Defaults to `ui.max_recent_trades`.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// The agent's reasoning for the trade at a timestamp.
    Reasoning {
        #[arg(long)]
        agent: String,
        /// Trade timestamp, as it appears in the position log.
        #[arg(long)]
        date: String,
    },
    /// Write `aitrader_asset_evolution.csv`.
    Export {
        /// Output directory.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::new(&cli.log_level).with_format(cli.log_format);
    init_logging(&log_config).context("initializing logging")?;

    let location = match (&cli.data_dir, &cli.data_url) {
        (_, Some(url)) => DataLocation::Url(url.clone()),
        (Some(dir), None) => DataLocation::Dir(dir.clone()),
        (None, None) => DataLocation::Configured,
    };
    let session = DashboardSession::open(&cli.config, location)
        .with_context(|| format!("opening dashboard for {}", cli.config.display()))?;

    // Reasoning needs only the session, not a full load.
    if let Commands::Reasoning { agent, date } = &cli.command {
        session
            .config()
            .with_context(|| format!("loading {}", cli.config.display()))?;
        let text = session.reasoning(agent, &Timestamp::new(date.as_str()));
        if cli.json {
            println!("{}", serde_json::json!({ "agent": agent, "date": date, "reasoning": text }));
        } else {
            println!("{text}");
        }
        return Ok(());
    }

    let data = session
        .load()
        .with_context(|| format!("loading {}", cli.config.display()))?;
    for failed in data.series.failed() {
        eprintln!(
            "warning: {} has no data ({})",
            failed.series.display_name,
            failed.error.as_deref().unwrap_or("unknown error")
        );
    }

    match cli.command {
        Commands::Stats => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&data.stats)?);
            } else {
                print!("{}", render_stats(&data.stats));
            }
        }
        Commands::Leaderboard => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&data.leaderboard)?);
            } else {
                print!("{}", render_leaderboard(&data.leaderboard));
            }
        }
        Commands::Transactions { limit } => {
            let trades = match limit {
                Some(n) => data.feed.recent(n),
                None => data.recent_trades(),
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(trades)?);
            } else {
                print!("{}", render_transactions(&data, trades));
            }
        }
        Commands::Export { out } => {
            std::fs::create_dir_all(&out)
                .with_context(|| format!("creating {}", out.display()))?;
            let path = write_export(&data.merged, &out)?;
            info!(path = %path.display(), rows = data.merged.len(), "export written");
            println!("Exported {} rows to {}", data.merged.len(), path.display());
        }
        Commands::Reasoning { .. } => {}
    }
    Ok(())
}

fn render_stats(stats: &DashboardStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Agents:         {}", stats.agent_count);
    match &stats.date_range {
        Some((start, end)) => {
            let _ = writeln!(out, "Period:         {} to {}", format_date(start), format_date(end));
        }
        None => {
            let _ = writeln!(out, "Period:         -");
        }
    }
    match &stats.best_performer {
        Some(best) => {
            let _ = writeln!(out, "Best performer: {}", best.display_name);
            let _ = writeln!(out, "Best return:    {}", format_percent(best.return_percent));
        }
        None => {
            let _ = writeln!(out, "Best performer: -");
        }
    }
    out
}

fn render_leaderboard(entries: &[LeaderboardEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<28} {:>14} {:>12} {:>9} {:>9}",
        "#", "Agent", "Final Value", "Gain", "Gain %", "Return %"
    );
    for e in entries {
        let name = if e.is_benchmark {
            format!("{} (benchmark)", e.display_name)
        } else {
            e.display_name.clone()
        };
        let _ = writeln!(
            out,
            "{:>4}  {:<28} {:>14} {:>12} {:>9} {:>9}",
            e.rank,
            name,
            format_currency(e.final_value),
            format_currency(e.gain),
            format_percent(e.gain_percent),
            format_percent(e.return_percent),
        );
    }
    out
}

fn render_transactions(data: &DashboardData, trades: &[Transaction]) -> String {
    if trades.is_empty() {
        return "No trades recorded.\n".to_string();
    }
    let mut out = String::new();
    for t in trades {
        let _ = writeln!(
            out,
            "{:<14} {:<24} {:<5} {} {}",
            format_activity_time(&t.date),
            data.config.display_name(&t.agent),
            t.action.label(),
            t.amount,
            t.symbol,
        );
    }
    out
}
