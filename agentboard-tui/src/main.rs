//! AgentBoard TUI: four panels over one dashboard load.
//!
//! Panels:
//! 1. Asset Evolution: every agent and the benchmark on one chart
//! 2. Leaderboard: ranked by final value
//! 3. Recent Activity: latest trades, Enter for reasoning
//! 4. Help: keyboard shortcuts

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use agentboard_core::logging::{init_logging_to_file, LogConfig, LogFormat};
use agentboard_runner::{DashboardSession, DataLocation};
use agentboard_tui::app::App;
use agentboard_tui::worker::{self, WorkerCommand};
use agentboard_tui::{input, persistence, ui};

#[derive(Parser, Debug)]
#[command(name = "agentboard-tui", version, about = "Terminal dashboard for trading agents")]
struct Cli {
    /// Dashboard configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Data root directory (overrides `data.base_path`).
    #[arg(long, conflicts_with = "data_url")]
    data_dir: Option<PathBuf>,

    /// Fetch data over HTTP from this base URL.
    #[arg(long)]
    data_url: Option<String>,

    /// Where `x` writes the CSV export.
    #[arg(long, default_value = ".")]
    export_dir: PathBuf,

    /// Log filter directive.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log format: pretty, json or compact.
    #[arg(long, default_value = "compact")]
    log_format: LogFormat,

    /// Log file (default: agentboard/tui.log under the local data dir).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let app_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agentboard");
    let state_path = app_dir.join("state.json");
    let log_path = cli.log_file.clone().unwrap_or_else(|| {
        dirs::data_local_dir()
            .map(|d| d.join("agentboard"))
            .unwrap_or_else(|| app_dir.clone())
            .join("tui.log")
    });

    // Logs go to a file; stderr belongs to the terminal UI.
    let log_config = LogConfig::new(&cli.log_level).with_format(cli.log_format);
    init_logging_to_file(&log_config, &log_path)
        .with_context(|| format!("initializing logging at {}", log_path.display()))?;

    let location = match (&cli.data_dir, &cli.data_url) {
        (_, Some(url)) => DataLocation::Url(url.clone()),
        (Some(dir), None) => DataLocation::Dir(dir.clone()),
        (None, None) => DataLocation::Configured,
    };
    let session = DashboardSession::open(&cli.config, location).context("opening dashboard session")?;
    info!(config = %cli.config.display(), source = %session.describe_source(), "starting");

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), DisableMouseCapture, LeaveAlternateScreen);
        default_hook(info);
    }));

    let persisted = persistence::load(&state_path);

    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(session, cmd_rx, resp_tx).context("spawning worker thread")?;

    let width = crossterm::terminal::size().map(|(w, _)| w).unwrap_or(80);
    let mut app = App::new(cmd_tx.clone(), resp_rx, cli.export_dir.clone(), width);
    persistence::apply(&mut app, persisted);
    app.request_load();

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    let persisted = persistence::extract(&app);
    if let Err(e) = persistence::save(&state_path, &persisted) {
        tracing::warn!(error = %format!("{e:#}"), "could not save UI state");
    }

    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.tick(Instant::now());

        terminal.draw(|f| ui::draw(f, app))?;

        while let Ok(resp) = app.worker_rx.try_recv() {
            app.handle_worker_response(resp);
        }

        // 50ms poll keeps the loop at roughly 20 FPS.
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => input::handle_key(app, key),
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                Event::Resize(width, _) => app.on_resize(width, Instant::now()),
                _ => {}
            }
        }

        if !app.running {
            break;
        }
    }
    Ok(())
}
