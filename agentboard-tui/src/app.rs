//! Application state, owned by the main thread.
//!
//! The worker thread only talks to this through channels; everything the
//! views read lives here.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Instant;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use agentboard_core::config::ScaleMode;
use agentboard_core::domain::Transaction;
use agentboard_core::export::write_export;
use agentboard_runner::DashboardData;

use crate::chart::{ChartGeometry, ChartModel, SeriesStyle};
use crate::debounce::{Debouncer, RESIZE_DEBOUNCE};
use crate::tooltip::Tooltip;
use crate::worker::{WorkerCommand, WorkerResponse};

const ERROR_HISTORY_CAP: usize = 50;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Chart,
    Leaderboard,
    Activity,
    Help,
}

impl Panel {
    pub const COUNT: usize = 4;

    pub fn index(self) -> usize {
        match self {
            Panel::Chart => 0,
            Panel::Leaderboard => 1,
            Panel::Activity => 2,
            Panel::Help => 3,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Chart),
            1 => Some(Panel::Leaderboard),
            2 => Some(Panel::Activity),
            3 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Chart => "Asset Evolution",
            Panel::Leaderboard => "Leaderboard",
            Panel::Activity => "Recent Activity",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Self::ALL[(self.index() + 1) % Self::COUNT]
    }

    pub fn prev(self) -> Panel {
        Self::ALL[(self.index() + Self::COUNT - 1) % Self::COUNT]
    }

    const ALL: [Panel; Self::COUNT] = [Panel::Chart, Panel::Leaderboard, Panel::Activity, Panel::Help];
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Data,
    Export,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Config => "CFG",
            ErrorCategory::Data => "DATA",
            ErrorCategory::Export => "EXP",
            ErrorCategory::Other => "ERR",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    None,
    /// Blocking notice; the dashboard cannot be shown.
    Alert(String),
    Reasoning {
        title: String,
        text: String,
        scroll: u16,
    },
    ErrorHistory,
}

/// Load in flight: agents settled so far out of the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadProgress {
    pub done: usize,
    pub total: usize,
}

pub struct App {
    pub running: bool,
    pub active_panel: Panel,
    pub overlay: Overlay,
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,

    pub data: Option<DashboardData>,
    pub styles: Vec<SeriesStyle>,
    pub loading: Option<LoadProgress>,

    pub scale: ScaleMode,
    /// Scale chosen by the user; survives reloads instead of the
    /// configured default.
    pub scale_pinned: bool,
    /// Dropped and rebuilt on scale or width change.
    pub chart: Option<ChartModel>,
    pub chart_width: u16,
    /// Set by the chart panel each frame.
    pub chart_geometry: std::cell::Cell<Option<ChartGeometry>>,
    pub cursor: Option<usize>,
    resize: Debouncer<u16>,

    pub leaderboard_scroll: usize,
    pub activity_selected: usize,
    pub help_scroll: u16,

    pub export_dir: PathBuf,
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,
}

impl App {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        export_dir: PathBuf,
        chart_width: u16,
    ) -> Self {
        Self {
            running: true,
            active_panel: Panel::Chart,
            overlay: Overlay::None,
            status_message: None,
            error_history: VecDeque::new(),
            error_scroll: 0,
            data: None,
            styles: Vec::new(),
            loading: None,
            scale: ScaleMode::default(),
            scale_pinned: false,
            chart: None,
            chart_width,
            chart_geometry: std::cell::Cell::new(None),
            cursor: None,
            resize: Debouncer::new(RESIZE_DEBOUNCE),
            leaderboard_scroll: 0,
            activity_selected: 0,
            help_scroll: 0,
            export_dir,
            worker_tx,
            worker_rx,
        }
    }

    /// Ask the worker for a fresh load.
    pub fn request_load(&mut self) {
        if self.loading.is_some() {
            return;
        }
        if self.worker_tx.send(WorkerCommand::Load).is_ok() {
            self.loading = Some(LoadProgress::default());
            self.set_status("Loading dashboard...");
        } else {
            self.push_error(ErrorCategory::Other, "Worker is not running".into(), "load".into());
        }
    }

    pub fn handle_worker_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::Progress { done, total } => {
                self.loading = Some(LoadProgress { done, total });
            }
            WorkerResponse::Loaded(data) => {
                self.loading = None;
                self.apply_loaded(*data);
            }
            WorkerResponse::LoadFailed(message) => {
                self.loading = None;
                error!(error = %message, "dashboard load failed");
                self.push_error(ErrorCategory::Config, message.clone(), "configuration".into());
                self.overlay = Overlay::Alert(message);
            }
            WorkerResponse::Reasoning { title, text } => {
                // Only fill the overlay that asked for it.
                if let Overlay::Reasoning { title: open, .. } = &self.overlay {
                    if *open == title {
                        self.overlay = Overlay::Reasoning {
                            title,
                            text,
                            scroll: 0,
                        };
                    }
                }
            }
        }
    }

    pub fn apply_loaded(&mut self, data: DashboardData) {
        if !self.scale_pinned {
            self.scale = data.config.chart().default_scale;
        }
        for failed in data.series.failed() {
            if let Some(err) = &failed.error {
                self.push_error(ErrorCategory::Data, err.clone(), failed.series.name.clone());
            }
        }
        let failed = data.series.failed().count();

        self.styles = SeriesStyle::for_data(&data);
        self.cursor = (!data.merged.is_empty()).then(|| data.merged.len() - 1);
        self.activity_selected = 0;
        self.leaderboard_scroll = 0;
        let summary = format!(
            "Loaded {} series, {} timestamps, {} trades",
            data.merged.agent_count(),
            data.merged.len(),
            data.feed.len()
        );
        self.data = Some(data);
        self.rebuild_chart();

        if failed > 0 {
            self.set_warning(format!("{summary} ({failed} series failed, see errors)"));
        } else {
            self.set_status(summary);
        }
    }

    /// Tear down the chart model and build a new one from current state.
    pub fn rebuild_chart(&mut self) {
        self.chart = None;
        if let Some(data) = &self.data {
            self.chart = Some(ChartModel::build(
                &data.merged,
                &self.styles,
                &data.config.chart(),
                self.scale,
                self.chart_width,
            ));
        }
    }

    pub fn toggle_scale(&mut self) {
        self.scale = self.scale.toggled();
        self.scale_pinned = true;
        info!(scale = %self.scale, "scale toggled");
        self.rebuild_chart();
        self.set_status(format!("{} applied", self.scale.label()));
    }

    /// Record a terminal resize; the chart follows once resizing settles.
    pub fn on_resize(&mut self, width: u16, now: Instant) {
        self.resize.trigger(width, now);
    }

    /// Per-frame housekeeping.
    pub fn tick(&mut self, now: Instant) {
        if let Some(width) = self.resize.poll(now) {
            if width != self.chart_width {
                self.chart_width = width;
                self.rebuild_chart();
            }
        }
    }

    pub fn resize_pending(&self) -> bool {
        self.resize.is_pending()
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let Some(len) = self.data.as_ref().map(|d| d.merged.len()).filter(|l| *l > 0) else {
            return;
        };
        let current = self.cursor.unwrap_or(len - 1) as isize;
        self.cursor = Some((current + delta).clamp(0, len as isize - 1) as usize);
    }

    /// Move the cursor to whatever is under a mouse position on the chart.
    pub fn hover(&mut self, column: u16, row: u16) {
        let Some(geometry) = self.chart_geometry.get() else {
            return;
        };
        if geometry.contains(column, row) {
            if let Some(index) = geometry.column_to_index(column) {
                self.cursor = Some(index);
            }
        }
    }

    pub fn tooltip(&self) -> Option<Tooltip> {
        let data = self.data.as_ref()?;
        Tooltip::at(&data.merged, self.cursor?, &data.config.ui().date_formats)
    }

    pub fn recent_trades(&self) -> &[Transaction] {
        self.data.as_ref().map_or(&[], |d| d.recent_trades())
    }

    pub fn selected_trade(&self) -> Option<&Transaction> {
        self.recent_trades().get(self.activity_selected)
    }

    pub fn scroll_down(&mut self) {
        match self.active_panel {
            Panel::Chart => {}
            Panel::Leaderboard => {
                let len = self.data.as_ref().map_or(0, |d| d.leaderboard.len());
                if self.leaderboard_scroll + 1 < len {
                    self.leaderboard_scroll += 1;
                }
            }
            Panel::Activity => {
                if self.activity_selected + 1 < self.recent_trades().len() {
                    self.activity_selected += 1;
                }
            }
            Panel::Help => self.help_scroll = self.help_scroll.saturating_add(1),
        }
    }

    pub fn scroll_up(&mut self) {
        match self.active_panel {
            Panel::Chart => {}
            Panel::Leaderboard => self.leaderboard_scroll = self.leaderboard_scroll.saturating_sub(1),
            Panel::Activity => self.activity_selected = self.activity_selected.saturating_sub(1),
            Panel::Help => self.help_scroll = self.help_scroll.saturating_sub(1),
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.leaderboard_scroll = 0;
        self.activity_selected = 0;
        self.help_scroll = 0;
        self.active_panel = Panel::Chart;
    }

    /// Open the reasoning overlay for the selected trade and ask the worker
    /// to fill it.
    pub fn open_reasoning(&mut self) {
        let Some(trade) = self.selected_trade().cloned() else {
            return;
        };
        let name = self
            .data
            .as_ref()
            .map(|d| d.config.display_name(&trade.agent).to_string())
            .unwrap_or_else(|| trade.agent.clone());
        let title = format!(
            "{name}: {} {} {}",
            trade.action.label(),
            trade.amount,
            trade.symbol
        );
        let cmd = WorkerCommand::Reasoning {
            agent: trade.agent.clone(),
            date: trade.date.clone(),
            title: title.clone(),
        };
        if self.worker_tx.send(cmd).is_err() {
            self.push_error(ErrorCategory::Other, "Worker is not running".into(), "reasoning".into());
            return;
        }
        self.overlay = Overlay::Reasoning {
            title,
            text: "Loading reasoning...".into(),
            scroll: 0,
        };
    }

    /// Write the merged table as CSV into the export directory.
    pub fn export(&mut self) {
        let Some(data) = &self.data else {
            self.set_warning("Nothing to export yet");
            return;
        };
        match write_export(&data.merged, &self.export_dir) {
            Ok(path) => {
                info!(path = %path.display(), "exported asset evolution");
                self.set_status(format!("Exported {}", path.display()));
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "export failed");
                self.push_error(
                    ErrorCategory::Export,
                    format!("{e:#}"),
                    self.export_dir.display().to_string(),
                );
            }
        }
    }

    /// Push an error to history (capped) and show it in the status bar.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}
