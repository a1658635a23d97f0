//! Background worker thread. Dashboard loads and reasoning lookups run
//! here so the UI keeps drawing.
//!
//! Communication with the main thread is via `mpsc` channels.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use agentboard_core::domain::Timestamp;
use agentboard_runner::{DashboardData, DashboardSession, LoadProgress};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Load,
    Reasoning {
        agent: String,
        date: Timestamp,
        /// Echoed back so the UI can match the reply to its overlay.
        title: String,
    },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    Progress { done: usize, total: usize },
    Loaded(Box<DashboardData>),
    /// The configuration could not be loaded; nothing to show.
    LoadFailed(String),
    Reasoning { title: String, text: String },
}

/// Forwards per-agent completion to the UI.
struct ChannelProgress {
    tx: Mutex<Sender<WorkerResponse>>,
    done: AtomicUsize,
    total: usize,
}

impl LoadProgress for ChannelProgress {
    fn on_agent_loaded(&self, agent: &str, ok: bool) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(agent, ok, done, total = self.total, "agent settled");
        if let Ok(tx) = self.tx.lock() {
            let _ = tx.send(WorkerResponse::Progress {
                done,
                total: self.total,
            });
        }
    }
}

pub fn spawn_worker(
    session: DashboardSession,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("agentboard-worker".into())
        .spawn(move || worker_loop(session, rx, tx))
}

fn worker_loop(session: DashboardSession, rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(cmd) => {
                if handle_command(&session, cmd, &tx).is_err() {
                    // UI side hung up.
                    break;
                }
            }
        }
    }
    info!("worker stopped");
}

fn handle_command(
    session: &DashboardSession,
    cmd: WorkerCommand,
    tx: &Sender<WorkerResponse>,
) -> Result<(), std::sync::mpsc::SendError<WorkerResponse>> {
    match cmd {
        WorkerCommand::Load => {
            let total = session
                .config()
                .map(|c| c.enabled_agents().len() + usize::from(c.enabled_benchmark().is_some()))
                .unwrap_or(0);
            let progress = ChannelProgress {
                tx: Mutex::new(tx.clone()),
                done: AtomicUsize::new(0),
                total,
            };
            match session.load_with_progress(&progress) {
                Ok(data) => tx.send(WorkerResponse::Loaded(Box::new(data))),
                Err(e) => tx.send(WorkerResponse::LoadFailed(e.to_string())),
            }
        }
        WorkerCommand::Reasoning { agent, date, title } => {
            let text = session.reasoning(&agent, &date);
            tx.send(WorkerResponse::Reasoning { title, text })
        }
        WorkerCommand::Shutdown => Ok(()),
    }
}
