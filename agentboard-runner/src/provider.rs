//! Session-scoped configuration provider.
//!
//! The configuration document is read at most once per session. Every
//! consumer gets the same `Arc<DashboardConfig>`. A failed read is handed
//! back to the caller and nothing is cached, so the next caller reads again.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{error, info};

use agentboard_core::config::{ConfigError, DashboardConfig};

/// Where the document comes from.
#[derive(Debug, Clone)]
pub enum ConfigOrigin {
    File(PathBuf),
    /// TOML text already in memory.
    Inline(String),
}

#[derive(Debug)]
pub struct ConfigProvider {
    origin: ConfigOrigin,
    cell: Mutex<Option<Arc<DashboardConfig>>>,
}

impl ConfigProvider {
    pub fn new(origin: ConfigOrigin) -> Self {
        Self {
            origin,
            cell: Mutex::new(None),
        }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::new(ConfigOrigin::File(path.into()))
    }

    pub fn inline(toml: impl Into<String>) -> Self {
        Self::new(ConfigOrigin::Inline(toml.into()))
    }

    /// A provider that already holds a parsed document.
    pub fn preloaded(config: DashboardConfig) -> Self {
        Self {
            origin: ConfigOrigin::Inline(String::new()),
            cell: Mutex::new(Some(Arc::new(config))),
        }
    }

    pub fn origin(&self) -> &ConfigOrigin {
        &self.origin
    }

    /// The session's configuration, loading it on first use.
    ///
    /// Concurrent first calls wait on the same lock, so the document is
    /// parsed once.
    pub fn get(&self) -> Result<Arc<DashboardConfig>, ConfigError> {
        let mut slot = self.cell.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(config) = slot.as_ref() {
            return Ok(Arc::clone(config));
        }

        let loaded = match &self.origin {
            ConfigOrigin::File(path) => DashboardConfig::from_file(path),
            ConfigOrigin::Inline(text) => DashboardConfig::from_toml_str(text),
        };
        match loaded {
            Ok(config) => {
                info!(
                    agents = config.enabled_agents().len(),
                    benchmark = config.enabled_benchmark().is_some(),
                    "configuration loaded"
                );
                let config = Arc::new(config);
                *slot = Some(Arc::clone(&config));
                Ok(config)
            }
            Err(e) => {
                error!(error = %e, "configuration load failed");
                Err(e)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
