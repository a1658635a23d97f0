//! UI preferences saved across restarts as JSON.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use agentboard_core::config::ScaleMode;

use crate::app::{App, Panel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub active_panel: Panel,
    /// Scale the user last picked; `None` follows the configured default.
    pub scale: Option<ScaleMode>,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            active_panel: Panel::Chart,
            scale: None,
        }
    }
}

/// Returns defaults if the file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => PersistedState::default(),
    }
}

/// Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn extract(app: &App) -> PersistedState {
    PersistedState {
        active_panel: app.active_panel,
        scale: app.scale_pinned.then_some(app.scale),
    }
}

pub fn apply(app: &mut App, state: PersistedState) {
    app.active_panel = state.active_panel;
    if let Some(scale) = state.scale {
        app.scale = scale;
        app.scale_pinned = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;

    #[test]
    fn roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let state = PersistedState {
            active_panel: Panel::Activity,
            scale: Some(ScaleMode::Log),
        };
        save(&path, &state).unwrap();
        assert_eq!(load(&path), state);
    }

    #[test]
    fn missing_or_corrupt_file_returns_defaults() {
        assert_eq!(load(Path::new("/nonexistent/path/state.json")), PersistedState::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(load(&path), PersistedState::default());
    }

    #[test]
    fn unpinned_scale_is_not_saved() {
        let (mut app, _rx) = test_app();
        assert_eq!(extract(&app).scale, None);

        apply(
            &mut app,
            PersistedState {
                active_panel: Panel::Help,
                scale: Some(ScaleMode::Log),
            },
        );
        assert_eq!(app.active_panel, Panel::Help);
        assert!(app.scale_pinned);
        assert_eq!(extract(&app).scale, Some(ScaleMode::Log));
    }
}
