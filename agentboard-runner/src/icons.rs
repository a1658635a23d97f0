//! Icon cache.
//!
//! Icons are identified by their configured path. The first request for a
//! path fetches it; concurrent requests for the same path block on the same
//! cell and share the result. Failures are cached too, so a broken icon is
//! fetched (and warned about) once per session.
//!
//! A terminal cannot draw the image itself, so an [`Icon`] carries a short
//! glyph: the file's own text when it is a tiny text icon (an emoji or a
//! couple of letters), otherwise the capitalized first letter of the file
//! stem.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::{debug, warn};

use agentboard_core::source::DataSource;

const MAX_TEXT_GLYPH_CHARS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub path: String,
    pub glyph: String,
    pub byte_len: usize,
}

impl Icon {
    /// Derive the display glyph from the fetched bytes.
    pub fn from_bytes(path: &str, bytes: &[u8]) -> Self {
        let text_glyph = std::str::from_utf8(bytes)
            .ok()
            .map(str::trim)
            .filter(|t| !t.is_empty() && !t.starts_with('<'))
            .filter(|t| t.chars().count() <= MAX_TEXT_GLYPH_CHARS)
            .map(str::to_string);

        let glyph = text_glyph.unwrap_or_else(|| {
            Path::new(path)
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.chars().find(|c| c.is_alphanumeric()))
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_else(|| "?".to_string())
        });

        Self {
            path: path.to_string(),
            glyph,
            byte_len: bytes.len(),
        }
    }
}

type IconCell = Arc<OnceLock<Option<Arc<Icon>>>>;

pub struct IconCache {
    source: Arc<dyn DataSource>,
    cells: Mutex<HashMap<String, IconCell>>,
}

impl IconCache {
    /// `source` resolves icon paths (typically the directory holding the
    /// configuration document).
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// The icon at `path`, or `None` when it could not be fetched.
    pub fn load(&self, path: &str) -> Option<Arc<Icon>> {
        let cell = {
            let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cells.entry(path.to_string()).or_default())
        };
        cell.get_or_init(|| match self.source.fetch_bytes(path) {
            Ok(bytes) => {
                debug!(path, bytes = bytes.len(), "icon loaded");
                Some(Arc::new(Icon::from_bytes(path, &bytes)))
            }
            Err(e) => {
                warn!(path, error = %e, "icon unavailable, badge drawn without glyph");
                None
            }
        })
        .clone()
    }

    /// Number of distinct paths requested so far.
    pub fn len(&self) -> usize {
        self.cells.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
