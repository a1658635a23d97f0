//! Data sources: where the dashboard's JSON and JSONL resources come from.
//!
//! Every resource is addressed by a path relative to the data root
//! (`agent_data/gpt-5/position/position.jsonl`, `daily_prices_NVDA.json`).
//! The loaders never know whether the root is a directory or a URL.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

/// Errors from fetching a resource.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("network unreachable: {0}")]
    Network(String),

    #[error("HTTP {status} for {path}")]
    Http { status: u16, path: String },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("resource {0} is not valid UTF-8")]
    Encoding(String),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}

/// A root that resources can be fetched from.
pub trait DataSource: Send + Sync {
    /// Human-readable description of the root (directory or URL).
    fn describe(&self) -> String;

    /// Fetch raw bytes of a resource.
    fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, FetchError>;

    /// Fetch a resource as UTF-8 text.
    fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let bytes = self.fetch_bytes(path)?;
        String::from_utf8(bytes).map_err(|_| FetchError::Encoding(path.to_string()))
    }
}

/// Resources under a local directory.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let trimmed = path.trim_start_matches("./").trim_start_matches('/');
        self.root.join(trimmed)
    }
}

impl DataSource for LocalSource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let full = self.resolve(path);
        debug!(path = %full.display(), "reading local resource");
        std::fs::read(&full).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound(path.to_string())
            } else {
                FetchError::Io {
                    path: path.to_string(),
                    source,
                }
            }
        })
    }
}

/// Resources served over HTTP under a base URL.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("agentboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { client, base_url })
    }

    fn url_for(&self, path: &str) -> String {
        let trimmed = path.trim_start_matches("./").trim_start_matches('/');
        format!("{}/{}", self.base_url, trimmed)
    }
}

impl DataSource for HttpSource {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.url_for(path);
        debug!(%url, "fetching remote resource");
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        resp.bytes()
            .map(|b| b.to_vec())
            .map_err(|e| FetchError::Network(e.to_string()))
    }
}

/// In-memory resources keyed by relative path. Used for fixtures and demos.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn with(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }
}

impl DataSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory ({} resources)", self.files.len())
    }

    fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let key = path.trim_start_matches("./");
        self.files
            .get(key)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_source_reads_and_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("agent_data/a")).unwrap();
        std::fs::write(dir.path().join("agent_data/a/x.json"), "[1,2]").unwrap();

        let source = LocalSource::new(dir.path());
        assert_eq!(source.fetch_text("agent_data/a/x.json").unwrap(), "[1,2]");
        assert_eq!(source.fetch_text("./agent_data/a/x.json").unwrap(), "[1,2]");

        let err = source.fetch_text("agent_data/a/missing.json").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn memory_source_lookup() {
        let source = MemorySource::new().with("a.json", "{}");
        assert_eq!(source.fetch_text("a.json").unwrap(), "{}");
        assert!(source.fetch_text("b.json").unwrap_err().is_not_found());
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let source = MemorySource::new().with("bin", vec![0xff, 0xfe]);
        assert!(matches!(
            source.fetch_text("bin"),
            Err(FetchError::Encoding(_))
        ));
    }

    #[test]
    fn http_url_joining() {
        let source = HttpSource::new("https://example.org/data//").unwrap();
        assert_eq!(
            source.url_for("./agent_data/a/p.jsonl"),
            "https://example.org/data/agent_data/a/p.jsonl"
        );
    }
}
