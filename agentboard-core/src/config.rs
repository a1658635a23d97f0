//! Dashboard configuration document.
//!
//! A TOML file listing the tracked agents, the benchmark, where the data
//! lives, and chart/UI defaults. Every section except `agents` is optional;
//! absent sections and fields fall back to built-in defaults.
//!
//! ```toml
//! [[agents]]
//! folder = "gpt-5"
//! display_name = "GPT-5"
//! icon = "./figs/openai.svg"
//! color = "#10a37f"
//! enabled = true
//!
//! [benchmark]
//! folder = "QQQ"
//! display_name = "QQQ Invesco"
//! icon = "./figs/stock.svg"
//! color = "#ff6b00"
//! enabled = true
//!
//! [data]
//! base_path = "./data"
//! price_file_prefix = "daily_prices_"
//! benchmark_file = "Adaily_prices_QQQ.json"
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Icon used when an agent id is unknown.
pub const DEFAULT_ICON: &str = "./figs/stock.svg";

/// Errors from loading or validating the configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config document: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One tracked agent (or the benchmark).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Agent id; also the name of its data directory.
    pub folder: String,
    pub display_name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Where agent value histories come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistorySource {
    /// Rebuild values from the position log and the per-symbol price files.
    #[default]
    Positions,
    /// Read `agent_data/{folder}/asset_history.json` directly.
    Precomputed,
}

/// Data path conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub base_path: String,
    pub price_file_prefix: String,
    pub benchmark_file: String,
    pub history_source: HistorySource,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base_path: "./data".into(),
            price_file_prefix: "daily_prices_".into(),
            benchmark_file: "Adaily_prices_QQQ.json".into(),
            history_source: HistorySource::Positions,
        }
    }
}

/// Value-axis scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    #[default]
    Linear,
    #[serde(alias = "logarithmic")]
    Log,
}

impl ScaleMode {
    pub fn toggled(self) -> Self {
        match self {
            ScaleMode::Linear => ScaleMode::Log,
            ScaleMode::Log => ScaleMode::Linear,
        }
    }

    /// Button-style label reflecting the current state.
    pub fn label(self) -> &'static str {
        match self {
            ScaleMode::Linear => "Linear Scale",
            ScaleMode::Log => "Log Scale",
        }
    }
}

impl fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Chart defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub default_scale: ScaleMode,
    pub max_ticks: usize,
    pub point_radius: u16,
    pub point_hover_radius: u16,
    pub border_width: u16,
    /// Curve smoothing strength in `[0, 1]`; 0 draws straight segments.
    pub tension: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            default_scale: ScaleMode::Linear,
            max_ticks: 15,
            point_radius: 0,
            point_hover_radius: 7,
            border_width: 3,
            tension: 0.42,
        }
    }
}

/// strftime patterns for timestamp display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateFormats {
    pub hourly: String,
    pub daily: String,
}

impl Default for DateFormats {
    fn default() -> Self {
        Self {
            hourly: "%m/%d %H:%M".into(),
            daily: "%Y-%m-%d".into(),
        }
    }
}

/// UI defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Starting portfolio value, used when an agent has no history.
    pub initial_value: f64,
    pub max_recent_trades: usize,
    pub date_formats: DateFormats,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            initial_value: 10_000.0,
            max_recent_trades: 20,
            date_formats: DateFormats::default(),
        }
    }
}

/// The parsed configuration document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub agents: Vec<AgentDescriptor>,
    #[serde(default)]
    pub benchmark: Option<AgentDescriptor>,
    #[serde(default)]
    pub data: Option<DataConfig>,
    #[serde(default)]
    pub chart: Option<ChartConfig>,
    #[serde(default)]
    pub ui: Option<UiConfig>,
}

impl DashboardConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DashboardConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject documents that would produce ambiguous or broken dashboards.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for agent in self.agents.iter().chain(self.benchmark.iter()) {
            if agent.folder.trim().is_empty() {
                return Err(ConfigError::Invalid("agent folder must not be empty".into()));
            }
            if !seen.insert(agent.folder.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate agent folder '{}'",
                    agent.folder
                )));
            }
            if let Some(color) = &agent.color {
                if parse_hex_color(color).is_none() {
                    return Err(ConfigError::Invalid(format!(
                        "agent '{}' has malformed color '{color}' (expected #rrggbb)",
                        agent.folder
                    )));
                }
            }
        }
        let ui = self.ui();
        if !(ui.initial_value.is_finite() && ui.initial_value > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "ui.initial_value must be positive, got {}",
                ui.initial_value
            )));
        }
        for (name, pattern) in [
            ("hourly", &ui.date_formats.hourly),
            ("daily", &ui.date_formats.daily),
        ] {
            if !is_valid_strftime(pattern) {
                return Err(ConfigError::Invalid(format!(
                    "ui.date_formats.{name} is not a valid strftime pattern: '{pattern}'"
                )));
            }
        }
        Ok(())
    }

    /// Enabled agents in document order. Excludes the benchmark.
    pub fn enabled_agents(&self) -> Vec<&AgentDescriptor> {
        self.agents.iter().filter(|a| a.enabled).collect()
    }

    /// Folder ids of the enabled agents.
    pub fn agent_folders(&self) -> Vec<&str> {
        self.enabled_agents().into_iter().map(|a| a.folder.as_str()).collect()
    }

    /// All agents, including disabled ones. Excludes the benchmark.
    pub fn all_agents(&self) -> &[AgentDescriptor] {
        &self.agents
    }

    /// Look up an agent (or the benchmark) by folder id.
    pub fn agent(&self, folder: &str) -> Option<&AgentDescriptor> {
        self.agents
            .iter()
            .chain(self.benchmark.iter())
            .find(|a| a.folder == folder)
    }

    pub fn is_agent_enabled(&self, folder: &str) -> bool {
        self.agent(folder).is_some_and(|a| a.enabled)
    }

    /// Display name, falling back to the folder id.
    pub fn display_name<'a>(&'a self, folder: &'a str) -> &'a str {
        self.agent(folder).map_or(folder, |a| a.display_name.as_str())
    }

    /// Icon path, falling back to [`DEFAULT_ICON`].
    pub fn icon<'a>(&'a self, folder: &str) -> &'a str {
        self.agent(folder).map_or(DEFAULT_ICON, |a| a.icon.as_str())
    }

    /// Brand color, if configured.
    pub fn color(&self, folder: &str) -> Option<&str> {
        self.agent(folder).and_then(|a| a.color.as_deref())
    }

    pub fn benchmark(&self) -> Option<&AgentDescriptor> {
        self.benchmark.as_ref()
    }

    /// The benchmark, if configured and enabled.
    pub fn enabled_benchmark(&self) -> Option<&AgentDescriptor> {
        self.benchmark.as_ref().filter(|b| b.enabled)
    }

    pub fn is_benchmark(&self, folder: &str) -> bool {
        self.benchmark.as_ref().is_some_and(|b| b.folder == folder)
    }

    pub fn data(&self) -> DataConfig {
        self.data.clone().unwrap_or_default()
    }

    pub fn chart(&self) -> ChartConfig {
        self.chart.clone().unwrap_or_default()
    }

    pub fn ui(&self) -> UiConfig {
        self.ui.clone().unwrap_or_default()
    }
}

/// Whether chrono can render with `pattern` without a format error.
pub fn is_valid_strftime(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// Parse `#rrggbb` into RGB components.
pub fn parse_hex_color(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
[[agents]]
folder = "gpt-5"
display_name = "GPT-5"
icon = "./figs/openai.svg"
color = "#10a37f"
enabled = true

[[agents]]
folder = "claude"
display_name = "Claude"
icon = "./figs/claude.svg"
enabled = false

[[agents]]
folder = "qwen"
display_name = "Qwen"

[benchmark]
folder = "QQQ"
display_name = "QQQ Invesco"
color = "#ff6b00"

[ui]
initial_value = 5000.0
"##;

    #[test]
    fn parses_sample_document() {
        let config = DashboardConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.all_agents().len(), 3);
        assert_eq!(config.agent_folders(), ["gpt-5", "qwen"]);
        assert!(!config.is_agent_enabled("claude"));
        assert!(config.is_benchmark("QQQ"));
    }

    #[test]
    fn accessor_fallbacks_for_unknown_agent() {
        let config = DashboardConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.display_name("nobody"), "nobody");
        assert_eq!(config.icon("nobody"), DEFAULT_ICON);
        assert_eq!(config.color("nobody"), None);
        assert_eq!(config.icon("qwen"), DEFAULT_ICON);
        assert_eq!(config.color("gpt-5"), Some("#10a37f"));
        assert_eq!(config.display_name("QQQ"), "QQQ Invesco");
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = DashboardConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.data(), DataConfig::default());
        assert_eq!(config.chart().max_ticks, 15);
        assert_eq!(config.chart().tension, 0.42);
        // Partially specified section keeps defaults for missing fields.
        assert_eq!(config.ui().initial_value, 5000.0);
        assert_eq!(config.ui().max_recent_trades, 20);
        assert_eq!(config.ui().date_formats.daily, "%Y-%m-%d");
    }

    #[test]
    fn empty_document_is_valid() {
        let config = DashboardConfig::from_toml_str("").unwrap();
        assert!(config.enabled_agents().is_empty());
        assert!(config.benchmark().is_none());
        assert_eq!(config.ui().initial_value, 10_000.0);
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = DashboardConfig::from_toml_str("[[agents]\nfolder = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn duplicate_folder_rejected() {
        let doc = r#"
[[agents]]
folder = "a"
display_name = "A"

[benchmark]
folder = "a"
display_name = "A again"
"#;
        let err = DashboardConfig::from_toml_str(doc).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn bad_color_rejected() {
        let doc = r#"
[[agents]]
folder = "a"
display_name = "A"
color = "teal"
"#;
        assert!(matches!(
            DashboardConfig::from_toml_str(doc),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn scale_mode_parsing_and_toggle() {
        let doc = "[chart]\ndefault_scale = \"logarithmic\"\n";
        let config = DashboardConfig::from_toml_str(doc).unwrap();
        assert_eq!(config.chart().default_scale, ScaleMode::Log);
        assert_eq!(ScaleMode::Log.toggled(), ScaleMode::Linear);
        assert_eq!(ScaleMode::Linear.label(), "Linear Scale");
    }

    #[test]
    fn bad_date_format_rejected() {
        let err = DashboardConfig::from_toml_str("[ui.date_formats]\ndaily = \"%Q\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("daily"));
        assert!(is_valid_strftime("%b %-d, %H:%M"));
    }

    #[test]
    fn hex_color_parsing() {
        assert_eq!(parse_hex_color("#ff6b00"), Some((255, 107, 0)));
        assert_eq!(parse_hex_color("ff6b00"), None);
        assert_eq!(parse_hex_color("#ff6b0"), None);
    }
}
