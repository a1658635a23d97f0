//! Agent reasoning lookup for a trade.
//!
//! Each trading session writes `agent_data/{folder}/log/{session}/log.jsonl`
//! where every line holds the messages the agent exchanged in one step.
//! The reasoning shown for a trade is the last assistant message of that
//! session.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::domain::Timestamp;
use crate::source::DataSource;

pub const NO_REASONING: &str = "No reasoning available.";
pub const REASONING_UNAVAILABLE: &str = "Reasoning not available.";

const FINISH_SIGNAL: &str = "<FINISH_SIGNAL>";

/// Session directory name for a trade date.
///
/// Daily dates are used verbatim. Intraday `2025-10-01 15:00:00` becomes
/// `2025-10-01_150000`.
pub fn log_dir_name(date: &Timestamp) -> String {
    let raw = date.as_str().trim();
    match raw.split_once([' ', 'T']) {
        Some((day, time)) => format!("{day}_{}", time.replace(':', "")),
        None => raw.to_string(),
    }
}

pub fn reasoning_log_path(folder: &str, date: &Timestamp) -> String {
    format!("agent_data/{folder}/log/{}/log.jsonl", log_dir_name(date))
}

#[derive(Debug, Deserialize)]
struct LogLine {
    #[serde(default)]
    new_messages: Vec<LogMessage>,
}

#[derive(Debug, Deserialize)]
struct LogMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: Value,
}

/// The last assistant message in a session log, cleaned of finish markers.
///
/// Scans from the end. Lines that fail to decode are skipped.
pub fn extract_reasoning(text: &str) -> Option<String> {
    text.lines()
        .rev()
        .filter(|line| !line.trim().is_empty())
        .find_map(|line| {
            let parsed: LogLine = match serde_json::from_str(line) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(error = %e, "skipping malformed reasoning log line");
                    return None;
                }
            };
            parsed
                .new_messages
                .into_iter()
                .find(|m| m.role == "assistant")
                .map(|m| clean(&m.content))
        })
}

fn clean(content: &Value) -> String {
    let text = match content {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    text.replace(FINISH_SIGNAL, "").trim().to_string()
}

/// Reasoning text for one trade. Never fails: a missing log yields
/// [`REASONING_UNAVAILABLE`] and a log without an assistant message
/// yields [`NO_REASONING`].
pub fn load_reasoning(source: &dyn DataSource, folder: &str, date: &Timestamp) -> String {
    let path = reasoning_log_path(folder, date);
    match source.fetch_text(&path) {
        Ok(text) => extract_reasoning(&text).unwrap_or_else(|| NO_REASONING.to_string()),
        Err(e) => {
            warn!(agent = folder, date = %date, error = %e, "reasoning log unavailable");
            REASONING_UNAVAILABLE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    #[test]
    fn log_dir_names() {
        assert_eq!(log_dir_name(&"2025-10-01 15:00:00".into()), "2025-10-01_150000");
        assert_eq!(log_dir_name(&"2025-10-01T09:30:00".into()), "2025-10-01_093000");
        assert_eq!(log_dir_name(&"2025-10-01".into()), "2025-10-01");
    }

    #[test]
    fn last_assistant_message_wins() {
        let log = r#"{"new_messages":[{"role":"assistant","content":"first"}]}
{"new_messages":[{"role":"user","content":"go"},{"role":"assistant","content":"Buy NVDA <FINISH_SIGNAL>"}]}
{"new_messages":[{"role":"tool","content":"ok"}]}
"#;
        assert_eq!(extract_reasoning(log).as_deref(), Some("Buy NVDA"));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let log = "{\"new_messages\":[{\"role\":\"assistant\",\"content\":\"hold\"}]}\n{broken\n";
        assert_eq!(extract_reasoning(log).as_deref(), Some("hold"));
    }

    #[test]
    fn sentinels() {
        let source = MemorySource::new().with(
            "agent_data/a/log/2025-10-01/log.jsonl",
            r#"{"new_messages":[{"role":"user","content":"hi"}]}"#,
        );
        assert_eq!(load_reasoning(&source, "a", &"2025-10-01".into()), NO_REASONING);
        assert_eq!(
            load_reasoning(&source, "a", &"2025-10-02".into()),
            REASONING_UNAVAILABLE
        );
    }
}
