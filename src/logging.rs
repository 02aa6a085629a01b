use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

/// Route `log` diagnostics to stderr. `0` is warnings only.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    // A second init (tests, embedding) keeps the first logger.
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Never);
}

/// Append-only JSON-lines trail of guard decisions.
///
/// Each event is one line written with a single `write_all` on a file
/// opened in append mode, so concurrent hook processes never interleave
/// partial records. Write failures are reported through `log` and never
/// affect the decision.
#[derive(Debug, Default)]
pub struct DebugLog {
    file: Option<File>,
}

impl DebugLog {
    /// A sink that drops every event.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Open (creating parent directories) for appending.
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file: Some(file) })
    }

    /// Open, or fall back to a disabled sink with a warning.
    pub fn open_or_disabled(path: &Path) -> Self {
        Self::open(path).unwrap_or_else(|e| {
            log::warn!("debug log {} unavailable: {e}", path.display());
            Self::disabled()
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    /// Append one event. `fields` must be a JSON object; other values are
    /// stored under `data`.
    pub fn event(&self, event: &str, fields: Value) {
        let Some(mut file) = self.file.as_ref() else {
            return;
        };
        let line = render(event, fields);
        if let Err(e) = file.write_all(line.as_bytes()) {
            log::warn!("debug log write failed: {e}");
        }
    }
}

fn render(event: &str, fields: Value) -> String {
    let mut record = Map::new();
    record.insert("timestamp".into(), Value::String(timestamp_now()));
    record.insert("event".into(), Value::String(event.into()));
    match fields {
        Value::Object(map) => record.extend(map),
        Value::Null => {}
        other => {
            record.insert("data".into(), other);
        }
    }
    let mut line = Value::Object(record).to_string();
    line.push('\n');
    line
}

/// UTC RFC 3339 timestamp with nanoseconds.
fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn disabled_log_ignores_events() {
        let log = DebugLog::disabled();
        assert!(!log.is_enabled());
        log.event("start", json!({"tool_name": "Bash"}));
    }

    #[test]
    fn events_are_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/debug.jsonl");
        let log = DebugLog::open(&path).unwrap();
        log.event("start", json!({"tool_name": "Bash"}));
        log.event("result", json!({"decision": "allow"}));

        let content = std::fs::read_to_string(&path).unwrap();
        let records: Vec<Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["event"], "start");
        assert_eq!(records[0]["tool_name"], "Bash");
        assert_eq!(records[1]["decision"], "allow");
    }

    #[test]
    fn appends_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.jsonl");
        DebugLog::open(&path).unwrap().event("start", Value::Null);
        DebugLog::open(&path).unwrap().event("start", Value::Null);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn timestamp_has_nanoseconds() {
        let ts = timestamp_now();
        assert!(ts.ends_with('Z'));
        let fraction = ts.rsplit_once('.').unwrap().1.trim_end_matches('Z');
        assert_eq!(fraction.len(), 9);
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn non_object_fields_nested() {
        let line = render("check", json!(true));
        let record: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(record["data"], true);
    }
}
