//! Hook invocation input and command-text extraction.

use serde::Deserialize;
use serde_json::Value;

/// Tool name assumed when the hook input names none.
pub const DEFAULT_TOOL: &str = "Bash";

/// One PreToolUse invocation as read from stdin.
#[derive(Debug, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Option<Value>,
}

impl HookInput {
    /// Parse stdin. Malformed JSON yields an empty input, which always allows.
    pub fn parse(stdin: &str) -> Self {
        if stdin.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str(stdin) {
            Ok(input) => input,
            Err(e) => {
                log::warn!("ignoring malformed hook input: {e}");
                Self::default()
            }
        }
    }

    /// The tool being invoked, defaulting to `Bash`.
    pub fn tool_name(&self) -> &str {
        match self.tool_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_TOOL,
        }
    }

    /// `tool_input` as compact JSON text, or empty when absent or null.
    pub fn raw_input(&self) -> String {
        match &self.tool_input {
            None | Some(Value::Null) => String::new(),
            Some(value) => value.to_string(),
        }
    }
}

/// The `command` string inside a `tool_input` JSON text, if there is one.
pub fn command_field(raw_input: &str) -> Option<String> {
    let value: Value = serde_json::from_str(raw_input).ok()?;
    value.get("command")?.as_str().map(String::from)
}

/// Command text of a `tool_input`; empty when it has none.
pub fn command_text(raw_input: &str) -> String {
    command_field(raw_input).unwrap_or_default()
}

/// A `tool_input` holding just this command, used to re-check one segment.
pub fn synthetic_input(command: &str) -> String {
    serde_json::json!({ "command": command }).to_string()
}
