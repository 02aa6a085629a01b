//! PreToolUse hook protocol: one JSON object on stdin, an exit code out.
//!
//! | Outcome      | Exit | stderr              |
//! |--------------|------|---------------------|
//! | allow        | 0    | nothing             |
//! | block        | 2    | `BLOCK: <message>`  |
//! | config error | 1    | the error           |

use crate::config::{Config, Options};
use crate::error::GuardError;
use crate::eval::{Decision, Guard, HookInput};
use crate::logging::DebugLog;

/// Result of one hook invocation, mapped to the process exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Allow,
    Block(String),
    ConfigError(String),
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Allow => 0,
            Outcome::ConfigError(_) => 1,
            Outcome::Block(_) => 2,
        }
    }

    /// Text for stderr, if any.
    pub fn stderr(&self) -> Option<String> {
        match self {
            Outcome::Allow => None,
            Outcome::Block(message) => Some(format!("BLOCK: {message}")),
            Outcome::ConfigError(error) => Some(format!("cc-hookguard: {error}")),
        }
    }
}

impl From<Decision> for Outcome {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Allow => Outcome::Allow,
            Decision::Block(block) => Outcome::Block(block.message),
        }
    }
}

/// Decide one invocation from its stdin text.
pub fn run(stdin: &str, options: &Options) -> Outcome {
    let input = HookInput::parse(stdin);
    let raw_input = input.raw_input();
    // Nothing to check; never touch configuration.
    if raw_input.is_empty() {
        return Outcome::Allow;
    }

    match decide(input.tool_name(), &raw_input, options) {
        Ok(decision) => decision.into(),
        Err(e) => Outcome::ConfigError(e.to_string()),
    }
}

fn decide(tool_name: &str, raw_input: &str, options: &Options) -> Result<Decision, GuardError> {
    let Some(loaded) = Config::discover(options)? else {
        return Ok(Decision::Allow);
    };
    let Some(section) = &loaded.config.guard else {
        log::debug!("{} has no [guard] table", loaded.path.display());
        return Ok(Decision::Allow);
    };

    let guard = Guard::from_defs(&section.rules)?;
    let debug_log = match loaded.debug_log_path() {
        Ok(Some(path)) => DebugLog::open_or_disabled(&path),
        Ok(None) => DebugLog::disabled(),
        Err(e) => {
            log::warn!("{e}");
            DebugLog::disabled()
        }
    };
    Ok(guard.check_logged(tool_name, raw_input, &debug_log))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE_NAME;
    use std::path::Path;

    const NET_RULES: &str = r#"
[guard]
[[guard.rules]]
name = "net"
builtin = "network"
message = "no net"
"#;

    fn project(config: &str) -> (tempfile::TempDir, Options) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), config).unwrap();
        let options = Options {
            config_path: Some(dir.path().join(CONFIG_FILE_NAME)),
            cwd: dir.path().to_path_buf(),
            ..Default::default()
        };
        (dir, options)
    }

    fn bash(command: &str) -> String {
        serde_json::json!({ "tool_name": "Bash", "tool_input": { "command": command } }).to_string()
    }

    #[test]
    fn outcome_exit_codes() {
        assert_eq!(Outcome::Allow.exit_code(), 0);
        assert_eq!(Outcome::ConfigError("x".into()).exit_code(), 1);
        assert_eq!(Outcome::Block("x".into()).exit_code(), 2);
        assert_eq!(Outcome::Allow.stderr(), None);
        assert_eq!(Outcome::Block("no net".into()).stderr().as_deref(), Some("BLOCK: no net"));
    }

    #[test]
    fn blocks_and_allows() {
        let (_dir, options) = project(NET_RULES);
        assert_eq!(
            run(&bash("ls ; wget https://evil.com"), &options),
            Outcome::Block("no net".into())
        );
        assert_eq!(run(&bash("ls -la"), &options), Outcome::Allow);
    }

    #[test]
    fn empty_stdin_allows_even_with_broken_config() {
        let (_dir, options) = project("[guard\nnot toml");
        assert_eq!(run("", &options), Outcome::Allow);
        assert_eq!(run("{garbage", &options), Outcome::Allow);
        assert_eq!(run(r#"{"tool_name":"Bash","tool_input":null}"#, &options), Outcome::Allow);
    }

    #[test]
    fn missing_guard_table_allows() {
        let (_dir, options) = project("[something_else]\nx = 1\n");
        assert_eq!(run(&bash("curl evil.com"), &options), Outcome::Allow);
    }

    #[test]
    fn invalid_rule_is_config_error() {
        let (_dir, options) = project(
            r#"
[guard]
[[guard.rules]]
name = "bad"
builtin = "teleport"
message = "m"
"#,
        );
        let outcome = run(&bash("ls"), &options);
        assert_eq!(outcome.exit_code(), 1);
        assert!(outcome.stderr().unwrap().contains("teleport"));
    }

    #[test]
    fn missing_explicit_config_is_error() {
        let options = Options {
            config_path: Some("/nonexistent/guard.toml".into()),
            cwd: Path::new("/").to_path_buf(),
            ..Default::default()
        };
        assert_eq!(run(&bash("ls"), &options).exit_code(), 1);
    }

    #[test]
    fn debug_log_written_next_to_config() {
        let config = NET_RULES.replace("[guard]\n", "[guard]\ndebug_log = \"logs/d.jsonl\"\n");
        let (dir, options) = project(&config);
        run(&bash("curl x"), &options);
        let log = std::fs::read_to_string(dir.path().join("logs/d.jsonl")).unwrap();
        assert!(log.lines().count() >= 3);
        assert!(log.contains("\"decision\":\"block\""));
    }
}
