//! cc-hookguard: a PreToolUse hook that blocks dangerous agent tool calls.
//!
//! Each invocation is checked against an ordered list of deny rules loaded
//! from `.cc-hookguard.toml`. A rule is either a regular expression or one
//! of the [`builtins::Builtin`] checks, which understand shell quoting,
//! compound commands and wrapper commands such as `sudo` or `timeout`.
//! The first matching rule blocks; otherwise the call is allowed.
//!
//! # Architecture
//!
//! - **[`parse`]**: quote-aware tokenizer, segment splitting, wrapper resolution.
//! - **[`builtins`]**: the named attack-pattern checks.
//! - **[`eval`]**: hook input, rule compilation, the first-match decision engine.
//! - **[`config`]**: `.cc-hookguard.toml` discovery and the embedded scaffold.
//! - **[`hook`]**: stdin JSON in, exit code and stderr out.
//! - **[`logging`]**: stderr diagnostics and the JSON-lines debug log.

/// Named attack-pattern checks: network, exfiltration, credential reads, secrets.
pub mod builtins;
/// Process options, config discovery and loading, the embedded scaffold.
pub mod config;
/// Health checks behind `cc-hookguard doctor`.
pub mod doctor;
/// Configuration and rule-compilation errors.
pub mod error;
/// Evaluation engine: hook input, compiled rules, first-match decision.
pub mod eval;
/// PreToolUse protocol: stdin JSON in, exit code and stderr out.
pub mod hook;
/// Stderr diagnostics and the JSON-lines debug log.
pub mod logging;
/// Shell command parsing: tokenizer, segments, wrapper resolution.
pub mod parse;

use eval::{Decision, Guard, synthetic_input};

/// Check a Bash command against the rules of the embedded scaffold config.
///
/// This is the main entry point for tests and simple usage.
pub fn evaluate(command: &str) -> Decision {
    let rules = config::Config::default_config()
        .guard
        .map(|g| g.rules)
        .unwrap_or_default();
    match Guard::from_defs(&rules) {
        Ok(guard) => guard.check(eval::input::DEFAULT_TOOL, &synthetic_input(command)),
        Err(e) => {
            log::error!("default rules failed to compile: {e}");
            Decision::Allow
        }
    }
}
