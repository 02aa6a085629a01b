use std::path::PathBuf;

use thiserror::Error;

// ── Top level ──

/// Everything that can stop the guard from reaching a decision.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("rule: {0}")]
    Rule(#[from] RuleError),
}

// ── Config ──

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid debug_log path {path:?}: {reason}")]
    DebugLogPath { path: String, reason: String },
}

// ── Rule compilation ──

/// A rule definition that cannot be compiled. Always carries the rule name.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("duplicate rule name {name:?}")]
    DuplicateName { name: String },

    #[error("rule {name:?} sets both pattern and builtin")]
    PatternAndBuiltin { name: String },

    #[error("rule {name:?} sets neither pattern nor builtin")]
    NoCheck { name: String },

    #[error("rule {name:?} has an empty message")]
    EmptyMessage { name: String },

    #[error("rule {name:?} names unknown builtin {builtin:?}")]
    UnknownBuiltin { name: String, builtin: String },

    #[error("rule {name:?}: builtin rules only apply to Bash, got tools {tools:?}")]
    BuiltinTools { name: String, tools: Vec<String> },

    #[error("rule {name:?} has an invalid pattern: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: Box<regex::Error>,
    },
}
