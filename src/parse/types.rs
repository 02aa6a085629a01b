//! Types produced by the tokenizer and consumed by the segmenter and builtins.

/// Operators that separate independently-evaluated commands.
pub const CHAIN_OPERATORS: &[&str] = &["&&", "||", ";"];

/// A single shell word or operator.
///
/// `quoted` records how the word was written, not what it contains:
/// `'a|b'` is a quoted word whose value is `a|b`, while `a | b` yields
/// an operator token `|`. A word is quoted when any part of it was inside
/// quotes or backslash-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub quoted: bool,
    pub operator: bool,
}

impl Token {
    /// An unquoted word.
    pub fn word(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: false,
            operator: false,
        }
    }

    /// A word that was written with quotes or escapes.
    pub fn quoted(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: true,
            operator: false,
        }
    }

    /// An operator token.
    pub fn op(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quoted: false,
            operator: true,
        }
    }

    /// True for an operator token with exactly this value.
    pub fn is_op(&self, value: &str) -> bool {
        self.operator && self.value == value
    }

    /// True for `&&`, `||` and `;`.
    pub fn is_chain(&self) -> bool {
        self.operator && CHAIN_OPERATORS.contains(&self.value.as_str())
    }

    /// True for `$(` and backtick.
    pub fn is_substitution(&self) -> bool {
        self.is_op("$(") || self.is_op("`")
    }

    /// Whether this word has the shape of a `NAME=value` assignment.
    ///
    /// Only the shape is checked: `FOO="a b"` tokenizes as a quoted word
    /// and is still an assignment.
    pub fn is_assignment(&self) -> bool {
        if self.operator {
            return false;
        }
        match self.value.split_once('=') {
            Some((name, _)) => is_identifier(name),
            None => false,
        }
    }

    /// The variable name of an assignment token.
    pub fn assignment_name(&self) -> Option<&str> {
        if !self.is_assignment() {
            return None;
        }
        self.value.split_once('=').map(|(name, _)| name)
    }
}

/// Valid shell variable name: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Final path component: `/usr/bin/curl` → `curl`.
pub fn base_name(word: &str) -> &str {
    match word.rsplit_once('/') {
        Some((_, name)) if !name.is_empty() => name,
        _ => word,
    }
}
