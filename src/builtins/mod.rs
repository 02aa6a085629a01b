//! Builtin checks: named attack-pattern detectors implemented in code.
//!
//! Every check is a total predicate over hook input text. The catalog is a
//! closed enum so adding a check forces every `match` on it to be updated.

/// `env-hijack` and `var-command`.
pub mod env;
/// `network` and `exfiltration`.
pub mod network;
/// Sensitive-file heuristic and `credential-read`.
pub mod paths;
/// `inline-secrets`.
pub mod secrets;
/// `pipe`, `chained`, `redirect`, `subshell` and `multiline`.
pub mod structure;

use std::fmt;
use std::str::FromStr;

use crate::eval::input::command_text;
use crate::parse::{Token, base_name, expand_split_string, skip_wrappers, tokenize};

/// The fixed builtin catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Pipe,
    Chained,
    Redirect,
    Subshell,
    Multiline,
    CredentialRead,
    Network,
    Exfiltration,
    EnvHijack,
    InlineSecrets,
    VarCommand,
}

impl Builtin {
    /// Every builtin, in catalog order.
    pub const ALL: &'static [Builtin] = &[
        Builtin::Pipe,
        Builtin::Chained,
        Builtin::Redirect,
        Builtin::Subshell,
        Builtin::Multiline,
        Builtin::CredentialRead,
        Builtin::Network,
        Builtin::Exfiltration,
        Builtin::EnvHijack,
        Builtin::InlineSecrets,
        Builtin::VarCommand,
    ];

    /// Name used in rule definitions.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Pipe => "pipe",
            Builtin::Chained => "chained",
            Builtin::Redirect => "redirect",
            Builtin::Subshell => "subshell",
            Builtin::Multiline => "multiline",
            Builtin::CredentialRead => "credential-read",
            Builtin::Network => "network",
            Builtin::Exfiltration => "exfiltration",
            Builtin::EnvHijack => "env-hijack",
            Builtin::InlineSecrets => "inline-secrets",
            Builtin::VarCommand => "var-command",
        }
    }

    /// One-line description for `cc-hookguard builtins`.
    pub fn description(self) -> &'static str {
        match self {
            Builtin::Pipe => "unquoted pipe operator (|)",
            Builtin::Chained => "unquoted chain operator (&&, ||, ;) or newline",
            Builtin::Redirect => "unquoted output redirection (>, >>)",
            Builtin::Subshell => "command substitution ($( or backtick)",
            Builtin::Multiline => "newline outside a quoted $(cat <<'EOF' ...) commit-message heredoc",
            Builtin::CredentialRead => "argument naming a credential file (.env, *.pem, ~/.ssh/, ...)",
            Builtin::Network => "network tool in command position (curl, wget, nc, ssh, ...)",
            Builtin::Exfiltration => "credential file sent over the network or to a /dev/tcp socket",
            Builtin::EnvHijack => "library-injection or interpreter-hijacking variable assignment",
            Builtin::InlineSecrets => "credential-shaped literal that is not a placeholder",
            Builtin::VarCommand => "shell variable in command position ($cmd, ${cmd})",
        }
    }

    /// Check hook input (the `tool_input` JSON text).
    pub fn check(self, raw_input: &str) -> bool {
        self.check_command(&command_text(raw_input))
    }

    /// Check bare command text.
    pub fn check_command(self, command: &str) -> bool {
        if command.is_empty() {
            return false;
        }
        let tokens = tokenize(command);
        match self {
            Builtin::Pipe => structure::has_pipe(&tokens),
            Builtin::Chained => structure::has_chain(&tokens),
            Builtin::Redirect => structure::has_redirect(&tokens),
            Builtin::Subshell => structure::has_substitution(&tokens),
            Builtin::Multiline => structure::is_multiline(command),
            Builtin::CredentialRead => paths::reads_credentials(&tokens),
            Builtin::Network => network::uses_network(&tokens),
            Builtin::Exfiltration => network::exfiltrates(&tokens),
            Builtin::EnvHijack => env::hijacks_environment(&tokens),
            Builtin::InlineSecrets => secrets::contains_secret(command),
            Builtin::VarCommand => env::runs_variable(&tokens),
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Builtin {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Builtin::ALL.iter().copied().find(|b| b.name() == s).ok_or(())
    }
}

/// Shell words that may precede a command without being one.
const COMMAND_PREFIXES: &[&str] = &[
    "!", "{", "}", "if", "then", "else", "elif", "fi", "do", "done", "while", "until",
];

/// Split tokens into every simple command they contain.
///
/// A new command starts after chain operators, pipes, a lone `&`,
/// substitution operators and at a process substitution (`<(cmd`, or
/// `(cmd` right after `>`). A quoted word directly after a substitution
/// operator is the body of a substitution written inside double quotes and
/// is tokenized again. Grouping parentheses and leading keywords are
/// removed so the first token of each command is the word that runs, and
/// `env -S 'cmd args'` is replaced by the command it splits out.
pub(crate) fn commands(tokens: &[Token]) -> Vec<Vec<Token>> {
    let mut out = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut after_redirect = false;
    let mut iter = tokens.iter().peekable();

    while let Some(token) = iter.next() {
        let follows_redirect = std::mem::replace(
            &mut after_redirect,
            token.is_op(">") || token.is_op(">>"),
        );
        if let Some(body) = process_substitution(token, follows_redirect) {
            push_command(&mut out, std::mem::take(&mut current));
            current.extend(strip_grouping(&body));
            continue;
        }
        let background = !token.quoted && !token.operator && token.value == "&";
        let boundary = token.operator && !token.is_op(">") && !token.is_op(">>");
        if boundary || background {
            push_command(&mut out, std::mem::take(&mut current));
            if token.is_substitution()
                && let Some(body) = iter.next_if(|t| t.quoted && !t.operator)
            {
                let inner = body.value.strip_suffix(')').unwrap_or(&body.value);
                out.extend(commands(&tokenize(inner)));
            }
            continue;
        }
        if let Some(word) = strip_grouping(token) {
            current.push(word);
        }
    }
    push_command(&mut out, current);
    out
}

fn push_command(out: &mut Vec<Vec<Token>>, mut command: Vec<Token>) {
    let skip = command
        .iter()
        .take_while(|t| !t.quoted && COMMAND_PREFIXES.contains(&t.value.as_str()))
        .count();
    command.drain(..skip);
    if let Some(expanded) = expand_split_string(&command) {
        out.extend(commands(&expanded));
    } else if !command.is_empty() {
        out.push(command);
    }
}

/// The opening word of a process substitution, without its `<` marker.
fn process_substitution(token: &Token, follows_redirect: bool) -> Option<Token> {
    if token.quoted || token.operator {
        return None;
    }
    let body = match token.value.strip_prefix('<') {
        Some(rest) if rest.starts_with('(') => rest,
        _ if follows_redirect && token.value.starts_with('(') => token.value.as_str(),
        _ => return None,
    };
    Some(Token::word(body))
}

/// Remove subshell and substitution parentheses from an unquoted word.
fn strip_grouping(token: &Token) -> Option<Token> {
    if token.quoted {
        return Some(token.clone());
    }
    let value = token.value.trim_start_matches('(').trim_end_matches(')');
    if value.is_empty() {
        return None;
    }
    Some(Token {
        value: value.to_string(),
        ..token.clone()
    })
}

/// Base name of the command that actually runs, after wrapper stripping.
pub(crate) fn command_name(command: &[Token]) -> Option<&str> {
    skip_wrappers(command)
        .first()
        .map(|t| base_name(&t.value))
}
