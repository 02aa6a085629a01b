use super::commands;
use crate::parse::{Token, base_name, resolve, skip_wrappers};

/// Variables that inject code into the dynamic loader or an interpreter.
pub const DANGEROUS_VARIABLES: &[&str] = &[
    "LD_PRELOAD",
    "LD_LIBRARY_PATH",
    "LD_AUDIT",
    "DYLD_INSERT_LIBRARIES",
    "DYLD_LIBRARY_PATH",
    "DYLD_FRAMEWORK_PATH",
    "BASH_ENV",
    "ENV",
    "PROMPT_COMMAND",
    "PYTHONSTARTUP",
    "PYTHONPATH",
    "PYTHONHOME",
    "PERL5OPT",
    "PERL5LIB",
    "RUBYOPT",
    "RUBYLIB",
    "NODE_OPTIONS",
    "JAVA_TOOL_OPTIONS",
    "_JAVA_OPTIONS",
];

/// Builtins whose `NAME=value` arguments export variables.
const EXPORTERS: &[&str] = &["export", "declare", "typeset"];

fn is_dangerous(token: &Token) -> bool {
    token
        .assignment_name()
        .is_some_and(|name| DANGEROUS_VARIABLES.contains(&name))
}

/// A dangerous variable set by a leading assignment, an environment-setting
/// wrapper, or `export NAME=value`.
pub fn hijacks_environment(tokens: &[Token]) -> bool {
    commands(tokens).iter().any(|command| {
        let resolved = resolve(command);
        if resolved.assignments.iter().any(|t| is_dangerous(t)) {
            return true;
        }
        match resolved.command.split_first() {
            Some((name, args)) if EXPORTERS.contains(&base_name(&name.value)) => {
                args.iter().any(is_dangerous)
            }
            _ => false,
        }
    })
}

/// A shell variable in command position: `$cmd args` or `${cmd} args`.
pub fn runs_variable(tokens: &[Token]) -> bool {
    commands(tokens).iter().any(|command| {
        skip_wrappers(command)
            .first()
            .is_some_and(|t| !t.quoted && is_variable_reference(&t.value))
    })
}

fn is_variable_reference(word: &str) -> bool {
    let Some(rest) = word.strip_prefix('$') else {
        return false;
    };
    rest.starts_with('{')
        || rest
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || "@*#?!-".contains(c))
}
