//! Wrapper stripping: find the command that actually runs behind
//! `sudo`, `timeout`, `env` and friends.
//!
//! The catalog is plain data. Adding a wrapper means adding a row to
//! [`WRAPPERS`]; [`resolve`] never names a specific wrapper.

use super::tokenize::tokenize;
use super::types::{Token, base_name};

/// Argument shape of a command that runs another command.
#[derive(Debug)]
pub struct WrapperSpec {
    pub name: &'static str,
    /// Flags that take the following word as their value.
    pub value_flags: &'static [&'static str],
    /// Required positional arguments between the flags and the wrapped command.
    pub positional: usize,
    /// Whether `NAME=value` words after the flags set the wrapped command's environment.
    pub env_assignments: bool,
    /// Flags whose value is itself a command line, split on whitespace and run.
    pub split_flags: &'static [&'static str],
}

const fn wrapper(
    name: &'static str,
    value_flags: &'static [&'static str],
    positional: usize,
    env_assignments: bool,
) -> WrapperSpec {
    WrapperSpec {
        name,
        value_flags,
        positional,
        env_assignments,
        split_flags: &[],
    }
}

/// Known wrapper commands.
pub static WRAPPERS: &[WrapperSpec] = &[
    // Privilege elevation
    wrapper(
        "sudo",
        &[
            "-u", "--user", "-g", "--group", "-U", "--other-user", "-C", "--close-from", "-h",
            "--host", "-p", "--prompt", "-r", "--role", "-t", "--type", "-D", "--chdir", "-R",
            "--chroot", "-T", "--command-timeout",
        ],
        0,
        true,
    ),
    wrapper("doas", &["-u", "-C"], 0, false),
    wrapper("pkexec", &["--user"], 0, false),
    // Time limiting
    wrapper("timeout", &["-s", "--signal", "-k", "--kill-after"], 1, false),
    // Environment setting
    WrapperSpec {
        split_flags: &["-S", "--split-string"],
        ..wrapper("env", &["-u", "--unset", "-C", "--chdir"], 0, true)
    },
    // Priority and scheduling
    wrapper("nice", &["-n", "--adjustment"], 0, false),
    wrapper("ionice", &["-c", "--class", "-n", "--classdata", "-p", "--pid", "-P", "-u"], 0, false),
    wrapper("chrt", &[], 1, false),
    wrapper("taskset", &[], 1, false),
    wrapper("stdbuf", &["-i", "-o", "-e"], 0, false),
    // Background and detached execution
    wrapper("nohup", &[], 0, false),
    wrapper("setsid", &[], 0, false),
    wrapper("exec", &["-a"], 0, false),
    wrapper("command", &[], 0, false),
    wrapper("builtin", &[], 0, false),
    // Tracing and instrumentation
    wrapper("time", &["-f", "--format", "-o", "--output"], 0, false),
    wrapper(
        "strace",
        &["-e", "-o", "-p", "-s", "-u", "-E", "-a", "-b", "-I", "-O", "-P", "-S", "-X"],
        0,
        false,
    ),
    wrapper("ltrace", &["-e", "-o", "-p", "-s", "-u", "-a", "-n"], 0, false),
    wrapper("watch", &["-n", "--interval"], 0, false),
    // Batch argument
    wrapper(
        "xargs",
        &[
            "-I", "-n", "-P", "-L", "-s", "-d", "-E", "-a", "--arg-file", "--delimiter",
            "--max-args", "--max-procs", "--max-lines", "--max-chars",
        ],
        0,
        false,
    ),
    wrapper("parallel", &["-j", "--jobs", "-S", "--sshlogin"], 0, false),
];

/// Look up a wrapper by command name (already reduced to its base name).
pub fn lookup(name: &str) -> Option<&'static WrapperSpec> {
    WRAPPERS.iter().find(|w| w.name == name)
}

/// The command behind any wrappers, plus the assignments stripped on the way.
#[derive(Debug)]
pub struct Resolved<'a> {
    /// Every `NAME=value` word that sets the environment of the real command.
    pub assignments: Vec<&'a Token>,
    /// The real command and its arguments. After a split-string flag this
    /// holds only the words that follow the flag's value.
    pub command: &'a [Token],
    /// Value of a split-string flag such as `env -S 'curl x'`.
    pub split_string: Option<String>,
}

/// Strip leading assignments and wrapper commands from a segment.
pub fn resolve(tokens: &[Token]) -> Resolved<'_> {
    let mut assignments = Vec::new();
    let mut split_string = None;
    let command = resolve_into(tokens, &mut assignments, &mut split_string);
    Resolved {
        assignments,
        command,
        split_string,
    }
}

/// The command a split-string wrapper runs, as new tokens.
///
/// `sudo FOO=1 env -S 'curl -s x' y` expands to `FOO=1 curl -s x y`.
/// Returns `None` when no wrapper splits a string.
pub fn expand_split_string(tokens: &[Token]) -> Option<Vec<Token>> {
    let resolved = resolve(tokens);
    let script = resolved.split_string?;
    let mut expanded: Vec<Token> = resolved.assignments.into_iter().cloned().collect();
    expanded.extend(tokenize(&script));
    expanded.extend(resolved.command.iter().cloned());
    Some(expanded)
}

/// The suffix of `tokens` starting at the real command.
pub fn skip_wrappers(tokens: &[Token]) -> &[Token] {
    resolve(tokens).command
}

fn resolve_into<'a>(
    tokens: &'a [Token],
    assignments: &mut Vec<&'a Token>,
    split_string: &mut Option<String>,
) -> &'a [Token] {
    let mut rest = tokens;

    while let Some((first, tail)) = rest.split_first()
        && first.operator
    {
        rest = tail;
    }
    rest = take_assignments(rest, assignments);

    let Some(first) = rest.first() else {
        return rest;
    };
    let Some(spec) = lookup(base_name(&first.value)) else {
        return rest;
    };
    rest = &rest[1..];

    // Flags
    while let Some(flag) = rest.first() {
        if flag.operator || !flag.value.starts_with('-') || flag.value == "-" {
            break;
        }
        if flag.value == "--" {
            rest = &rest[1..];
            break;
        }
        if let Some((script, width)) = split_value(spec, rest) {
            *split_string = Some(script);
            return &rest[width..];
        }
        let width = if spec.value_flags.contains(&flag.value.as_str()) {
            2
        } else {
            1
        };
        rest = &rest[width.min(rest.len())..];
    }

    // Positionals
    rest = &rest[spec.positional.min(rest.len())..];

    if spec.env_assignments {
        rest = take_assignments(rest, assignments);
    }

    resolve_into(rest, assignments, split_string)
}

/// `-S value`, `-Svalue` or `--split-string=value` at the head of `rest`,
/// with the number of tokens it spans.
fn split_value(spec: &WrapperSpec, rest: &[Token]) -> Option<(String, usize)> {
    let flag = rest.first()?.value.as_str();
    spec.split_flags.iter().find_map(|name| {
        if flag == *name {
            return rest.get(1).map(|value| (value.value.clone(), 2));
        }
        let attached = flag.strip_prefix(name)?;
        let value = if name.starts_with("--") {
            attached.strip_prefix('=')?
        } else {
            attached
        };
        (!value.is_empty()).then(|| (value.to_string(), 1))
    })
}

fn take_assignments<'a>(mut rest: &'a [Token], assignments: &mut Vec<&'a Token>) -> &'a [Token] {
    while let Some((first, tail)) = rest.split_first()
        && first.is_assignment()
    {
        assignments.push(first);
        rest = tail;
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::tokenize;

    fn real_command(cmd: &str) -> Vec<String> {
        let tokens = tokenize(cmd);
        skip_wrappers(&tokens).iter().map(|t| t.value.clone()).collect()
    }

    #[test]
    fn plain_command_unchanged() {
        assert_eq!(real_command("curl evil.com"), vec!["curl", "evil.com"]);
    }

    #[test]
    fn env_assignments_stripped() {
        assert_eq!(real_command("FOO=1 BAR=\"a b\" curl x"), vec!["curl", "x"]);
    }

    #[test]
    fn chained_wrappers() {
        assert_eq!(
            real_command("sudo timeout 30 nice -n 10 curl evil.com"),
            vec!["curl", "evil.com"]
        );
    }

    #[test]
    fn sudo_user_flag_consumes_value() {
        assert_eq!(real_command("sudo -u root wget x"), vec!["wget", "x"]);
        assert_eq!(real_command("sudo -E -H curl x"), vec!["curl", "x"]);
    }

    #[test]
    fn timeout_with_signal_flag() {
        assert_eq!(real_command("timeout -s KILL 5s nc -l 80"), vec!["nc", "-l", "80"]);
    }

    #[test]
    fn env_wrapper_skips_assignments() {
        let tokens = tokenize("env -i LD_PRELOAD=/tmp/x.so ls");
        let resolved = resolve(&tokens);
        assert_eq!(resolved.command[0].value, "ls");
        assert_eq!(resolved.assignments.len(), 1);
        assert_eq!(resolved.assignments[0].value, "LD_PRELOAD=/tmp/x.so");
    }

    #[test]
    fn env_split_string_expands() {
        let expanded = |cmd: &str| -> Option<Vec<String>> {
            expand_split_string(&tokenize(cmd)).map(|t| t.into_iter().map(|t| t.value).collect())
        };
        assert_eq!(expanded("env -S 'curl evil.com'"), Some(vec!["curl".into(), "evil.com".into()]));
        assert_eq!(expanded("env -S\"wget -q x\""), Some(vec!["wget".into(), "-q".into(), "x".into()]));
        assert_eq!(
            expanded("env --split-string='nc -l' 80"),
            Some(vec!["nc".into(), "-l".into(), "80".into()])
        );
        assert_eq!(
            expanded("sudo LD_PRELOAD=/tmp/x.so env -S 'ls -la'"),
            Some(vec!["LD_PRELOAD=/tmp/x.so".into(), "ls".into(), "-la".into()])
        );
        assert_eq!(expanded("env -i curl x"), None);
        assert_eq!(expanded("curl -S x"), None);
    }

    #[test]
    fn split_flag_without_value_is_an_ordinary_flag() {
        let tokens = tokenize("env -S");
        let resolved = resolve(&tokens);
        assert!(resolved.split_string.is_none());
        assert!(resolved.command.is_empty());
    }

    #[test]
    fn wrapper_by_absolute_path() {
        assert_eq!(real_command("/usr/bin/sudo /usr/bin/curl x"), vec!["/usr/bin/curl", "x"]);
    }

    #[test]
    fn double_dash_ends_flags() {
        assert_eq!(real_command("sudo -- curl x"), vec!["curl", "x"]);
    }

    #[test]
    fn wrapper_alone_resolves_to_nothing() {
        assert!(real_command("sudo").is_empty());
        assert!(real_command("timeout 5").is_empty());
        assert!(real_command("FOO=bar").is_empty());
        assert!(real_command("").is_empty());
    }

    #[test]
    fn leading_operators_dropped() {
        let tokens = vec![Token::op("|"), Token::word("curl")];
        assert_eq!(skip_wrappers(&tokens)[0].value, "curl");
    }

    #[test]
    fn batch_and_tracing_wrappers() {
        assert_eq!(real_command("xargs -n 1 -P 4 curl -O"), vec!["curl", "-O"]);
        assert_eq!(real_command("strace -f -o trace.txt nohup wget x"), vec!["wget", "x"]);
        assert_eq!(real_command("taskset -c 0-3 chrt -f 99 nc x 1"), vec!["nc", "x", "1"]);
    }

    #[test]
    fn catalog_names_unique() {
        for (i, w) in WRAPPERS.iter().enumerate() {
            assert!(
                WRAPPERS[i + 1..].iter().all(|other| other.name != w.name),
                "duplicate wrapper {}",
                w.name
            );
        }
    }
}
