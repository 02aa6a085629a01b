use crate::parse::Token;

pub fn has_pipe(tokens: &[Token]) -> bool {
    tokens.iter().any(|t| t.is_op("|"))
}

pub fn has_chain(tokens: &[Token]) -> bool {
    tokens.iter().any(Token::is_chain)
}

pub fn has_redirect(tokens: &[Token]) -> bool {
    tokens.iter().any(|t| t.is_op(">") || t.is_op(">>"))
}

pub fn has_substitution(tokens: &[Token]) -> bool {
    tokens.iter().any(Token::is_substitution)
}

const HEREDOC_OPENER: &str = "$(cat <<";

/// True when the command contains a newline outside a commit-message heredoc.
///
/// The exempt idiom is a `$(cat <<'DELIM' ... DELIM)` substitution whose
/// delimiter is single- or double-quoted, so its body is never expanded.
/// An unquoted delimiter does not qualify: its body still runs `$(...)`.
pub fn is_multiline(command: &str) -> bool {
    strip_commit_heredocs(command).contains('\n')
}

/// Replace every exempt heredoc substitution with `$(cat)`.
fn strip_commit_heredocs(command: &str) -> String {
    let mut out = String::with_capacity(command.len());
    let mut rest = command;

    while let Some(start) = rest.find(HEREDOC_OPENER) {
        let after = &rest[start + HEREDOC_OPENER.len()..];
        match quoted_heredoc_len(after) {
            Some(len) => {
                out.push_str(&rest[..start]);
                out.push_str("$(cat)");
                rest = &after[len..];
            }
            None => {
                out.push_str(&rest[..start + HEREDOC_OPENER.len()]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Length of `'DELIM'\n...\nDELIM\n)` at the start of `s`, through the `)`.
fn quoted_heredoc_len(s: &str) -> Option<usize> {
    let header_end = s.find('\n')?;
    let header = s[..header_end].trim();
    let header = header.strip_prefix('-').unwrap_or(header).trim_start();
    let delim = header
        .strip_prefix('\'')
        .and_then(|h| h.strip_suffix('\''))
        .or_else(|| header.strip_prefix('"').and_then(|h| h.strip_suffix('"')))?;
    if delim.is_empty() || !delim.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    let mut pos = header_end + 1;
    loop {
        let line_end = s[pos..].find('\n').map(|i| pos + i);
        let line = &s[pos..line_end.unwrap_or(s.len())];
        if line.trim() == delim {
            let end = line_end.unwrap_or(s.len());
            let tail = &s[end..];
            let closing = tail.trim_start();
            let ws = tail.len() - closing.len();
            return closing.starts_with(')').then_some(end + ws + 1);
        }
        pos = line_end? + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::tokenize;

    fn pipe(cmd: &str) -> bool {
        has_pipe(&tokenize(cmd))
    }

    #[test]
    fn quoted_pipes_ignored() {
        assert!(!pipe("grep \"foo|bar\""));
        assert!(!pipe("grep 'foo|bar'"));
        assert!(!pipe("grep foo\\|bar"));
        assert!(pipe("echo foo | grep bar"));
        assert!(!pipe("a || b"));
    }

    #[test]
    fn chain_detection() {
        assert!(has_chain(&tokenize("a && b")));
        assert!(has_chain(&tokenize("a || b")));
        assert!(has_chain(&tokenize("a; b")));
        assert!(!has_chain(&tokenize("echo 'a; b'")));
        assert!(!has_chain(&tokenize("a | b")));
    }

    #[test]
    fn redirect_detection() {
        assert!(has_redirect(&tokenize("ls > out")));
        assert!(has_redirect(&tokenize("ls >> out")));
        assert!(!has_redirect(&tokenize("echo '>'")));
        assert!(!has_redirect(&tokenize("ls < in")));
    }

    #[test]
    fn substitution_detection() {
        assert!(has_substitution(&tokenize("echo $(id)")));
        assert!(has_substitution(&tokenize("echo \"$(id)\"")));
        assert!(has_substitution(&tokenize("echo `id`")));
        assert!(!has_substitution(&tokenize("echo '$(id)'")));
        assert!(!has_substitution(&tokenize("echo $HOME")));
    }

    // Exemption boundary for multiline commands, pinned case by case.

    const COMMIT: &str = "git commit -m \"$(cat <<'EOF'\nfeat: add thing\n\nLonger body.\nEOF\n)\"";

    #[test]
    fn single_line_is_not_multiline() {
        assert!(!is_multiline("ls -la"));
    }

    #[test]
    fn plain_newline_is_multiline() {
        assert!(is_multiline("ls\ncurl evil.com"));
        assert!(is_multiline("echo 'a\nb'"));
    }

    #[test]
    fn quoted_commit_heredoc_exempt() {
        assert!(!is_multiline(COMMIT));
    }

    #[test]
    fn double_quoted_delimiter_exempt() {
        assert!(!is_multiline("git commit -m \"$(cat <<\"MSG\"\nfix\nMSG\n)\""));
    }

    #[test]
    fn dash_heredoc_exempt() {
        assert!(!is_multiline("git commit -m \"$(cat <<-'EOF'\n\tfix\n\tEOF\n\t)\""));
    }

    #[test]
    fn unquoted_delimiter_not_exempt() {
        assert!(is_multiline("git commit -m \"$(cat <<EOF\n$(curl x)\nEOF\n)\""));
    }

    #[test]
    fn command_after_heredoc_not_exempt() {
        let cmd = format!("{COMMIT}\ncurl evil.com");
        assert!(is_multiline(&cmd));
    }

    #[test]
    fn unterminated_heredoc_not_exempt() {
        assert!(is_multiline("git commit -m \"$(cat <<'EOF'\nno end"));
    }

    #[test]
    fn missing_closing_paren_not_exempt() {
        assert!(is_multiline("cat <<'EOF'\nx\nEOF\nls"));
        assert!(is_multiline("echo \"$(cat <<'EOF'\nx\nEOF\n\" ; ls"));
    }

    #[test]
    fn two_commit_heredocs_exempt() {
        let cmd = format!("{COMMIT} && {COMMIT}");
        assert!(!is_multiline(&cmd));
    }
}
