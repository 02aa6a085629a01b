use super::tokenize::tokenize;
use super::types::Token;

/// Split a command at chain operators (`&&`, `||`, `;`) into segment strings.
///
/// Pipes, redirects and substitutions stay inside their segment. Each
/// segment is rebuilt into shell-safe text with [`join_tokens`], so it can
/// be tokenized again without losing quoting.
pub fn split_segments(command: &str) -> Vec<String> {
    token_segments(&tokenize(command))
        .into_iter()
        .map(join_tokens)
        .collect()
}

/// Group tokens into runs between chain operators. Empty runs are dropped.
pub fn token_segments(tokens: &[Token]) -> Vec<&[Token]> {
    tokens
        .split(Token::is_chain)
        .filter(|run| !run.is_empty())
        .collect()
}

/// Split a run of tokens at pipe operators into pipeline stages.
pub fn pipeline_stages(tokens: &[Token]) -> Vec<&[Token]> {
    tokens
        .split(|t| t.is_op("|"))
        .filter(|stage| !stage.is_empty())
        .collect()
}

/// Rebuild tokens into a shell-safe string.
///
/// Operators are emitted verbatim, quoted words are single-quoted with
/// embedded single quotes written as `'\''`, everything else as-is.
pub fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| {
            if t.quoted && !t.operator {
                quote(&t.value)
            } else {
                t.value.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
