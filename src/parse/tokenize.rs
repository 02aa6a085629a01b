use super::types::Token;

/// Accumulates the word currently being scanned.
#[derive(Default)]
struct Word {
    buf: String,
    quoted: bool,
    /// The word began with an unquoted `<<`.
    heredoc: bool,
    /// A bare `<<` was flushed; the next word names the delimiter.
    awaiting_delimiter: bool,
    /// Quoted heredoc delimiters opened on the current line.
    delimiters: Vec<String>,
}

impl Word {
    /// Flush the pending word into `out` if it has any content.
    fn flush(&mut self, out: &mut Vec<Token>) {
        if !self.buf.is_empty() {
            let value = std::mem::take(&mut self.buf);
            if self.heredoc {
                let rest = value.trim_start_matches('<');
                let rest = rest.strip_prefix('-').unwrap_or(rest);
                if rest.is_empty() {
                    self.awaiting_delimiter = true;
                } else if self.quoted {
                    self.delimiters.push(rest.to_string());
                }
            } else if std::mem::take(&mut self.awaiting_delimiter) && self.quoted {
                self.delimiters.push(value.clone());
            }
            out.push(Token {
                value,
                quoted: self.quoted,
                operator: false,
            });
        }
        self.quoted = false;
        self.heredoc = false;
    }

    fn push(&mut self, c: char) {
        self.buf.push(c);
    }
}

/// Split a command into words and operators, respecting quotes and escapes.
///
/// Total over arbitrary input: an unterminated quote swallows the rest of
/// the command as quoted text, a trailing backslash is dropped.
///
/// Outside quotes `||`, `&&`, `|`, `;`, `>>`, `>`, `$(` and backtick are
/// operators; a lone `&` is ordinary word content. An unquoted newline ends
/// the command like `;` and is emitted as one. Inside double quotes `$(`
/// and backtick are still emitted as operators because the shell expands
/// them there.
///
/// A heredoc whose delimiter is quoted (`<<'EOF'`, `<<"EOF"`, `<<\EOF`) has
/// a literal body: the lines up to the delimiter produce no tokens. Bodies
/// of unquoted delimiters are still scanned since the shell expands them.
pub fn tokenize(command: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut word = Word::default();
    let mut chars = command.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                word.quoted = true;
                for ic in chars.by_ref() {
                    if ic == '\'' {
                        break;
                    }
                    word.push(ic);
                }
            }
            '"' => {
                word.quoted = true;
                while let Some(ic) = chars.next() {
                    match ic {
                        '"' => break,
                        '\\' if matches!(chars.peek(), Some('"' | '\\')) => {
                            if let Some(escaped) = chars.next() {
                                word.push(escaped);
                            }
                        }
                        '$' if chars.peek() == Some(&'(') => {
                            chars.next();
                            word.flush(&mut out);
                            out.push(Token::op("$("));
                            word.quoted = true;
                        }
                        '`' => {
                            word.flush(&mut out);
                            out.push(Token::op("`"));
                            word.quoted = true;
                        }
                        _ => word.push(ic),
                    }
                }
            }
            '\\' => match chars.next() {
                // Line continuation
                Some('\n') => {}
                Some(escaped) => {
                    word.quoted = true;
                    word.push(escaped);
                }
                None => {}
            },
            ' ' | '\t' => word.flush(&mut out),
            '\n' => {
                word.flush(&mut out);
                out.push(Token::op(";"));
                word.awaiting_delimiter = false;
                for delimiter in std::mem::take(&mut word.delimiters) {
                    skip_heredoc_body(&mut chars, &delimiter);
                }
            }
            '|' => {
                word.flush(&mut out);
                if chars.peek() == Some(&'|') {
                    chars.next();
                    out.push(Token::op("||"));
                } else {
                    out.push(Token::op("|"));
                }
            }
            '&' => {
                if chars.peek() == Some(&'&') {
                    chars.next();
                    word.flush(&mut out);
                    out.push(Token::op("&&"));
                } else {
                    word.push('&');
                }
            }
            ';' => {
                word.flush(&mut out);
                out.push(Token::op(";"));
            }
            '>' => {
                word.flush(&mut out);
                if chars.peek() == Some(&'>') {
                    chars.next();
                    out.push(Token::op(">>"));
                } else {
                    out.push(Token::op(">"));
                }
            }
            '$' if chars.peek() == Some(&'(') => {
                chars.next();
                word.flush(&mut out);
                out.push(Token::op("$("));
            }
            '`' => {
                word.flush(&mut out);
                out.push(Token::op("`"));
            }
            '<' if word.buf.is_empty() && !word.quoted && chars.peek() == Some(&'<') => {
                chars.next();
                word.push('<');
                word.push('<');
                if chars.peek() == Some(&'<') {
                    // Here-string, no body follows.
                    chars.next();
                    word.push('<');
                } else {
                    word.heredoc = true;
                }
            }
            _ => word.push(c),
        }
    }

    word.flush(&mut out);
    out
}

/// Consume lines up to and including the one equal to `delimiter`.
fn skip_heredoc_body(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, delimiter: &str) {
    loop {
        let mut line = String::new();
        let mut ended = true;
        for c in chars.by_ref() {
            if c == '\n' {
                ended = false;
                break;
            }
            line.push(c);
        }
        if line.trim_start_matches('\t') == delimiter || ended {
            return;
        }
    }
}
