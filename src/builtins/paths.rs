use crate::parse::{Token, base_name};

/// `.env.<suffix>` files that hold no real values.
const SAFE_ENV_SUFFIXES: &[&str] = &["example", "sample", "template"];

/// Key and certificate-bundle extensions.
const SENSITIVE_EXTENSIONS: &[&str] = &[".pem", ".key", ".p12", ".pfx"];

/// Exact basenames of well-known credential files.
const SENSITIVE_NAMES: &[&str] = &[
    "credentials.json",
    "client_secret.json",
    "client_secrets.json",
    "service-account.json",
    "service_account.json",
    "token.json",
    "tokens.json",
    ".token",
    ".netrc",
    "_netrc",
    ".npmrc",
    ".pypirc",
    ".git-credentials",
    ".pgpass",
    "id_rsa",
    "id_dsa",
    "id_ecdsa",
    "id_ed25519",
];

/// Path fragments of credential directories and files.
const SENSITIVE_FRAGMENTS: &[&str] = &["/.ssh/", ".aws/credentials", "/.gnupg/"];

/// Credential directories named as a whole, as in `tar czf k.tgz ~/.ssh`.
const SENSITIVE_DIRECTORIES: &[&str] = &[".ssh", ".gnupg", ".aws"];

/// Whether a path looks like it holds credentials.
pub fn is_sensitive_path(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    if SENSITIVE_FRAGMENTS.iter().any(|f| path.contains(f))
        || path.starts_with(".ssh/")
        || path.starts_with(".gnupg/")
    {
        return true;
    }

    let name = base_name(path.trim_end_matches('/')).to_ascii_lowercase();
    if SENSITIVE_DIRECTORIES.contains(&name.as_str()) {
        return true;
    }
    if name == ".env" {
        return true;
    }
    if let Some(suffix) = name.strip_prefix(".env.") {
        return !SAFE_ENV_SUFFIXES.contains(&suffix);
    }
    if SENSITIVE_EXTENSIONS
        .iter()
        .any(|ext| name.len() > ext.len() && name.ends_with(ext))
    {
        return true;
    }
    SENSITIVE_NAMES.contains(&name.as_str())
}

/// Paths a single word may name: the word itself, the value of a
/// `--flag=value` or `key=value` word, and the file of an `@file` or
/// `<file` reference.
pub fn path_candidates(word: &str) -> Vec<&str> {
    let mut out = vec![word];
    if let Some((_, value)) = word.split_once('=') {
        out.push(value);
    }
    for marker in ['@', '<'] {
        if let Some((_, file)) = word.rsplit_once(marker) {
            out.push(file.split(';').next().unwrap_or(file));
        }
    }
    out
}

/// Whether a word references a sensitive file in any of its forms.
pub fn references_sensitive(word: &str) -> bool {
    path_candidates(word).into_iter().any(is_sensitive_path)
}

/// Any non-operator token naming a credential file.
pub fn reads_credentials(tokens: &[Token]) -> bool {
    tokens
        .iter()
        .any(|t| !t.operator && references_sensitive(&t.value))
}
