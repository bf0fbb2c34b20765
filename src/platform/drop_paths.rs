//! Turning drag-and-drop payloads into file paths.
//!
//! Terminals deliver a dropped file as pasted text. Depending on the terminal
//! that text is a plain path, a shell-quoted or backslash-escaped path, or a
//! `file://` URL, and several files arrive separated by newlines or spaces.

use std::path::PathBuf;
use url::Url;

use super::fs::expand_tilde;

/// Split a paste/drop payload into the paths it names
pub fn parse_dropped_paths(payload: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    for line in payload.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        for token in split_tokens(line) {
            if let Some(path) = token_to_path(&token) {
                paths.push(path);
            }
        }
    }

    paths
}

/// Whitespace split that honours quotes and backslash escapes.
///
/// A line that is an existing path as a whole (Windows paths with spaces,
/// which terminals paste unquoted) is kept as a single token. So is a plain
/// line none of whose pieces exist, so a mistyped path is reported once.
fn split_tokens(line: &str) -> Vec<String> {
    if exists(line) {
        return vec![line.to_string()];
    }

    let tokens = tokenize(line);
    if tokens.len() > 1 && is_plain(line) && !tokens.iter().any(|token| exists(token)) {
        return vec![line.to_string()];
    }

    tokens
}

fn exists(text: &str) -> bool {
    expand_tilde(std::path::Path::new(text)).exists()
}

/// No quotes, escapes or URLs: the user typed the path as is
fn is_plain(line: &str) -> bool {
    let escaped = cfg!(unix) && line.contains('\\');
    !escaped && !line.contains(['\'', '"']) && !line.contains("file://")
}

fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'') | (None, '"') => quote = Some(c),
            // Only unix terminals escape; on Windows the backslash is a separator
            (None, '\\') if cfg!(unix) => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            (None, c) if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            (None, c) => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

fn token_to_path(token: &str) -> Option<PathBuf> {
    if token.starts_with("file://") {
        return Url::parse(token).ok()?.to_file_path().ok();
    }

    Some(PathBuf::from(token))
}
