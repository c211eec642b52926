// src/cli/input.rs — Reading per-user transactions from disk

use std::path::Path;

use crate::infra::errors::Result;
use crate::patterns::EventToken;

/// Load one token list per user.
///
/// `.json` files hold an array of string arrays. Anything else is read as
/// text: one user per line, tokens separated by whitespace, in
/// chronological order. Blank lines and lines starting with `#` are skipped.
pub fn load_transactions(path: &Path) -> Result<Vec<Vec<String>>> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(parse_lines(&content))
    }
}

/// Parse every token as an [`EventToken`] and rewrite it in canonical form.
/// The first malformed token fails the whole load.
pub fn canonical_events(users: Vec<Vec<String>>) -> Result<Vec<Vec<String>>> {
    users
        .into_iter()
        .map(|tokens| {
            tokens
                .iter()
                .map(|token| token.parse::<EventToken>().map(|event| event.to_string()))
                .collect::<Result<Vec<String>>>()
        })
        .collect()
}

pub fn parse_lines(content: &str) -> Vec<Vec<String>> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.split_whitespace().map(String::from).collect())
        .collect()
}
