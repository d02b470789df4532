//! Query normalization and highlight tokens.

#![forbid(unsafe_code)]

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use smallvec::SmallVec;

// A double-quoted run (kept whole) or a bare whitespace-free word.
static TOKEN_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r#""([^"]*)"|([^\s"]+)"#).ok());

/// Trim and collapse whitespace runs to a single space.
pub fn normalize_query(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Read-only token list derived from a normalized query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tokens(SmallVec<[String; 4]>);

impl Tokens {
    /// Split on whitespace, keeping `"quoted phrases"` as one token. Empty quotes are dropped,
    /// an unterminated quote is treated as plain text.
    pub fn from_query(query: &str) -> Self {
        let mut out: SmallVec<[String; 4]> = SmallVec::new();
        let Some(re) = TOKEN_RE.as_ref() else {
            out.extend(query.split_whitespace().map(str::to_string));
            return Self(out);
        };
        for caps in re.captures_iter(query) {
            let tok = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str().trim()).unwrap_or("");
            if !tok.is_empty() {
                out.push(tok.to_string());
            }
        }
        Self(out)
    }

    pub fn as_slice(&self) -> &[String] { &self.0 }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn iter(&self) -> impl Iterator<Item = &str> { self.0.iter().map(String::as_str) }
}

impl<S: Into<String>> FromIterator<S> for Tokens {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
