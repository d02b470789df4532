//! Query-token emphasis for display names.

#![forbid(unsafe_code)]

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::warn;

pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";

/// A run of a display name, emphasized when it matched a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Segment {
    Plain(String),
    Emphasis(String),
}

/// Compiled once per query; tokens match literally and case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    re: Option<Regex>,
}

impl Highlighter {
    pub fn new<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut toks: Vec<&str> = tokens.iter().map(AsRef::as_ref).filter(|t| !t.is_empty()).collect();
        if toks.is_empty() {
            return Self { re: None };
        }
        // leftmost-first alternation: prefer the longer token where two start at the same place
        toks.sort_by(|a, b| b.len().cmp(&a.len()));
        toks.dedup();
        let pattern = toks.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
        match RegexBuilder::new(&pattern).case_insensitive(true).build() {
            Ok(re) => Self { re: Some(re) },
            Err(e) => {
                warn!(error = %e, tokens = toks.len(), "highlight pattern rejected; names render plain");
                Self { re: None }
            }
        }
    }

    pub fn is_active(&self) -> bool { self.re.is_some() }

    /// Split `text` into plain and emphasized runs. Never yields empty runs.
    pub fn segments(&self, text: &str) -> Vec<Segment> {
        let Some(re) = &self.re else {
            return if text.is_empty() { Vec::new() } else { vec![Segment::Plain(text.to_string())] };
        };
        let mut out = Vec::new();
        let mut last = 0usize;
        for m in re.find_iter(text) {
            if m.start() == m.end() {
                continue;
            }
            if m.start() > last {
                out.push(Segment::Plain(text[last..m.start()].to_string()));
            }
            out.push(Segment::Emphasis(m.as_str().to_string()));
            last = m.end();
        }
        if last < text.len() {
            out.push(Segment::Plain(text[last..].to_string()));
        }
        out
    }

    /// Wrap every match in `<mark>` tags. Text outside matches is returned as is.
    pub fn highlight(&self, text: &str) -> String {
        if self.re.is_none() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len() + 16);
        for seg in self.segments(text) {
            match seg {
                Segment::Plain(s) => out.push_str(&s),
                Segment::Emphasis(s) => {
                    out.push_str(MARK_OPEN);
                    out.push_str(&s);
                    out.push_str(MARK_CLOSE);
                }
            }
        }
        out
    }
}

/// One-shot form of [`Highlighter::highlight`].
pub fn highlight<S: AsRef<str>>(text: &str, tokens: &[S]) -> String {
    Highlighter::new(tokens).highlight(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_case_insensitive_match() {
        assert_eq!(highlight("Fujita Kotone", &["kotone"]), "Fujita <mark>Kotone</mark>");
    }

    #[test]
    fn no_tokens_returns_text_unchanged() {
        let none: [&str; 0] = [];
        assert_eq!(highlight("a < b & c", &none), "a < b & c");
        assert_eq!(highlight("abc", &[""]), "abc");
    }

    #[test]
    fn metacharacters_match_literally() {
        assert_eq!(highlight("img_a.b", &["."]), "img_a<mark>.</mark>b");
        assert_eq!(highlight("abc", &["."]), "abc");
        assert_eq!(highlight("x(1)", &["(1", "["]), "x<mark>(1</mark>)");
    }

    #[test]
    fn multiple_tokens_every_occurrence() {
        assert_eq!(
            highlight("hski_card_hski", &["HSKI", "card"]),
            "<mark>hski</mark>_<mark>card</mark>_<mark>hski</mark>"
        );
    }

    #[test]
    fn longer_token_wins_at_same_start() {
        assert_eq!(highlight("kotone", &["kot", "kotone"]), "<mark>kotone</mark>");
    }

    #[test]
    fn segments_for_structured_renderers() {
        let h = Highlighter::new(&["card"]);
        assert_eq!(
            h.segments("img_card_01"),
            vec![Segment::Plain("img_".into()), Segment::Emphasis("card".into()), Segment::Plain("_01".into())]
        );
        assert!(h.segments("").is_empty());
    }
}
