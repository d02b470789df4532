//! Search state as carried by a shareable `/search?...` link.
//!
//! Recognized parameters: `query`, `byID`, `ascending`, `entriesPerPage`, `currentPage`.
//! Missing or malformed values fall back to defaults (name ascending, page 1, smallest page size).

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::state::{PageSize, SortState};

pub const SEARCH_PATH: &str = "/search";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkState {
    pub query: String,
    pub sort: SortState,
    pub entries_per_page: PageSize,
    pub current_page: usize,
}

impl Default for LinkState {
    fn default() -> Self {
        Self { query: String::new(), sort: SortState::default(), entries_per_page: PageSize::default(), current_page: 1 }
    }
}

impl LinkState {
    pub fn for_query(query: impl Into<String>) -> Self {
        Self { query: query.into(), ..Self::default() }
    }

    /// Parse a query string. Accepts a bare `a=b&c=d` string, one with a leading `?`,
    /// or a full link such as `http://host/search?query=x`.
    pub fn parse(input: &str) -> Self {
        let qs = match input.split_once('?') {
            Some((_, rest)) => rest,
            None if input.contains('=') => input,
            None => "",
        };
        let qs = qs.split('#').next().unwrap_or("");
        let mut st = Self::default();
        for pair in qs.split('&').filter(|p| !p.is_empty()) {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            let v = decode_component(v);
            match k {
                "query" => st.query = v,
                "byID" => { if let Some(b) = parse_bool(&v) { st.sort.by_id = b; } }
                "ascending" => { if let Some(b) = parse_bool(&v) { st.sort.ascending = b; } }
                "entriesPerPage" => { if let Ok(n) = v.trim().parse::<usize>() { st.entries_per_page = PageSize::new(n); } }
                "currentPage" => { if let Ok(n) = v.trim().parse::<usize>() { st.current_page = n.max(1); } }
                _ => {}
            }
        }
        st
    }

    pub fn to_query_string(&self) -> String {
        format!(
            "query={}&byID={}&ascending={}&entriesPerPage={}&currentPage={}",
            urlencoding::encode(&self.query),
            self.sort.by_id,
            self.sort.ascending,
            self.entries_per_page.get(),
            self.current_page.max(1),
        )
    }

    /// Path plus query string, ready for a history replace.
    pub fn to_href(&self) -> String {
        format!("{}?{}", SEARCH_PATH, self.to_query_string())
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

// Form encoding: '+' is a space. Invalid percent sequences keep the raw text.
fn decode_component(v: &str) -> String {
    let spaced = v.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(s) => s.into_owned(),
        Err(_) => spaced,
    }
}
