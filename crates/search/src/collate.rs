//! Human alphabetical ordering for display names.
//!
//! Root-locale collation (CLDR root order at tertiary strength): the order a browser's
//! `localeCompare` gives without a locale. Punctuation sorts `_` < `-` < ... < `$`, then digits,
//! then letters; accents and case are later differences, and so is hiragana versus katakana.

#![forbid(unsafe_code)]

use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions};
use tracing::warn;
use unicode_normalization::UnicodeNormalization;

/// Compares display names. Build one per sort and reuse it for every comparison.
pub struct NameCollator {
    inner: Option<Collator>,
}

impl Default for NameCollator {
    fn default() -> Self { Self::new() }
}

impl NameCollator {
    pub fn new() -> Self {
        match Collator::try_new(&Default::default(), CollatorOptions::new()) {
            Ok(c) => Self { inner: Some(c) },
            Err(e) => {
                warn!(error = %e, "root collation data unavailable; names sort case-folded");
                Self { inner: None }
            }
        }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.inner {
            Some(c) => c.compare(a, b),
            None => folded(a).cmp(folded(b)).then_with(|| a.cmp(b)),
        }
    }
}

fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfkd().flat_map(char::to_lowercase)
}

/// One-shot form of [`NameCollator::compare`].
pub fn compare_names(a: &str, b: &str) -> Ordering {
    NameCollator::new().compare(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut v: Vec<&str>) -> Vec<&str> {
        v.sort_by(|a, b| compare_names(a, b));
        v
    }

    #[test]
    fn case_is_a_late_difference() {
        assert_eq!(sorted(vec!["banana", "Apple", "apple", "cherry"]), vec!["apple", "Apple", "banana", "cherry"]);
    }

    #[test]
    fn accents_fold_at_primary_level() {
        assert_eq!(sorted(vec!["apple", "Äpfel", "banana"]), vec!["Äpfel", "apple", "banana"]);
        assert_eq!(sorted(vec!["résumé", "Resume", "resume"]), vec!["resume", "Resume", "résumé"]);
    }

    #[test]
    fn punctuation_then_digits_then_letters() {
        assert_eq!(sorted(vec!["img", "10_x", "_x"]), vec!["_x", "10_x", "img"]);
        // byte order would put 'Z' before '_' and '_' before 'a'
        assert_eq!(sorted(vec!["img_a", "imgZ"]), vec!["img_a", "imgZ"]);
    }

    #[test]
    fn fullwidth_matches_ascii_primary() {
        assert_eq!(compare_names("ＡＢＣ", "abd"), Ordering::Less);
    }

    #[test]
    fn punctuation_follows_root_order() {
        assert_eq!(sorted(vec!["img-a", "img_b"]), vec!["img_b", "img-a"]);
        assert_eq!(sorted(vec!["a$b", "a-b", "a_b"]), vec!["a_b", "a-b", "a$b"]);
    }

    #[test]
    fn kana_differs_only_at_tertiary_level() {
        assert_eq!(sorted(vec!["かb", "カa"]), vec!["カa", "かb"]);
        assert_eq!(compare_names("か", "カ"), Ordering::Less);
    }

    #[test]
    fn identical_names_compare_equal() {
        assert_eq!(compare_names("sud_vo_hski", "sud_vo_hski"), Ordering::Equal);
    }
}
