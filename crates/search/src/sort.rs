#![forbid(unsafe_code)]

use std::time::Instant;

use assetview_core::{Entry, SortState};
use tracing::debug;

use crate::collate::NameCollator;

/// Reorder the result store in place.
///
/// By id: category canonical name, then numeric id. By name: human alphabetical order.
/// Descending is the ascending result reversed as a whole, so ties flip order as well.
pub fn sort_entries(entries: &mut [Entry], sort: SortState) {
    let t0 = Instant::now();
    if sort.by_id {
        entries.sort_by(|a, b| {
            a.kind
                .canonical_name()
                .cmp(b.kind.canonical_name())
                .then_with(|| a.id.cmp(&b.id))
        });
    } else {
        // stable; ties keep fetch order
        let collator = NameCollator::new();
        entries.sort_by(|a, b| collator.compare(&a.name, &b.name));
    }
    if !sort.ascending {
        entries.reverse();
    }
    let elapsed = t0.elapsed();
    metrics::histogram!("search_sort_ms", elapsed.as_secs_f64() * 1_000.0);
    debug!(count = entries.len(), by_id = sort.by_id, ascending = sort.ascending, took_us = %elapsed.as_micros(), "sort applied");
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetview_core::AssetType::{AssetBundle, Resource};

    fn e(kind: assetview_core::AssetType, id: u64, name: &str) -> Entry { Entry::new(kind, id, name) }

    fn ids(v: &[Entry]) -> Vec<(assetview_core::AssetType, u64)> { v.iter().map(|x| (x.kind, x.id)).collect() }

    #[test]
    fn by_id_groups_categories_then_ids() {
        let mut v = vec![e(Resource, 2, "b"), e(AssetBundle, 9, "c"), e(Resource, 1, "a"), e(AssetBundle, 3, "d")];
        sort_entries(&mut v, SortState::by_id(true));
        assert_eq!(ids(&v), vec![(AssetBundle, 3), (AssetBundle, 9), (Resource, 1), (Resource, 2)]);
        sort_entries(&mut v, SortState::by_id(false));
        assert_eq!(ids(&v), vec![(Resource, 2), (Resource, 1), (AssetBundle, 9), (AssetBundle, 3)]);
    }

    #[test]
    fn by_name_uses_human_order() {
        let mut v = vec![e(Resource, 1, "bgm_Title"), e(Resource, 2, "Adv_01"), e(Resource, 3, "adv_02")];
        sort_entries(&mut v, SortState::by_name(true));
        let names: Vec<&str> = v.iter().map(|x| x.name.as_str()).collect();
        assert_eq!(names, vec!["Adv_01", "adv_02", "bgm_Title"]);
    }

    #[test]
    fn by_name_puts_underscore_before_hyphen_and_ignores_kana_script() {
        let mut v = vec![e(Resource, 1, "img-a"), e(Resource, 2, "img_b"), e(Resource, 3, "かb"), e(Resource, 4, "カa")];
        sort_entries(&mut v, SortState::by_name(true));
        let names: Vec<&str> = v.iter().map(|x| x.name.as_str()).collect();
        assert_eq!(names, vec!["img_b", "img-a", "カa", "かb"]);
    }

    #[test]
    fn descending_reverses_tie_order() {
        // equal names keep fetch order ascending, and flip under descending
        let mut v = vec![e(AssetBundle, 1, "same"), e(Resource, 1, "same"), e(AssetBundle, 2, "alpha")];
        sort_entries(&mut v, SortState::by_name(true));
        assert_eq!(ids(&v), vec![(AssetBundle, 2), (AssetBundle, 1), (Resource, 1)]);
        sort_entries(&mut v, SortState::by_name(false));
        assert_eq!(ids(&v), vec![(Resource, 1), (AssetBundle, 1), (AssetBundle, 2)]);
    }

    #[test]
    fn empty_and_single_are_untouched() {
        let mut v: Vec<Entry> = Vec::new();
        sort_entries(&mut v, SortState::by_id(false));
        assert!(v.is_empty());
        let mut one = vec![e(Resource, 5, "x")];
        sort_entries(&mut one, SortState::by_name(false));
        assert_eq!(one[0].id, 5);
    }
}
