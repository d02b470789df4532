#![forbid(unsafe_code)]

use assetview_core::{AssetType, Entry, PageSize, PageState, SortState};
use assetview_search::{compare_names, nav_controls, paginate, sort_entries, NavItem, NavTarget};
use proptest::prelude::*;

fn entry_strategy() -> impl Strategy<Value = Entry> {
    (prop::bool::ANY, 0u64..50, "[a-zA-Z_ ]{0,8}").prop_map(|(ab, id, name)| {
        let kind = if ab { AssetType::AssetBundle } else { AssetType::Resource };
        Entry::new(kind, id, name)
    })
}

proptest! {
    #[test]
    fn pages_partition_the_store(count in 0usize..400, size in 1usize..120) {
        let data: Vec<usize> = (0..count).collect();
        let mut st = PageState::new(PageSize::new(size));
        st.set_count(count);
        let total = st.total_pages();
        let mut seen = Vec::with_capacity(count);
        for p in 1..=total.max(1) {
            st.set_page(p);
            seen.extend_from_slice(paginate(&data, &st).entries);
        }
        prop_assert_eq!(seen, data);
    }

    #[test]
    fn by_id_groups_and_orders(mut v in prop::collection::vec(entry_strategy(), 1..60), asc in prop::bool::ANY) {
        sort_entries(&mut v, SortState::by_id(asc));
        for w in v.windows(2) {
            let (a, b) = (&w[0], &w[1]);
            let ka = (a.kind.canonical_name(), a.id);
            let kb = (b.kind.canonical_name(), b.id);
            if asc { prop_assert!(ka <= kb); } else { prop_assert!(ka >= kb); }
        }
    }

    #[test]
    fn by_name_is_ordered_and_reversal_round_trips(mut v in prop::collection::vec(entry_strategy(), 0..60)) {
        sort_entries(&mut v, SortState::by_name(true));
        for w in v.windows(2) {
            prop_assert_ne!(compare_names(&w[0].name, &w[1].name), std::cmp::Ordering::Greater);
        }
        let asc = v.clone();
        sort_entries(&mut v, SortState::by_name(false));
        let mut back = v.clone();
        back.reverse();
        prop_assert_eq!(&back, &asc);
    }

    #[test]
    fn nav_controls_stay_in_range(total in 0usize..200, cur_seed in 0usize..200, radius in 0usize..4) {
        let current = if total == 0 { 1 } else { cur_seed % total + 1 };
        let items = nav_controls(current, total, radius);
        prop_assert!(matches!(items.first(), Some(NavItem::Button { target: NavTarget::Prev, .. })), "first item is Prev");
        prop_assert!(matches!(items.last(), Some(NavItem::Button { target: NavTarget::Next, .. })), "last item is Next");
        let mut pages = Vec::new();
        for it in &items {
            if let NavItem::Button { target: NavTarget::Page(n), enabled } = it {
                prop_assert!(*n >= 1 && *n <= total.max(1));
                prop_assert_eq!(*enabled, *n != current);
                pages.push(*n);
            }
        }
        let mut sorted = pages.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(sorted, pages, "page buttons are strictly increasing");
        prop_assert!(items.iter().any(|i| matches!(i, NavItem::Button { target: NavTarget::Page(n), .. } if *n == current)), "current page has a button");
    }
}

#[test]
fn id_descending_over_two_categories() {
    let mut v = vec![
        Entry::new(AssetType::Resource, 4, "alpha"),
        Entry::new(AssetType::AssetBundle, 10, "beta"),
        Entry::new(AssetType::AssetBundle, 2, "gamma"),
    ];
    sort_entries(&mut v, SortState::by_name(true));
    sort_entries(&mut v, SortState::by_id(false));
    let got: Vec<(AssetType, u64)> = v.iter().map(|e| (e.kind, e.id)).collect();
    assert_eq!(got, vec![(AssetType::Resource, 4), (AssetType::AssetBundle, 10), (AssetType::AssetBundle, 2)]);
}
