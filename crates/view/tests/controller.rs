use std::sync::Arc;
use std::time::Duration;

use assetview_api::{AssetError, MediaBlob, MockApi};
use assetview_core::{AssetType, Entry, LinkState, SortState};
use assetview_search::{NavItem, NavTarget};
use assetview_view::{
    ControllerConfig, DisabledHistory, HtmlRenderer, MemoryHistory, Phase, RecordingRenderer, Renderer, ResultView,
    SearchController, PLACEHOLDER_IMAGE,
};

fn cards(n: u64) -> Vec<Entry> {
    (1..=n).map(|i| Entry::new(AssetType::AssetBundle, i, format!("hski_card_{:02}", i))).collect()
}

fn controller(api: Arc<MockApi>, link: LinkState) -> SearchController<RecordingRenderer, MemoryHistory> {
    SearchController::new(api, RecordingRenderer::default(), MemoryHistory::new(), link, ControllerConfig::default())
}

fn labels(nav: &[NavItem]) -> Vec<String> { nav.iter().map(NavItem::label).collect() }

#[tokio::test]
async fn first_page_of_twenty_five() {
    let api = Arc::new(MockApi::with_entries(cards(25)));
    let mut c = controller(api.clone(), LinkState::for_query("hski card"));
    c.load().await;

    assert_eq!(c.phase(), &Phase::Populated);
    let page = c.renderer().last().and_then(ResultView::as_page).expect("page view");
    assert_eq!(page.digest, "Found 25 entries.");
    assert_eq!(page.cards.len(), 12);
    assert_eq!(page.cards[0].id, 1);
    assert_eq!(page.cards[11].id, 12);
    assert_eq!(page.cards[0].name_markup, "<mark>hski</mark>_<mark>card</mark>_01");
    assert_eq!(labels(&page.nav), vec!["Prev", "1", "2", "3", "Next"]);
    assert!(page.nav.contains(&NavItem::Button { target: NavTarget::Next, enabled: true }));
    assert!(!page.nav.contains(&NavItem::Ellipsis));
    assert_eq!(
        c.history().current(),
        Some("/search?query=hski%20card&byID=false&ascending=true&entriesPerPage=12&currentPage=1")
    );
}

#[tokio::test]
async fn empty_results_have_no_navigation() {
    let api = Arc::new(MockApi::with_entries(Vec::new()));
    let mut c = controller(api, LinkState::for_query("nothing"));
    c.load().await;

    assert_eq!(c.phase(), &Phase::Empty);
    match c.renderer().last() {
        Some(ResultView::Empty { digest, .. }) => assert_eq!(digest, "No results found."),
        other => panic!("unexpected view: {:?}", other),
    }
    assert!(!c.go_to(NavTarget::Next));
    assert_eq!(c.history().writes().len(), 1);
}

#[tokio::test]
async fn fetch_failure_shows_error_view() {
    let api = Arc::new(MockApi::failing(AssetError::Transport("connection refused".into())));
    let mut c = controller(api, LinkState::for_query("card"));
    c.load().await;

    assert!(matches!(c.phase(), Phase::Failed(_)));
    let kinds: Vec<&str> = c.renderer().views().iter().map(ResultView::kind_label).collect();
    assert_eq!(kinds, vec!["loading", "failed"]);
    let mut html = HtmlRenderer::new();
    if let Some(v) = c.current_view() {
        assert_eq!(v.title(), "Search results for \"card\"");
        assert_eq!(v.kind_label(), "failed");
        html.render(v);
    }
    assert!(html.html().contains("connection refused"));
}

#[tokio::test]
async fn id_descending_across_categories() {
    let api = Arc::new(MockApi::with_entries(vec![
        Entry::new(AssetType::Resource, 5, "bgm_a"),
        Entry::new(AssetType::AssetBundle, 9, "card_b"),
        Entry::new(AssetType::AssetBundle, 2, "card_c"),
    ]));
    let mut c = controller(api, LinkState::for_query("a"));
    c.load().await;
    let by_name: Vec<u64> = c.entries().iter().map(|e| e.id).collect();
    assert_eq!(by_name, vec![5, 9, 2]);

    assert!(c.set_sort(SortState::by_id(false)));
    let order: Vec<(AssetType, u64)> = c.entries().iter().map(|e| (e.kind, e.id)).collect();
    assert_eq!(order, vec![(AssetType::Resource, 5), (AssetType::AssetBundle, 9), (AssetType::AssetBundle, 2)]);
    assert!(c.history().current().is_some_and(|h| h.contains("byID=true&ascending=false")));
}

#[tokio::test]
async fn navigation_and_sorting_never_refetch() {
    let api = Arc::new(MockApi::with_entries(cards(40)));
    let mut c = controller(api.clone(), LinkState::for_query("card"));
    c.load().await;
    c.go_to(NavTarget::Next);
    c.set_page(4);
    c.set_sort(SortState::by_id(true));
    c.set_page_size(assetview_core::PageSize::new(24));
    c.load().await;
    assert_eq!(api.search_calls(), 1);
    assert_eq!(c.page().total_pages(), 2);
}

#[tokio::test]
async fn restores_state_from_shared_link() {
    let link = LinkState::parse("http://localhost:5000/search?query=hski+card&byID=false&ascending=false&entriesPerPage=12&currentPage=3");
    let api = Arc::new(MockApi::with_entries(cards(25)));
    let mut c = controller(api, link);
    c.load().await;

    assert_eq!(c.query(), "hski card");
    assert_eq!(c.page().current_page(), 3);
    let page = c.renderer().last().and_then(ResultView::as_page).expect("page view");
    // name descending: 25..1, page 3 holds the last entry
    assert_eq!(page.cards.len(), 1);
    assert_eq!(page.cards[0].id, 1);
    assert_eq!(c.activate(0).as_deref(), Some("/view/assetbundle/1"));
}

#[tokio::test]
async fn slow_and_failing_thumbnails_do_not_block() {
    let mut api = MockApi::with_entries(vec![
        Entry::new(AssetType::AssetBundle, 1, "img_slow"),
        Entry::new(AssetType::AssetBundle, 2, "img_missing"),
        Entry::new(AssetType::AssetBundle, 3, "plain"),
    ]);
    api.blobs.insert((AssetType::AssetBundle, 1), MediaBlob::new("image/png", vec![1u8, 2, 3]));
    api.delays.insert((AssetType::AssetBundle, 1), Duration::from_millis(400));
    let api = Arc::new(api);
    let mut c = controller(api.clone(), LinkState::for_query("img"));
    c.load().await;

    let view = c.renderer().last().cloned().expect("rendered");
    let page = view.as_page().expect("page view");
    let slot = |name: &str| page.cards.iter().find(|c| c.name == name).and_then(|c| c.thumbnail.clone());
    assert!(slot("plain").is_none());
    let slow = slot("img_slow").expect("slot");
    let missing = slot("img_missing").expect("slot");
    assert!(!slow.is_ready());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(missing.is_ready(), "fast failure settles without waiting for the slow fetch");
    assert_eq!(missing.get().map(|t| t.src.as_str()), Some(PLACEHOLDER_IMAGE));
    assert!(!slow.is_ready());

    c.settle_thumbnails().await;
    let t = slow.get().expect("filled");
    assert!(!t.placeholder);
    assert_eq!(t.src, "data:image/png;base64,AQID");
    assert_eq!(api.media_calls(), 2);
}

#[tokio::test]
async fn unavailable_history_still_renders() {
    let api = Arc::new(MockApi::with_entries(cards(13)));
    let mut c = SearchController::new(
        api,
        RecordingRenderer::default(),
        DisabledHistory,
        LinkState::for_query("card"),
        ControllerConfig::default(),
    );
    c.load().await;
    assert!(c.go_to(NavTarget::Next));
    assert_eq!(c.renderer().views().len(), 3);
    assert_eq!(c.link_state().current_page, 2);
}

#[tokio::test]
async fn late_outcome_is_ignored() {
    let api = Arc::new(MockApi::with_entries(cards(3)));
    let mut c = controller(api, LinkState::for_query("card"));
    c.load().await;
    c.settle(Err(AssetError::Internal("late".into())));
    assert_eq!(c.phase(), &Phase::Populated);
    assert_eq!(c.renderer().views().len(), 2);
}

#[tokio::test]
async fn wider_radius_lists_more_pages() {
    let api = Arc::new(MockApi::with_entries(cards(120)));
    let mut c = SearchController::new(
        api,
        RecordingRenderer::default(),
        MemoryHistory::new(),
        LinkState::parse("query=card&currentPage=5"),
        ControllerConfig { radius: 2 },
    );
    c.load().await;
    let page = c.renderer().last().and_then(ResultView::as_page).expect("page view");
    assert_eq!(labels(&page.nav), vec!["Prev", "1", "...", "3", "4", "5", "6", "7", "...", "10", "Next"]);
}
