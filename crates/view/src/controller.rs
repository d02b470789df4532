#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Instant;

use assetview_api::{AssetApi, AssetResult};
use assetview_core::{normalize_query, Entry, LinkState, PageSize, PageState, SortState, Tokens};
use assetview_search::{nav_controls, paginate, sort_entries, Highlighter, NavTarget, DEFAULT_CONTEXT_RADIUS};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::history::History;
use crate::model::{digest_for, title_for, Card, PageView, ResultView, ThumbnailSlot};
use crate::render::Renderer;
use crate::thumbs::spawn_thumbnail;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Page buttons shown on each side of the current page.
    pub radius: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self { Self { radius: DEFAULT_CONTEXT_RADIUS } }
}

impl ControllerConfig {
    pub const MAX_RADIUS: usize = 16;

    /// Radius clamped to `0..=MAX_RADIUS`.
    pub fn with_radius(radius: usize) -> Self {
        Self { radius: radius.min(Self::MAX_RADIUS) }
    }

    /// Reads `ASSETVIEW_NAV_RADIUS`.
    pub fn from_env() -> Self {
        let radius = std::env::var("ASSETVIEW_NAV_RADIUS").ok().and_then(|s| s.trim().parse::<usize>().ok()).unwrap_or(DEFAULT_CONTEXT_RADIUS);
        Self::with_radius(radius)
    }
}

/// Page lifecycle. `Loading` is left exactly once; `Empty` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Failed(String),
    Empty,
    Populated,
}

/// Owns the result store and its sort/page state for one query.
pub struct SearchController<R: Renderer, H: History> {
    api: Arc<dyn AssetApi>,
    renderer: R,
    history: H,
    cfg: ControllerConfig,
    query: String,
    tokens: Tokens,
    highlighter: Highlighter,
    entries: Vec<Entry>,
    sort: SortState,
    page: PageState,
    // page and size restored from a link, applied once results arrive
    requested_page: usize,
    requested_size: PageSize,
    phase: Phase,
    current: Option<ResultView>,
    thumbs: Vec<JoinHandle<()>>,
}

impl<R: Renderer, H: History> SearchController<R, H> {
    /// Take over the page in `Loading` state for the query and state carried by `link`.
    pub fn new(api: Arc<dyn AssetApi>, renderer: R, history: H, link: LinkState, cfg: ControllerConfig) -> Self {
        let query = normalize_query(&link.query);
        let tokens = Tokens::from_query(&query);
        let highlighter = Highlighter::new(tokens.as_slice());
        let mut this = Self {
            api,
            renderer,
            history,
            cfg,
            query,
            tokens,
            highlighter,
            entries: Vec::new(),
            sort: link.sort,
            page: PageState::default(),
            requested_page: link.current_page.max(1),
            requested_size: link.entries_per_page,
            phase: Phase::Loading,
            current: None,
            thumbs: Vec::new(),
        };
        let view = ResultView::Loading { title: title_for(&this.query) };
        this.show(view);
        this
    }

    /// Issue the search fetch and settle on its outcome.
    pub async fn load(&mut self) {
        if self.phase != Phase::Loading {
            warn!(phase = ?self.phase, "load ignored: results already settled");
            return;
        }
        let t0 = Instant::now();
        info!(query = %self.query, "search: fetch start");
        let result = self.api.search(&self.query).await;
        metrics::histogram!("search_fetch_ms", t0.elapsed().as_secs_f64() * 1_000.0);
        self.settle(result);
    }

    /// Leave `Loading` with a fetch outcome. Later calls are ignored.
    pub fn settle(&mut self, result: AssetResult<Vec<Entry>>) {
        if self.phase != Phase::Loading {
            warn!(phase = ?self.phase, "settle ignored: results already settled");
            return;
        }
        let title = title_for(&self.query);
        match result {
            Err(e) => {
                metrics::counter!("search_fetch_total", 1u64, "outcome" => "error");
                warn!(error = %e, query = %self.query, "search: fetch failed");
                let message = format!("Search failed: {}", e);
                self.phase = Phase::Failed(message.clone());
                self.show(ResultView::Failed { title, message });
            }
            Ok(entries) if entries.is_empty() => {
                metrics::counter!("search_fetch_total", 1u64, "outcome" => "empty");
                info!(query = %self.query, "search: no results");
                self.phase = Phase::Empty;
                self.page.set_page_size(self.requested_size, 0, false);
                self.show(ResultView::Empty { title, digest: digest_for(0) });
                self.sync_link();
            }
            Ok(entries) => {
                metrics::counter!("search_fetch_total", 1u64, "outcome" => "ok");
                metrics::gauge!("search_results", entries.len() as f64);
                info!(query = %self.query, count = entries.len(), "search: results ready");
                self.entries = entries;
                self.phase = Phase::Populated;
                sort_entries(&mut self.entries, self.sort);
                let count = self.entries.len();
                self.page.set_count(count);
                self.page.set_page(self.requested_page);
                // the restored page survives the initial page size
                self.page.set_page_size(self.requested_size, count, false);
                self.refresh();
            }
        }
    }

    /// Apply a new sort. Unchanged state is a no-op; otherwise the view returns to page 1.
    pub fn set_sort(&mut self, sort: SortState) -> bool {
        if self.phase != Phase::Populated || sort == self.sort {
            return false;
        }
        self.sort = sort;
        sort_entries(&mut self.entries, sort);
        self.page.set_page(1);
        self.refresh();
        true
    }

    /// Follow a navigation control. Targets outside `1..=total_pages` are refused, matching
    /// the disabled state of the corresponding button.
    pub fn go_to(&mut self, target: NavTarget) -> bool {
        if self.phase != Phase::Populated {
            return false;
        }
        let want = target.resolve(self.page.current_page());
        if want < 1 || want > self.page.total_pages() {
            return false;
        }
        if !self.page.set_page(want) {
            return false;
        }
        self.refresh();
        true
    }

    pub fn set_page(&mut self, page: usize) -> bool {
        self.go_to(NavTarget::Page(page))
    }

    /// Change entries per page; returns to page 1 when the size actually changes.
    pub fn set_page_size(&mut self, size: PageSize) -> bool {
        if self.phase != Phase::Populated {
            return false;
        }
        if !self.page.set_page_size(size, self.entries.len(), true) {
            return false;
        }
        self.refresh();
        true
    }

    /// The `index`-th card of the current page.
    pub fn entry_at(&self, index: usize) -> Option<&Entry> {
        if self.phase != Phase::Populated {
            return None;
        }
        paginate(&self.entries, &self.page).entries.get(index)
    }

    /// Detail-view location for the `index`-th card of the current page.
    pub fn activate(&self, index: usize) -> Option<String> {
        self.entry_at(index).map(Entry::detail_path)
    }

    pub fn link_state(&self) -> LinkState {
        LinkState {
            query: self.query.clone(),
            sort: self.sort,
            entries_per_page: self.page.page_size(),
            current_page: self.page.current_page(),
        }
    }

    pub fn phase(&self) -> &Phase { &self.phase }
    pub fn query(&self) -> &str { &self.query }
    pub fn tokens(&self) -> &Tokens { &self.tokens }
    pub fn entries(&self) -> &[Entry] { &self.entries }
    pub fn sort(&self) -> SortState { self.sort }
    pub fn page(&self) -> &PageState { &self.page }
    pub fn current_view(&self) -> Option<&ResultView> { self.current.as_ref() }
    pub fn renderer(&self) -> &R { &self.renderer }
    pub fn renderer_mut(&mut self) -> &mut R { &mut self.renderer }
    pub fn history(&self) -> &H { &self.history }

    /// Render the current view again, picking up thumbnails that arrived since.
    pub fn redraw(&mut self) {
        if let Some(view) = self.current.take() {
            self.show(view);
        }
    }

    /// Wait for the thumbnail tasks of the latest render.
    pub async fn settle_thumbnails(&mut self) {
        let pending = std::mem::take(&mut self.thumbs);
        for res in futures::future::join_all(pending).await {
            if let Err(e) = res {
                debug!(error = %e, "thumbnail task ended abnormally");
            }
        }
    }

    fn build_page_view(&self) -> PageView {
        let page = paginate(&self.entries, &self.page);
        let cards = page
            .entries
            .iter()
            .map(|e| Card {
                kind: e.kind,
                id: e.id,
                label: e.label(),
                name: e.name.clone(),
                name_segments: self.highlighter.segments(&e.name),
                name_markup: self.highlighter.highlight(&e.name),
                href: e.detail_path(),
                cover: e.cover.clone(),
                thumbnail: e.is_image().then(ThumbnailSlot::default),
            })
            .collect();
        PageView {
            title: title_for(&self.query),
            digest: digest_for(self.entries.len()),
            total_entries: self.entries.len(),
            sort: self.sort,
            page: self.page,
            cards,
            nav: nav_controls(self.page.current_page(), page.total_pages, self.cfg.radius),
            link: self.link_state().to_href(),
        }
    }

    // Full re-render of the current page, then thumbnails and link sync.
    fn refresh(&mut self) {
        let view = self.build_page_view();
        // earlier tasks are detached, not cancelled
        self.thumbs = view
            .cards
            .iter()
            .filter_map(|c| c.thumbnail.clone().and_then(|slot| spawn_thumbnail(self.api.clone(), c.kind, c.id, slot)))
            .collect();
        debug!(
            page = self.page.current_page(),
            total_pages = self.page.total_pages(),
            cards = view.cards.len(),
            thumbnails = self.thumbs.len(),
            "render page"
        );
        self.show(ResultView::Page(view));
        self.sync_link();
    }

    fn show(&mut self, view: ResultView) {
        metrics::counter!("render_total", 1u64, "view" => view.kind_label());
        self.renderer.render(&view);
        self.current = Some(view);
    }

    fn sync_link(&mut self) {
        let href = self.link_state().to_href();
        if let Err(e) = self.history.replace_state(&href) {
            debug!(error = %e, href = %href, "link sync skipped");
        }
    }
}
