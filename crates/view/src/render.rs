//! Result renderers. Each render replaces the previous output entirely.

#![forbid(unsafe_code)]

use std::fmt::Write as _;
use std::io::Write;

use assetview_search::{NavItem, NavTarget, Segment};
use crossterm::style::Stylize;
use tracing::warn;

use crate::model::{Card, PageView, ResultView, PLACEHOLDER_IMAGE};

pub trait Renderer {
    fn render(&mut self, view: &ResultView);
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, view: &ResultView) { (**self).render(view) }
}

/// Minimal HTML escaping for untrusted text (before inserting <mark> tags).
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Keeps every view it was handed, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    views: Vec<ResultView>,
}

impl RecordingRenderer {
    pub fn views(&self) -> &[ResultView] { &self.views }
    pub fn last(&self) -> Option<&ResultView> { self.views.last() }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, view: &ResultView) { self.views.push(view.clone()); }
}

/// HTML fragment for the result container.
///
/// Names are escaped segment by segment so `<mark>` stays the only markup a name can carry.
/// Thumbnails fill in asynchronously; [`HtmlRenderer::refresh`] re-renders the last view with
/// whatever has arrived.
#[derive(Debug, Default, Clone)]
pub struct HtmlRenderer {
    last: Option<ResultView>,
    html: String,
}

impl HtmlRenderer {
    pub fn new() -> Self { Self::default() }

    pub fn html(&self) -> &str { &self.html }

    pub fn refresh(&mut self) -> &str {
        if let Some(view) = &self.last {
            self.html = html_for(view);
        }
        &self.html
    }
}

impl Renderer for HtmlRenderer {
    fn render(&mut self, view: &ResultView) {
        self.html = html_for(view);
        self.last = Some(view.clone());
    }
}

fn html_for(view: &ResultView) -> String {
    let mut out = String::with_capacity(1024);
    let _ = writeln!(out, "<h1>{}</h1>", html_escape(view.title()));
    match view {
        ResultView::Loading { .. } => out.push_str("<p class=\"loading\">Loading...</p>\n"),
        ResultView::Failed { message, .. } => {
            let _ = writeln!(out, "<p class=\"error\">{}</p>", html_escape(message));
        }
        ResultView::Empty { digest, .. } => {
            let _ = writeln!(out, "<p class=\"digest\">{}</p>", html_escape(digest));
        }
        ResultView::Page(p) => page_html(&mut out, p),
    }
    out
}

fn page_html(out: &mut String, p: &PageView) {
    let _ = writeln!(out, "<p class=\"digest\">{}</p>", html_escape(&p.digest));
    out.push_str("<ul class=\"results\">\n");
    for card in &p.cards {
        card_html(out, card);
    }
    out.push_str("</ul>\n<nav class=\"pages\">\n");
    for item in &p.nav {
        match item {
            NavItem::Button { target, enabled } => {
                let current = matches!(target, NavTarget::Page(n) if *n == p.page.current_page());
                let _ = writeln!(
                    out,
                    "<button data-target=\"{}\"{}{}>{}</button>",
                    target.label().to_lowercase(),
                    if current { " class=\"current\"" } else { "" },
                    if *enabled { "" } else { " disabled" },
                    target.label()
                );
            }
            NavItem::Ellipsis => out.push_str("<span class=\"ellipsis\">...</span>\n"),
        }
    }
    out.push_str("</nav>\n");
}

fn card_html(out: &mut String, card: &Card) {
    let _ = write!(out, "<li class=\"card\"><a href=\"{}\">", html_escape(&card.href));
    if let Some(slot) = &card.thumbnail {
        let src = slot.get().map(|t| t.src.as_str()).unwrap_or(PLACEHOLDER_IMAGE);
        let _ = write!(out, "<img src=\"{}\" alt=\"\">", html_escape(src));
    }
    let _ = write!(out, "<span class=\"label\">{}</span><span class=\"name\">", html_escape(&card.label));
    for seg in &card.name_segments {
        match seg {
            Segment::Plain(s) => out.push_str(&html_escape(s)),
            Segment::Emphasis(s) => {
                let _ = write!(out, "<mark>{}</mark>", html_escape(s));
            }
        }
    }
    out.push_str("</span></a></li>\n");
}

/// Plain terminal listing. With `color` matches are highlighted, otherwise wrapped in `*`.
pub struct TextRenderer<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W, color: bool) -> Self { Self { out, color } }

    pub fn into_inner(self) -> W { self.out }

    fn name(&self, segments: &[Segment]) -> String {
        let mut s = String::new();
        for seg in segments {
            match seg {
                Segment::Plain(t) => s.push_str(t),
                Segment::Emphasis(t) if self.color => {
                    let _ = write!(s, "{}", t.as_str().bold().yellow());
                }
                Segment::Emphasis(t) => {
                    let _ = write!(s, "*{}*", t);
                }
            }
        }
        s
    }

    fn text_for(&self, view: &ResultView) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "{}", view.title());
        match view {
            ResultView::Loading { .. } => s.push_str("Loading...\n"),
            ResultView::Failed { message, .. } => {
                let _ = writeln!(s, "{}", message);
            }
            ResultView::Empty { digest, .. } => {
                let _ = writeln!(s, "{}", digest);
            }
            ResultView::Page(p) => {
                let _ = writeln!(
                    s,
                    "{}  (sort: {} {}, page {}/{}, {} per page)",
                    p.digest,
                    if p.sort.by_id { "id" } else { "name" },
                    if p.sort.ascending { "asc" } else { "desc" },
                    p.page.current_page(),
                    p.page.total_pages(),
                    p.page.page_size().get()
                );
                for (i, card) in p.cards.iter().enumerate() {
                    let thumb = match &card.thumbnail {
                        Some(slot) => match slot.get() {
                            Some(t) if !t.placeholder => format!("  [{}]", t.mimetype),
                            Some(_) => "  [no image]".to_string(),
                            None => "  [image]".to_string(),
                        },
                        None => String::new(),
                    };
                    let _ = writeln!(s, "{:>3}. {:<20} {}{}", i + 1, card.label, self.name(&card.name_segments), thumb);
                }
                let nav: Vec<String> = p
                    .nav
                    .iter()
                    .map(|item| match item {
                        NavItem::Button { target: NavTarget::Page(n), .. } if *n == p.page.current_page() => format!("[{}]", n),
                        NavItem::Button { enabled: false, .. } => format!("({})", item.label()),
                        _ => item.label(),
                    })
                    .collect();
                let _ = writeln!(s, "{}", nav.join(" "));
            }
        }
        s
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, view: &ResultView) {
        let text = self.text_for(view);
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            warn!(error = %e, "text render failed");
        }
    }
}

/// One JSON document per render, newline separated.
pub struct JsonRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self { Self { out } }

    pub fn into_inner(self) -> W { self.out }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render(&mut self, view: &ResultView) {
        let res = serde_json::to_writer(&mut self.out, view)
            .map_err(std::io::Error::from)
            .and_then(|_| self.out.write_all(b"\n"))
            .and_then(|_| self.out.flush());
        if let Err(e) = res {
            warn!(error = %e, "json render failed");
        }
    }
}
