//! Search result controller for the asset catalogue.
//!
//! The controller owns the fetched result store together with its sort and page state,
//! re-renders through a [`Renderer`] on every transition and mirrors the state into a
//! shareable link through a [`History`].

#![forbid(unsafe_code)]

pub mod controller;
pub mod detail;
pub mod history;
pub mod model;
pub mod render;
mod thumbs;

pub use controller::{ControllerConfig, Phase, SearchController};
pub use detail::{load_detail, not_found_message, DetailView, Media};
pub use history::{DisabledHistory, FileHistory, History, HistoryError, MemoryHistory};
pub use model::{Card, PageView, ResultView, Thumbnail, ThumbnailSlot, PLACEHOLDER_IMAGE};
pub use render::{html_escape, HtmlRenderer, JsonRenderer, RecordingRenderer, Renderer, TextRenderer};
