//! Line-oriented interactive driver for a loaded result set.

#![forbid(unsafe_code)]

use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use assetview_api::AssetApi;
use assetview_core::{AssetType, PageSize, SortState};
use assetview_search::NavTarget;
use assetview_view::{load_detail, not_found_message, History, Renderer, SearchController};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{debug, info, warn};

use crate::{print_detail, Output};

pub const HELP: &str = "commands: next | prev | first | last | page N | size N | sort id|name | asc | desc | open N | link | redraw | help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Prev,
    First,
    Last,
    Page(usize),
    Size(usize),
    SortBy { by_id: bool },
    Ascending(bool),
    Open(usize),
    Link,
    Redraw,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let head = parts.next().ok_or_else(|| anyhow!("empty command"))?.to_ascii_lowercase();
        let arg = parts.next();
        if parts.next().is_some() {
            bail!("too many arguments: {}", s.trim());
        }
        let num = |what: &str| -> Result<usize> {
            arg.ok_or_else(|| anyhow!("{} needs a number", what))?.parse::<usize>().map_err(|e| anyhow!("{}: {}", what, e))
        };
        let cmd = match head.as_str() {
            "next" | "n" => Command::Next,
            "prev" | "p" => Command::Prev,
            "first" => Command::First,
            "last" => Command::Last,
            "page" | "g" => Command::Page(num("page")?),
            "size" => Command::Size(num("size")?),
            "sort" => match arg.map(str::to_ascii_lowercase).as_deref() {
                Some("id") => Command::SortBy { by_id: true },
                Some("name") => Command::SortBy { by_id: false },
                _ => bail!("sort expects `id` or `name`"),
            },
            "asc" => Command::Ascending(true),
            "desc" => Command::Ascending(false),
            "open" | "o" => Command::Open(num("open")?),
            "link" => Command::Link,
            "redraw" | "r" => Command::Redraw,
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => bail!("unknown command `{}`", other),
        };
        if !matches!(cmd, Command::Page(_) | Command::Size(_) | Command::SortBy { .. } | Command::Open(_)) && arg.is_some() {
            bail!("`{}` takes no argument", head);
        }
        Ok(cmd)
    }
}

/// What the session should print after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The view was re-rendered (or nothing changed).
    Done,
    Say(String),
    /// Show the detail view of a card.
    Open { kind: AssetType, id: u64, href: String },
    Quit,
}

/// Apply one command. `base` prefixes the path-only locations it prints.
pub fn apply<R: Renderer, H: History>(c: &mut SearchController<R, H>, cmd: Command, base: &str) -> Reply {
    let changed = match cmd {
        Command::Next => c.go_to(NavTarget::Next),
        Command::Prev => c.go_to(NavTarget::Prev),
        Command::First => c.go_to(NavTarget::Page(1)),
        Command::Last => c.go_to(NavTarget::Page(c.page().total_pages())),
        Command::Page(n) => c.go_to(NavTarget::Page(n)),
        Command::Size(n) => c.set_page_size(PageSize::new(n)),
        Command::SortBy { by_id } => c.set_sort(SortState { by_id, ..c.sort() }),
        Command::Ascending(ascending) => c.set_sort(SortState { ascending, ..c.sort() }),
        Command::Open(n) => {
            return match n.checked_sub(1).and_then(|i| c.entry_at(i)) {
                Some(e) => Reply::Open { kind: e.kind, id: e.id, href: format!("{}{}", base, e.detail_path()) },
                None => Reply::Say(format!("no card #{} on this page", n)),
            };
        }
        Command::Link => return Reply::Say(format!("{}{}", base, c.link_state().to_href())),
        Command::Redraw => {
            c.redraw();
            return Reply::Done;
        }
        Command::Help => return Reply::Say(HELP.to_string()),
        Command::Quit => return Reply::Quit,
    };
    debug!(?cmd, changed, "session command");
    if changed { Reply::Done } else { Reply::Say("(unchanged)".to_string()) }
}

/// Read commands from stdin until `quit`, EOF or Ctrl-C. `open N` prints the card's detail view.
pub async fn run<R: Renderer, H: History>(
    c: &mut SearchController<R, H>,
    api: &dyn AssetApi,
    base: &str,
    output: Output,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprintln!("{}", HELP);
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed; leaving session");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(cmd) => match apply(c, cmd, base) {
                        Reply::Done => {}
                        Reply::Say(s) => println!("{}", s),
                        Reply::Open { kind, id, href } => {
                            println!("{}", href);
                            match load_detail(api, kind, id).await {
                                Ok(view) => print_detail(&view, output)?,
                                Err(e) => {
                                    warn!(kind = %kind, id, error = %e, "detail fetch failed");
                                    eprintln!("{}", not_found_message(kind, id));
                                }
                            }
                        }
                        Reply::Quit => break,
                    },
                    Err(e) => eprintln!("{}", e),
                }
            }
            _ = signal::ctrl_c() => {
                info!("Ctrl-C received; leaving session");
                break;
            }
        }
    }
    Ok(())
}
