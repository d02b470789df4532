use std::io::{IsTerminal, Stdout};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use assetview_api::{ApiConfig, AssetApi, HttpApi};
use assetview_core::{AssetType, LinkState, PageSize, SortState};
use assetview_view::{
    load_detail, not_found_message, ControllerConfig, DetailView, FileHistory, History, HtmlRenderer, JsonRenderer, MemoryHistory,
    Phase, Renderer, ResultView, SearchController, TextRenderer,
};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

mod session;

#[derive(Parser, Debug)]
#[command(name = "assetctl", version, about = "Asset catalogue search CLI")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// Backend base URL
    #[arg(long = "api", env = "ASSETVIEW_API_BASE", global = true)]
    api: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json, Html }

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum SortKey { Name, Id }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search the catalogue and show one page of results
    Search {
        /// Query words; quoted phrases stay one token
        query: Vec<String>,
        /// Start from a shared search link (full URL or query string)
        #[arg(long = "link", conflicts_with = "query")]
        link: Option<String>,
        #[arg(long = "sort", value_enum)]
        sort: Option<SortKey>,
        /// Descending order
        #[arg(long = "desc", action = ArgAction::SetTrue)]
        desc: bool,
        #[arg(long = "page")]
        page: Option<usize>,
        /// Entries per page (12..=96, step 12)
        #[arg(long = "size")]
        size: Option<usize>,
        /// Wait for card thumbnails before printing
        #[arg(long = "thumbnails", action = ArgAction::SetTrue)]
        thumbnails: bool,
        /// Keep the results open and read navigation commands from stdin
        #[arg(short = 'i', long = "interactive", action = ArgAction::SetTrue)]
        interactive: bool,
        /// Mirror the current link into this file
        #[arg(long = "link-file")]
        link_file: Option<PathBuf>,
    },
    /// Show the catalogue manifest summary
    Manifest,
    /// Show one object's detail view: properties, dependencies, media and caption
    View {
        /// `assetbundle` or `resource`
        kind: String,
        id: u64,
    },
    /// Download one object's bytestream
    Fetch {
        /// `assetbundle` or `resource`
        kind: String,
        id: u64,
        /// Write the payload here
        #[arg(long = "out")]
        out: Option<PathBuf>,
    },
}

fn init_tracing() {
    let env = std::env::var("ASSETVIEW_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("ASSETVIEW_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid ASSETVIEW_METRICS_ADDR; expected host:port");
        }
    }
}

/// Terminal sink for result views. The transient loading view only goes to the log.
enum Sink {
    Text(TextRenderer<Stdout>),
    Json(JsonRenderer<Stdout>),
    Html(HtmlRenderer),
}

impl Sink {
    fn new(output: Output) -> Self {
        match output {
            Output::Human => Sink::Text(TextRenderer::new(std::io::stdout(), std::io::stdout().is_terminal())),
            Output::Json => Sink::Json(JsonRenderer::new(std::io::stdout())),
            Output::Html => Sink::Html(HtmlRenderer::new()),
        }
    }
}

impl Renderer for Sink {
    fn render(&mut self, view: &ResultView) {
        if let ResultView::Loading { title } = view {
            info!(title = %title, "loading results");
            return;
        }
        match self {
            Sink::Text(r) => r.render(view),
            Sink::Json(r) => r.render(view),
            Sink::Html(r) => {
                r.render(view);
                print!("{}", r.html());
            }
        }
    }
}

/// Keeps only the last view; the one-shot search prints it once at the end.
#[derive(Default)]
struct LastView(Option<ResultView>);

impl Renderer for LastView {
    fn render(&mut self, view: &ResultView) { self.0 = Some(view.clone()); }
}

fn parse_kind(kind: &str) -> Result<AssetType> {
    AssetType::parse(kind).ok_or_else(|| anyhow!("unknown asset type `{}` (expected assetbundle or resource)", kind))
}

/// A failed fetch ends the command with an error in every mode.
fn settled(phase: &Phase) -> Result<()> {
    match phase {
        Phase::Failed(msg) => Err(anyhow!("{}", msg)),
        _ => Ok(()),
    }
}

fn print_detail(view: &DetailView, output: Output) -> Result<()> {
    match output {
        Output::Human => print!("{}", view.to_text()),
        Output::Json => println!("{}", serde_json::to_string_pretty(view)?),
        Output::Html => print!("{}", view.to_html()),
    }
    Ok(())
}

fn build_api(base: Option<String>) -> Result<Arc<dyn AssetApi>> {
    let mut cfg = ApiConfig::from_env();
    if let Some(b) = base {
        cfg = cfg.with_base(b);
    }
    let api = HttpApi::new(&cfg).map_err(|e| anyhow!("api client: {}", e))?;
    info!(base = %api.base_url(), timeout = ?cfg.timeout, "api client ready");
    Ok(Arc::new(api))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();
    let base = cli.api.clone().unwrap_or_else(|| ApiConfig::from_env().base_url);
    let base = base.trim_end_matches('/').to_string();
    let api = build_api(cli.api.clone())?;

    match cli.command {
        Commands::Search { query, link, sort, desc, page, size, thumbnails, interactive, link_file } => {
            let mut state = match link {
                Some(l) => LinkState::parse(&l),
                None => LinkState::for_query(query.join(" ")),
            };
            if let Some(key) = sort {
                state.sort = SortState { by_id: key == SortKey::Id, ascending: !desc };
            } else if desc {
                state.sort.ascending = false;
            }
            if let Some(n) = size {
                state.entries_per_page = PageSize::new(n);
            }
            if let Some(p) = page {
                state.current_page = p.max(1);
            }
            info!(query = %state.query, sort = ?state.sort, page = state.current_page, size = state.entries_per_page.get(), "search invoked");

            let history: Box<dyn History> = match link_file {
                Some(path) => Box::new(FileHistory::new(path, base.clone())),
                None => Box::new(MemoryHistory::new()),
            };
            let cfg = ControllerConfig::from_env();

            if interactive {
                let mut c = SearchController::new(api.clone(), Sink::new(cli.output), history, state, cfg);
                c.load().await;
                settled(c.phase())?;
                if matches!(c.phase(), Phase::Populated) {
                    session::run(&mut c, api.as_ref(), &base, cli.output).await?;
                }
            } else {
                let mut c = SearchController::new(api, LastView::default(), history, state, cfg);
                c.load().await;
                if thumbnails {
                    c.settle_thumbnails().await;
                }
                let mut sink = Sink::new(cli.output);
                if let Some(view) = c.current_view() {
                    sink.render(view);
                }
                debug!(link = %c.link_state().to_href(), "final link");
                settled(c.phase())?;
            }
        }
        Commands::Manifest => {
            info!("manifest invoked");
            let m = api.manifest().await.map_err(|e| anyhow!("manifest: {}", e))?;
            match cli.output {
                Output::Human | Output::Html => {
                    println!("revision:     {}", m.revision);
                    println!("assetbundles: {}", m.assetbundle_count);
                    println!("resources:    {}", m.resource_count);
                }
                Output::Json => println!("{}", serde_json::to_string_pretty(&m)?),
            }
        }
        Commands::View { kind, id } => {
            let kind = parse_kind(&kind)?;
            info!(kind = %kind, id, "view invoked");
            let view = load_detail(api.as_ref(), kind, id).await.map_err(|e| {
                debug!(error = %e, "detail fetch failed");
                anyhow!("{}", not_found_message(kind, id))
            })?;
            print_detail(&view, cli.output)?;
        }
        Commands::Fetch { kind, id, out } => {
            let kind = parse_kind(&kind)?;
            info!(kind = %kind, id, "fetch invoked");
            let blob = api.bytestream(kind, id).await.map_err(|e| anyhow!("fetch {} #{}: {}", kind, id, e))?;
            if let Some(path) = &out {
                tokio::fs::write(path, &blob.bytes).await.with_context(|| format!("write {}", path.display()))?;
            }
            match cli.output {
                Output::Json => {
                    #[derive(serde::Serialize)]
                    struct Row<'a> { kind: AssetType, id: u64, mimetype: &'a str, size: usize, out: Option<String> }
                    let row = Row { kind, id, mimetype: &blob.mimetype, size: blob.bytes.len(), out: out.as_ref().map(|p| p.display().to_string()) };
                    println!("{}", serde_json::to_string_pretty(&row)?);
                }
                Output::Human | Output::Html => {
                    println!("{} #{} • {} • {} bytes", kind, id, blob.mimetype, blob.bytes.len());
                    if let Some(path) = &out {
                        println!("written to {}", path.display());
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetview_api::{AssetError, MockApi, ObjectInfo};
    use assetview_view::RecordingRenderer;

    #[tokio::test]
    async fn failed_interactive_search_is_an_error() {
        let mut c = SearchController::new(
            Arc::new(MockApi::failing(AssetError::Transport("refused".into()))),
            RecordingRenderer::default(),
            MemoryHistory::new(),
            LinkState::for_query("bgm"),
            ControllerConfig::default(),
        );
        c.load().await;
        assert!(settled(c.phase()).is_err());
        assert!(settled(&Phase::Empty).is_ok());
        assert!(settled(&Phase::Populated).is_ok());
    }

    #[tokio::test]
    async fn view_renders_every_output() {
        let mut api = MockApi::new();
        api.objects.insert((AssetType::AssetBundle, 7), ObjectInfo::new(7, "ui_common"));
        let view = load_detail(&api, AssetType::AssetBundle, 7).await.unwrap();
        for output in [Output::Human, Output::Json, Output::Html] {
            print_detail(&view, output).unwrap();
        }
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["title"], "AssetBundle #7");
        assert!(parse_kind("texture").is_err());
    }
}
