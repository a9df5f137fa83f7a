use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use verbum_core::{
    CommentaryBackend, CommentaryState, Config, Cursor, DirFetcher, EditionCatalog, EditionFetcher, HttpFetcher,
    KeyValueStore, NavigationState, ProxyCommentary, SqliteStore, TextSource,
};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "verbum")]
#[command(about = "Read the Bible across editions with AI commentary on words and verses")]
struct Cli {
    /// Edition to open (LATVUL, ENGVUL, KJV, LXXTR, WLC)
    #[arg(short, long)]
    edition: Option<String>,
    /// Book to open
    #[arg(short, long)]
    book: Option<String>,
    /// Chapter to open
    #[arg(short, long)]
    chapter: Option<u32>,
    /// Read editions from this directory instead of the content server
    #[arg(short = 'd', long)]
    bibles_dir: Option<PathBuf>,
    /// Start in continuous-script mode
    #[arg(long)]
    continuous: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init()?;

    let mut config = Config::load()?;
    if let Some(dir) = cli.bibles_dir {
        config.bibles_dir = Some(dir);
    }

    let mut cursor = Cursor::from(&config.start);
    if cli.edition.is_some() {
        cursor.edition = cli.edition;
    }
    if cli.book.is_some() {
        cursor.book = cli.book;
    }
    if cli.chapter.is_some() {
        cursor.chapter = cli.chapter;
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open(&SqliteStore::default_path()?)?);
    let fetcher: Arc<dyn EditionFetcher> = match &config.bibles_dir {
        Some(dir) => Arc::new(DirFetcher::new(dir)),
        None => Arc::new(HttpFetcher::new(&config.content_url)),
    };
    let backend: Arc<dyn CommentaryBackend> =
        Arc::new(ProxyCommentary::new(&config.commentary_url, config.retry_attempts));

    let source = Arc::new(TextSource::new(fetcher, Arc::clone(&store)));
    let mut nav = NavigationState::new(source, EditionCatalog::default(), cursor);
    nav.selection_mut().set_continuous(config.continuous || cli.continuous);
    nav.load_chapter().await;
    tracing::info!(title = %nav.title(), "session started");

    let commentary = CommentaryState::new(store, config.cache_capacity);
    let mut app = App::new(nav, commentary, backend);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event).await?;
    }

    Ok(())
}
