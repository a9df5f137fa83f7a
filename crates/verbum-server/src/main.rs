use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use verbum_core::{Config, EditionData, OpenAIClient};

mod routes;

use routes::AppState;

#[derive(Parser)]
#[command(name = "verbum-server")]
#[command(about = "Serves edition files and proxies commentary prompts for Verbum")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Address to listen on
        #[arg(short, long)]
        bind: Option<String>,
        /// Directory holding {edition}.json files
        #[arg(short = 'd', long)]
        bibles_dir: Option<PathBuf>,
    },
    /// Rewrite a legacy edition file into the wrapped document format
    Restructure {
        /// Edition file to read
        input: PathBuf,
        /// Where to write the rewritten document
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve {
        bind: None,
        bibles_dir: None,
    }) {
        Commands::Serve { bind, bibles_dir } => serve(bind, bibles_dir).await?,
        Commands::Restructure { input, output } => restructure(&input, &output)?,
    }

    Ok(())
}

async fn serve(bind: Option<String>, bibles_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::load()?;
    let settings = config.server;

    let api_key = settings
        .api_key
        .ok_or_else(|| anyhow!("{} must be set", verbum_core::config::API_KEY_ENV))?;
    let bibles_dir = bibles_dir.unwrap_or(settings.bibles_dir);
    let addr: SocketAddr = bind
        .unwrap_or(settings.bind)
        .parse()
        .context("invalid bind address")?;

    let client = OpenAIClient::new(&settings.provider_url, &api_key, &settings.model)
        .with_attempts(config.retry_attempts);
    tracing::info!(model = client.model(), provider = %settings.provider_url, "commentary provider ready");

    let state = Arc::new(AppState {
        backend: Arc::new(client),
    });
    let app = routes::router(state, &bibles_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(bibles = %bibles_dir.display(), "Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn restructure(input: &Path, output: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let mut data = EditionData::from_json(&raw).with_context(|| format!("parsing {}", input.display()))?;
    data.fill_display_names();

    std::fs::write(output, serde_json::to_string(&data)?)
        .with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(books = data.books.len(), output = %output.display(), "edition restructured");
    Ok(())
}
