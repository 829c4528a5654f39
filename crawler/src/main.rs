use anyhow::{bail, Context, Result};
use clap::Parser;
use crawler::{CrawlSettings, CrawlState, Crawler, Fetcher};
use reviewdex_core::config::SourceConfig;
use reviewdex_core::cursor::FIRST_PAGE;
use reviewdex_core::{Config, CursorFile, DocumentStore, SledStore};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

/// Exit status when the document store cannot be opened.
const EXIT_STORE_UNAVAILABLE: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "crawler")]
#[command(about = "Harvest review articles from paginated catalogs into the document store")]
struct Cli {
    /// Path to the TOML configuration file (defaults apply when it is missing)
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
    /// Only crawl the named source; may be repeated
    #[arg(long = "source")]
    sources: Vec<String>,
    /// Reset the selected sources' cursors to page 1 before crawling
    #[arg(long, default_value_t = false)]
    restart: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Cli::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = %args.config.display(), error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let store = match SledStore::open(config.db.store_path(), &config.db.collection) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "cannot reach the document store, aborting");
            return ExitCode::from(EXIT_STORE_UNAVAILABLE);
        }
    };
    tracing::info!(path = %config.db.store_path().display(), documents = store.len(), "document store opened");

    match crawl(args, config, store).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("crawl aborted: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn crawl(args: Cli, config: Config, store: SledStore) -> Result<()> {
    let sources = select_sources(&config.sources, &args.sources)?;
    let cursors = CursorFile::new(&config.state.path);
    if args.restart {
        for source in &sources {
            cursors.save(&source.name, FIRST_PAGE).with_context(|| format!("resetting cursor for {}", source.name))?;
        }
    }

    let fetcher = Fetcher::new(&config.http).context("building HTTP client")?;

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, finishing current step and saving progress");
            token.cancel();
        }
    });

    let mut crawler = Crawler::new(fetcher, store.clone(), cursors, CrawlSettings::from(&config));
    let outcome = crawler.run(&sources, &cancel).await;
    store.flush().context("flushing document store")?;
    let reports = outcome.context("crawl state could not be persisted")?;

    for report in &reports {
        match report.final_state {
            CrawlState::Interrupted => tracing::info!(source = %report.source, page = report.page, "stopped by user, progress saved"),
            _ => tracing::info!(source = %report.source, page = report.page, pages = report.pages_completed, stored = report.stored, "source done"),
        }
    }
    Ok(())
}

fn select_sources(all: &[SourceConfig], wanted: &[String]) -> Result<Vec<SourceConfig>> {
    if wanted.is_empty() {
        return Ok(all.to_vec());
    }
    let mut selected = Vec::with_capacity(wanted.len());
    for name in wanted {
        match all.iter().find(|s| &s.name == name) {
            Some(source) => selected.push(source.clone()),
            None => bail!("unknown source {name:?}"),
        }
    }
    Ok(selected)
}
