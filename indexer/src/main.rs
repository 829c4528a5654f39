use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reviewdex_core::stats::{term_frequencies, token_report, write_frequency_tsv, CorpusStats};
use reviewdex_core::{evaluate, Config, Document, DocumentStore, InvertedIndex, SledStore};
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

/// Exit status when the document store cannot be opened.
const EXIT_STORE_UNAVAILABLE: u8 = 2;

/// Hits printed per query in the interactive loop.
const REPL_SHOWN_HITS: usize = 3;

const EXIT_KEYWORD: &str = "exit";

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build the boolean index over stored documents and query it", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file (defaults apply when it is missing)
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print corpus sizes and tokenization throughput
    Stats,
    /// Write the rank/term/frequency table of stemmed terms as TSV
    Freq {
        #[arg(long, default_value = "term_frequencies.tsv")]
        output: PathBuf,
    },
    /// Evaluate a single boolean query, e.g. "сюжет AND персонажи NOT скучно"
    Search {
        query: String,
        /// Maximum number of matching urls to print
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Interactive query loop; type `exit` to leave
    Repl,
}

fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = %cli.config.display(), error = %e, "failed to load configuration");
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

    match run(cli.command, &store) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, store: &SledStore) -> Result<()> {
    let docs = store.snapshot().context("reading document snapshot")?;
    if docs.is_empty() {
        println!("The store is empty, run the crawler first.");
        return Ok(());
    }

    match command {
        Commands::Stats => print_stats(&docs),
        Commands::Freq { output } => {
            let freqs = term_frequencies(&docs);
            let file = File::create(&output).with_context(|| format!("creating {}", output.display()))?;
            write_frequency_tsv(&freqs, BufWriter::new(file))?;
            println!("Wrote {} terms to {}", freqs.len(), output.display());
        }
        Commands::Search { query, limit } => {
            let index = build_index(&docs);
            let stdout = io::stdout();
            print_hits(&index, &query, limit, &mut stdout.lock())?;
        }
        Commands::Repl => {
            let index = build_index(&docs);
            let stdin = io::stdin();
            let stdout = io::stdout();
            repl(&index, stdin.lock(), stdout.lock())?;
        }
    }
    Ok(())
}

fn build_index(docs: &[Document]) -> InvertedIndex {
    let start = Instant::now();
    let index = InvertedIndex::build(docs);
    tracing::info!(num_docs = index.num_docs(), num_terms = index.num_terms(), elapsed_ms = start.elapsed().as_millis() as u64, "index built");
    index
}

fn print_stats(docs: &[Document]) {
    let corpus = CorpusStats::collect(docs);
    println!("=== Corpus ===");
    println!("Documents:                {}", corpus.documents);
    println!("Raw HTML size:            {:.2} KB", corpus.raw_bytes as f64 / 1024.0);
    println!("Clean text size:          {:.2} KB", corpus.clean_bytes as f64 / 1024.0);
    println!("Average HTML per doc:     {:.2} bytes", corpus.avg_raw_bytes());
    println!("Average text per doc:     {:.2} bytes", corpus.avg_clean_bytes());

    let tokens = token_report(docs);
    println!("=== Tokenization ===");
    println!("Tokens:                   {}", tokens.tokens);
    println!("Average token length:     {:.2}", tokens.avg_token_len());
    println!("Elapsed:                  {:.4} s", tokens.elapsed.as_secs_f64());
    match tokens.kb_per_sec() {
        Some(speed) => println!("Throughput:               {speed:.2} KB/s"),
        None => println!("Throughput:               too little text to measure"),
    }
}

fn print_hits<W: Write>(index: &InvertedIndex, query: &str, limit: usize, out: &mut W) -> io::Result<()> {
    let hits = evaluate(index, query);
    writeln!(out, "Found documents: {}", hits.len())?;
    for doc_id in hits.iter().take(limit) {
        if let Some(meta) = index.doc(*doc_id) {
            writeln!(out, "- {}", meta.url)?;
        }
    }
    Ok(())
}

/// Read queries line by line until `exit` or end of input.
fn repl<R: BufRead, W: Write>(index: &InvertedIndex, input: R, mut out: W) -> io::Result<()> {
    write!(out, "query> ")?;
    out.flush()?;
    for line in input.lines() {
        let line = line?;
        let query = line.trim();
        if query == EXIT_KEYWORD {
            break;
        }
        if !query.is_empty() {
            print_hits(index, query, REPL_SHOWN_HITS, &mut out)?;
        }
        write!(out, "query> ")?;
        out.flush()?;
    }
    Ok(())
}
