use crate::catalog::discover_links;
use crate::extract::extract;
use crate::fetch::{FetchOutcome, Fetcher};
use crate::machine::{CrawlState, CrawlStateMachine, MachineError};
use reviewdex_core::config::{Config, SourceConfig};
use reviewdex_core::cursor::CursorFile;
use reviewdex_core::document::now_unix_seconds;
use reviewdex_core::{Document, DocumentStore, UpsertOutcome};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Pause between the end of one request and the start of the next.
    pub delay: Duration,
    pub reindex_threshold_secs: f64,
    pub min_body_chars: usize,
}

impl From<&Config> for CrawlSettings {
    fn from(config: &Config) -> Self {
        Self {
            delay: config.delay(),
            reindex_threshold_secs: config.reindex_threshold_secs(),
            min_body_chars: config.logic.min_body_chars,
        }
    }
}

/// Per-source tallies, reported once the source's crawl ends.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source: String,
    pub final_state: CrawlState,
    /// Cursor value when the crawl ended.
    pub page: u32,
    pub pages_completed: u32,
    pub stored: usize,
    pub fresh: usize,
    pub too_short: usize,
    pub failed: usize,
}

impl SourceReport {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            final_state: CrawlState::Running(1),
            page: 1,
            pages_completed: 0,
            stored: 0,
            fresh: 0,
            too_short: 0,
            failed: 0,
        }
    }
}

/// Keeps a full `delay` between the end of one request and the start of the
/// next. Waiting is abandoned as soon as the token is cancelled.
struct Pacer {
    delay: Duration,
    finished: Option<Instant>,
}

impl Pacer {
    /// Returns false when cancelled while waiting.
    async fn wait(&mut self, cancel: &CancellationToken) -> bool {
        if let Some(finished) = self.finished {
            let remaining = self.delay.saturating_sub(finished.elapsed());
            if !remaining.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(remaining) => {}
                    _ = cancel.cancelled() => return false,
                }
            }
        }
        !cancel.is_cancelled()
    }

    fn request_done(&mut self) {
        self.finished = Some(Instant::now());
    }
}

/// Walks each source's catalog one page at a time, storing every article that
/// yields enough text.
pub struct Crawler<S: DocumentStore> {
    fetcher: Fetcher,
    store: S,
    cursors: CursorFile,
    settings: CrawlSettings,
    pacer: Pacer,
}

impl<S: DocumentStore> Crawler<S> {
    pub fn new(fetcher: Fetcher, store: S, cursors: CursorFile, settings: CrawlSettings) -> Self {
        let pacer = Pacer { delay: settings.delay, finished: None };
        Self { fetcher, store, cursors, settings, pacer }
    }

    /// Crawl every source in order. Stops early once `cancel` fires; the
    /// interrupted source's cursor is persisted before returning.
    pub async fn run(&mut self, sources: &[SourceConfig], cancel: &CancellationToken) -> Result<Vec<SourceReport>, MachineError> {
        let mut reports = Vec::with_capacity(sources.len());
        for source in sources {
            let report = self.crawl_source(source, cancel).await?;
            let interrupted = report.final_state == CrawlState::Interrupted;
            reports.push(report);
            if interrupted {
                break;
            }
        }
        Ok(reports)
    }

    #[tracing::instrument(skip_all, fields(source = %source.name))]
    pub async fn crawl_source(&mut self, source: &SourceConfig, cancel: &CancellationToken) -> Result<SourceReport, MachineError> {
        let mut machine = CrawlStateMachine::resume(&source.name, self.cursors.clone())?;
        let mut report = SourceReport::new(&source.name);
        tracing::info!(page = machine.page(), "starting crawl");

        while machine.is_running() {
            if cancel.is_cancelled() || !self.pacer.wait(cancel).await {
                self.store.flush()?;
                machine.interrupt()?;
                break;
            }

            let page = machine.page();
            let url = source.catalog_url(page);
            tracing::info!(page, %url, "fetching catalog page");
            let outcome = self.fetcher.fetch(&url).await;
            self.pacer.request_done();
            let body = match outcome {
                FetchOutcome::Ok(body) => body,
                FetchOutcome::NotFound => {
                    tracing::info!(page, "catalog page not found, end of catalog");
                    machine.stop();
                    break;
                }
                FetchOutcome::Error(e) => {
                    tracing::warn!(page, error = %e, "catalog page failed, stopping this source");
                    machine.stop();
                    break;
                }
            };

            let links = discover_links(&body, source);
            if links.is_empty() {
                tracing::info!(page, "no article links on page, end of catalog");
                machine.stop();
                break;
            }
            tracing::info!(page, links = links.len(), "found article links");

            let completed = self.crawl_articles(source, &links, cancel, &mut report).await;
            // the page's documents must reach disk before the cursor moves past it
            self.store.flush()?;
            if completed {
                machine.advance()?;
                report.pages_completed += 1;
            } else {
                tracing::info!(page, "interrupted mid-page, page will be re-attempted");
                machine.interrupt()?;
            }
        }

        report.final_state = machine.state();
        report.page = machine.page();
        tracing::info!(
            state = ?report.final_state,
            page = report.page,
            stored = report.stored,
            fresh = report.fresh,
            too_short = report.too_short,
            failed = report.failed,
            "crawl finished"
        );
        Ok(report)
    }

    /// Process every link of one page. Returns false if cancelled before the
    /// page was complete.
    async fn crawl_articles(&mut self, source: &SourceConfig, links: &[String], cancel: &CancellationToken, report: &mut SourceReport) -> bool {
        for link in links {
            if cancel.is_cancelled() {
                return false;
            }
            if self.is_fresh(link) {
                tracing::info!(url = %link, "stored copy is fresh, skipping");
                report.fresh += 1;
                continue;
            }
            if !self.pacer.wait(cancel).await {
                return false;
            }
            self.crawl_article(source, link, report).await;
            self.pacer.request_done();
        }
        true
    }

    async fn crawl_article(&self, source: &SourceConfig, url: &str, report: &mut SourceReport) {
        let html = match self.fetcher.fetch(url).await {
            FetchOutcome::Ok(html) => html,
            FetchOutcome::NotFound => {
                tracing::warn!(%url, "article not found");
                report.failed += 1;
                return;
            }
            FetchOutcome::Error(e) => {
                tracing::warn!(%url, error = %e, "article fetch failed");
                report.failed += 1;
                return;
            }
        };

        let extracted = extract(&html);
        let chars = extracted.body.chars().count();
        if chars <= self.settings.min_body_chars {
            tracing::warn!(%url, chars, strategy = ?extracted.strategy, "article text missing or too short, not stored");
            report.too_short += 1;
            return;
        }
        tracing::debug!(%url, chars, strategy = ?extracted.strategy, "extracted article");

        let doc = Document::fetched_now(url.to_string(), source.name.clone(), html, extracted.title, extracted.body);
        match self.store.upsert(&doc, self.settings.reindex_threshold_secs) {
            Ok(UpsertOutcome::SkippedFresh) => {
                tracing::info!(%url, "stored copy is fresh, not overwritten");
                report.fresh += 1;
            }
            Ok(outcome) => {
                let title: String = doc.title.chars().take(30).collect();
                tracing::info!(%url, %title, ?outcome, "saved document");
                report.stored += 1;
            }
            Err(e) => {
                tracing::error!(%url, error = %e, "failed to write document");
                report.failed += 1;
            }
        }
    }

    /// True when a stored copy is younger than the staleness threshold, so
    /// the article need not be fetched at all.
    fn is_fresh(&self, url: &str) -> bool {
        match self.store.get(url) {
            Ok(Some(existing)) => now_unix_seconds() - existing.timestamp < self.settings.reindex_threshold_secs,
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(%url, error = %e, "failed to read stored document, refetching");
                false
            }
        }
    }
}
