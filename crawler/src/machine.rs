use reviewdex_core::cursor::{CursorError, CursorFile};
use reviewdex_core::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Running(u32),
    Exhausted,
    Interrupted,
}

#[derive(Debug, Error)]
pub enum MachineError {
    #[error("cannot advance a crawl in state {0:?}")]
    NotRunning(CrawlState),

    #[error(transparent)]
    Cursor(#[from] CursorError),

    #[error("documents could not be made durable: {0}")]
    Store(#[from] StoreError),
}

/// Per-source catalog cursor. The persisted page only ever moves forward
/// after a page was fully processed, so a restart re-attempts the page that
/// was in flight.
#[derive(Debug)]
pub struct CrawlStateMachine {
    source: String,
    page: u32,
    state: CrawlState,
    cursors: CursorFile,
}

impl CrawlStateMachine {
    /// Start at the persisted page for `source`, or page 1.
    pub fn resume(source: &str, cursors: CursorFile) -> Result<Self, CursorError> {
        let page = cursors.load(source)?;
        tracing::debug!(source, page, "resuming crawl cursor");
        Ok(Self { source: source.to_string(), page, state: CrawlState::Running(page), cursors })
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Current cursor value, in any state.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, CrawlState::Running(_))
    }

    /// Move past a page that yielded at least one article link.
    pub fn advance(&mut self) -> Result<(), MachineError> {
        if !self.is_running() {
            return Err(MachineError::NotRunning(self.state));
        }
        let next = self.page + 1;
        self.cursors.save(&self.source, next)?;
        self.page = next;
        self.state = CrawlState::Running(next);
        Ok(())
    }

    /// End of catalog or page-level failure. The cursor stays put.
    pub fn stop(&mut self) {
        if self.is_running() {
            self.state = CrawlState::Exhausted;
        }
    }

    /// External cancellation: persist the current page and terminate.
    pub fn interrupt(&mut self) -> Result<(), CursorError> {
        if !self.is_running() {
            return Ok(());
        }
        self.cursors.save(&self.source, self.page)?;
        self.state = CrawlState::Interrupted;
        Ok(())
    }
}
