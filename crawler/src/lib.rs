//! Catalog crawler: pages through review listings, extracts article text and
//! keeps it in the document store.

pub mod catalog;
pub mod extract;
pub mod fetch;
pub mod machine;
pub mod run;

pub use fetch::{FetchError, FetchOutcome, Fetcher};
pub use machine::{CrawlState, CrawlStateMachine, MachineError};
pub use run::{CrawlSettings, Crawler, SourceReport};
