//! Shared building blocks for the review harvester: configuration, the
//! document store, crawl cursors, tokenization and boolean retrieval.

pub mod config;
pub mod cursor;
pub mod document;
pub mod index;
pub mod query;
pub mod stats;
pub mod store;
pub mod tokenizer;

pub use config::{Config, ConfigError};
pub use cursor::{CursorError, CursorFile};
pub use document::{DocMeta, Document};
pub use index::{DocId, InvertedIndex, PostingSet};
pub use query::evaluate;
pub use store::{DocumentStore, SledStore, StoreError, UpsertOutcome};
