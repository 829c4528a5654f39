use crate::document::Document;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached at all (missing permissions, locked by
    /// another process, corrupt files).
    #[error("failed to open document store at {path}: {source}")]
    Open { path: String, source: sled::Error },

    #[error("storage error: {0}")]
    Sled(#[from] sled::Error),

    #[error("failed to encode or decode record: {0}")]
    Codec(#[from] bincode::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// What `upsert` did with a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
    /// An existing record is younger than the staleness threshold.
    SkippedFresh,
}

/// Durable collection of documents keyed by url.
pub trait DocumentStore {
    fn get(&self, url: &str) -> StoreResult<Option<Document>>;

    /// Replace (or insert) the full record stored under `doc.url`.
    fn put(&self, doc: &Document) -> StoreResult<()>;

    /// Every stored document, ordered by url.
    fn snapshot(&self) -> StoreResult<Vec<Document>>;

    fn len(&self) -> usize;

    /// Block until every write made so far is durable.
    fn flush(&self) -> StoreResult<()>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write `doc` unless a record for the same url was fetched less than
    /// `threshold_secs` before it. The comparison uses `doc.timestamp` as "now".
    fn upsert(&self, doc: &Document, threshold_secs: f64) -> StoreResult<UpsertOutcome> {
        let outcome = match self.get(&doc.url)? {
            Some(existing) if doc.timestamp - existing.timestamp < threshold_secs => {
                return Ok(UpsertOutcome::SkippedFresh);
            }
            Some(_) => UpsertOutcome::Replaced,
            None => UpsertOutcome::Inserted,
        };
        self.put(doc)?;
        Ok(outcome)
    }
}

/// sled-backed store; one tree per collection. Cloning shares the same tree.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P, collection: &str) -> StoreResult<Self> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|source| StoreError::Open { path: path.display().to_string(), source })?;
        Self::from_db(db, collection)
    }

    /// In-memory store that disappears on drop.
    pub fn temporary(collection: &str) -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open().map_err(|source| StoreError::Open { path: "<temporary>".into(), source })?;
        Self::from_db(db, collection)
    }

    fn from_db(db: sled::Db, collection: &str) -> StoreResult<Self> {
        let tree = db.open_tree(collection)?;
        Ok(Self { db, tree })
    }
}

impl DocumentStore for SledStore {
    fn get(&self, url: &str) -> StoreResult<Option<Document>> {
        match self.tree.get(url.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put(&self, doc: &Document) -> StoreResult<()> {
        let bytes = bincode::serialize(doc)?;
        // a single insert replaces the whole value, so a record is never half-written
        self.tree.insert(doc.url.as_bytes(), bytes)?;
        Ok(())
    }

    fn snapshot(&self) -> StoreResult<Vec<Document>> {
        let mut docs = Vec::with_capacity(self.tree.len());
        for entry in self.tree.iter() {
            let (_, bytes) = entry?;
            docs.push(bincode::deserialize(&bytes)?);
        }
        Ok(docs)
    }

    fn len(&self) -> usize {
        self.tree.len()
    }

    fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}
