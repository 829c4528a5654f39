use crate::document::{DocMeta, Document};
use crate::tokenizer::tokenize;
use std::collections::{BTreeSet, HashMap};

pub type DocId = u32;
pub type PostingSet = BTreeSet<DocId>;

/// Term to the set of documents containing it. Document ids are positions in
/// the snapshot the index was built from.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InvertedIndex {
    pub postings: HashMap<String, PostingSet>,
    pub docs: Vec<DocMeta>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Index every document of a snapshot. Building twice from the same
    /// snapshot gives equal indexes.
    pub fn build(snapshot: &[Document]) -> Self {
        let mut index = Self::new();
        for doc in snapshot {
            index.add(doc);
        }
        tracing::debug!(num_docs = index.docs.len(), num_terms = index.postings.len(), "built inverted index");
        index
    }

    /// Append one document and return the id it was given.
    pub fn add(&mut self, doc: &Document) -> DocId {
        let doc_id = self.docs.len() as DocId;
        for term in tokenize(&doc.clean_text) {
            self.postings.entry(term).or_default().insert(doc_id);
        }
        self.docs.push(DocMeta::from(doc));
        doc_id
    }

    /// Posting set for an already-stemmed term.
    pub fn postings(&self, term: &str) -> Option<&PostingSet> {
        self.postings.get(term)
    }

    pub fn doc(&self, doc_id: DocId) -> Option<&DocMeta> {
        self.docs.get(doc_id as usize)
    }

    pub fn num_docs(&self) -> usize { self.docs.len() }

    pub fn num_terms(&self) -> usize { self.postings.len() }
}
