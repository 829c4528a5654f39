use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// A crawled article as kept in the document store, keyed by `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub url: String,
    pub source: String,
    pub raw_html: String,
    pub clean_text: String,
    pub title: String,
    /// Fetch time in unix seconds.
    pub timestamp: f64,
    pub date_str: String,
}

impl Document {
    /// Build a document stamped with the current time.
    pub fn fetched_now(url: String, source: String, raw_html: String, title: String, clean_text: String) -> Self {
        Self::fetched_at(url, source, raw_html, title, clean_text, OffsetDateTime::now_utc())
    }

    pub fn fetched_at(url: String, source: String, raw_html: String, title: String, clean_text: String, at: OffsetDateTime) -> Self {
        let timestamp = unix_seconds(at);
        let date_str = at.format(&Rfc3339).unwrap_or_default();
        Self { url, source, raw_html, clean_text, title, timestamp, date_str }
    }
}

pub fn unix_seconds(at: OffsetDateTime) -> f64 {
    at.unix_timestamp() as f64 + f64::from(at.nanosecond()) / 1e9
}

pub fn now_unix_seconds() -> f64 {
    unix_seconds(OffsetDateTime::now_utc())
}

/// The slice of a document that query surfaces need to display a hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocMeta {
    pub url: String,
    pub title: String,
}

impl From<&Document> for DocMeta {
    fn from(doc: &Document) -> Self {
        Self { url: doc.url.clone(), title: doc.title.clone() }
    }
}
