use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use reviewdex_core::{evaluate, DocId, Document, InvertedIndex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const SNIPPET_CHARS: usize = 200;
const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

/// Hits carry no score; they come back in document-id order.
#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<InvertedIndex>,
    /// Clean text per document id.
    pub texts: Arc<Vec<String>>,
}

impl AppState {
    pub fn from_snapshot(docs: &[Document]) -> Self {
        let index = InvertedIndex::build(docs);
        let texts = docs.iter().map(|d| d.clean_text.clone()).collect();
        Self { index: Arc::new(index), texts: Arc::new(texts) }
    }
}

/// Router over an index built from `docs`. The store itself is not kept open.
pub fn build_app(docs: &[Document]) -> Router {
    let state = AppState::from_snapshot(docs);
    tracing::info!(num_docs = state.index.num_docs(), num_terms = state.index.num_terms(), "index ready");

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let hits = evaluate(&state.index, &params.q);
    let k = params.k.clamp(1, MAX_K);

    let results = hits
        .iter()
        .take(k)
        .filter_map(|&doc_id| {
            let meta = state.index.doc(doc_id)?;
            let snippet = state.texts.get(doc_id as usize).map(|t| t.chars().take(SNIPPET_CHARS).collect()).unwrap_or_default();
            Some(SearchHit { doc_id, title: meta.title.clone(), url: meta.url.clone(), snippet })
        })
        .collect();

    tracing::debug!(query = %params.q, total_hits = hits.len(), "search");
    Json(SearchResponse { query: params.q, took_s: start.elapsed().as_secs_f64(), total_hits: hits.len(), results })
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> (StatusCode, Json<serde_json::Value>) {
    match state.index.doc(doc_id) {
        Some(meta) => {
            let text = state.texts.get(doc_id as usize).cloned().unwrap_or_default();
            (StatusCode::OK, Json(serde_json::json!({
                "doc_id": doc_id,
                "title": meta.title,
                "url": meta.url,
                "text": text,
            })))
        }
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" }))),
    }
}
