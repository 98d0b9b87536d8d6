use anyhow::{Context, Result};
use axum::{extract::{Query, State}, http::StatusCode, routing::get, Json, Router};
use scenes_core::corpus::load_corpus;
use scenes_core::{InvertedIndex, RankedResult, SearchConfig, Searcher};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { scenes_core::config::DEFAULT_TOP_K }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub algorithm: &'static str,
    pub took_s: f64,
    /// Documents satisfying the query before ranking and deduplication.
    pub total_hits: usize,
    pub results: Vec<RankedResult>,
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<InvertedIndex>,
    pub config: SearchConfig,
}

/// Load the corpus, build the index once and serve it with default settings.
pub fn build_app<P: AsRef<Path>>(corpus: P) -> Result<Router> {
    let corpus = corpus.as_ref();
    let docs = load_corpus(corpus)?;
    let index = InvertedIndex::build(docs).with_context(|| format!("indexing {}", corpus.display()))?;
    tracing::info!(num_docs = index.num_docs(), num_terms = index.num_terms(), "index ready");
    Ok(build_router(Arc::new(index), SearchConfig::default()))
}

pub fn build_router(index: Arc<InvertedIndex>, config: SearchConfig) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
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
        .with_state(AppState { index, config })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let k = params.k.clamp(1, 100);
    let searcher = Searcher::new(&state.index, state.config);
    let outcome = searcher
        .execute_with_limit(&params.q, k)
        .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;

    let elapsed = start.elapsed();
    Ok(Json(SearchResponse {
        query: params.q,
        algorithm: outcome.model.name(),
        took_s: elapsed.as_secs_f64(),
        total_hits: outcome.total_hits,
        results: outcome.results,
    }))
}
