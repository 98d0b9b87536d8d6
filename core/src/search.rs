use crate::config::SearchConfig;
use crate::error::QueryError;
use crate::index::InvertedIndex;
use crate::query::ParsedQuery;
use crate::ranking::RankingModel;
use crate::results::{top_results, RankedResult};

/// Everything produced by one query.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub query: ParsedQuery,
    /// Number of documents that satisfied the selection predicate.
    pub total_hits: usize,
    pub model: RankingModel,
    pub results: Vec<RankedResult>,
}

/// Runs queries against a borrowed index.
///
/// Scores live only for the duration of [`Searcher::execute`], so one index can
/// serve any number of searchers at once.
#[derive(Debug, Clone, Copy)]
pub struct Searcher<'a> {
    index: &'a InvertedIndex,
    config: SearchConfig,
}

impl<'a> Searcher<'a> {
    pub fn new(index: &'a InvertedIndex, config: SearchConfig) -> Self {
        Self { index, config }
    }

    /// Parse, select, rank and format `raw`, keeping at most `top_k` identities.
    pub fn execute(&self, raw: &str) -> Result<SearchOutcome, QueryError> {
        self.execute_with_limit(raw, self.config.top_k)
    }

    pub fn execute_with_limit(&self, raw: &str, limit: usize) -> Result<SearchOutcome, QueryError> {
        let query = ParsedQuery::parse(raw, self.config.dialect)?;
        let selected = query.select(self.index);
        let profile = query.term_profile();
        let model = query.model;
        tracing::debug!(
            phrases = ?query.phrases,
            operator = ?query.operator,
            model = %model,
            selected = selected.len(),
            "evaluated query"
        );

        let scores = model.score(self.index, &profile, &selected, &self.config.bm25, &self.config.ql);
        let results =
            top_results(self.index, &selected, &scores, model, query.by_collection, limit);
        Ok(SearchOutcome { total_hits: selected.len(), model, results, query })
    }
}
