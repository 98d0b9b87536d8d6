//! Relevance models.
//!
//! Both models score only the documents they are given and write into a
//! query-scoped [`Scores`] map; nothing is stored on the index.

use crate::index::InvertedIndex;
use crate::query::QueryTerm;
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-query document scores.
pub type Scores = HashMap<DocId, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    pub k1: f64,
    pub k2: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, k2: 100.0, b: 0.75 }
    }
}

/// Jelinek-Mercer smoothing weight of the collection model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QlParams {
    pub lambda: f64,
}

impl Default for QlParams {
    fn default() -> Self {
        Self { lambda: 0.8 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingModel {
    #[default]
    Bm25,
    #[serde(rename = "ql")]
    QueryLikelihood,
}

impl RankingModel {
    pub fn name(self) -> &'static str {
        match self {
            RankingModel::Bm25 => "bm25",
            RankingModel::QueryLikelihood => "ql",
        }
    }

    pub fn score(
        self,
        index: &InvertedIndex,
        profile: &[QueryTerm],
        docs: &[DocId],
        bm25: &Bm25Params,
        ql: &QlParams,
    ) -> Scores {
        match self {
            RankingModel::Bm25 => score_bm25(index, profile, docs, bm25),
            RankingModel::QueryLikelihood => score_ql(index, profile, docs, ql),
        }
    }
}

impl std::fmt::Display for RankingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// BM25 with query-term-frequency saturation.
///
/// The idf factor is `log2(1 / ((n + 0.5) / (N - n + 0.5)))`, where `n` counts
/// documents containing any word of the phrase.
pub fn score_bm25(
    index: &InvertedIndex,
    profile: &[QueryTerm],
    docs: &[DocId],
    params: &Bm25Params,
) -> Scores {
    let Bm25Params { k1, k2, b } = *params;
    let total_docs = index.num_docs() as f64;
    let avg_len = index.average_document_length();
    // idf depends only on the phrase
    let idfs: Vec<f64> = profile
        .iter()
        .map(|term| {
            let n = index.document_frequency(&term.phrase) as f64;
            (1.0 / ((n + 0.5) / (total_docs - n + 0.5))).log2()
        })
        .collect();

    let mut scores = Scores::with_capacity(docs.len());
    for &doc_id in docs {
        let doc_len = index.document(doc_id).map_or(0, |d| d.len()) as f64;
        let norm = k1 * ((1.0 - b) + b * (doc_len / avg_len));
        let mut score = 0.0;
        for (term, idf) in profile.iter().zip(&idfs) {
            let tf = index.count_phrase(&term.phrase, doc_id) as f64;
            if tf == 0.0 {
                continue;
            }
            let qf = term.frequency as f64;
            score += idf * (((k1 + 1.0) * tf) / (norm + tf)) * (((k2 + 1.0) * qf) / (k2 + qf));
        }
        scores.insert(doc_id, score);
    }
    scores
}

/// Query likelihood: sum over present phrases of
/// `log2((1 - lambda) * tf / dl + lambda * cf / cs)`.
pub fn score_ql(
    index: &InvertedIndex,
    profile: &[QueryTerm],
    docs: &[DocId],
    params: &QlParams,
) -> Scores {
    let lambda = params.lambda;
    let collection_size = index.collection_size() as f64;
    let cfs: Vec<f64> =
        profile.iter().map(|term| index.term_appearance_count(&term.phrase) as f64).collect();

    let mut scores = Scores::with_capacity(docs.len());
    for &doc_id in docs {
        let doc_len = index.document(doc_id).map_or(0, |d| d.len()) as f64;
        let mut score = 0.0;
        for (term, cf) in profile.iter().zip(&cfs) {
            let tf = index.count_phrase(&term.phrase, doc_id) as f64;
            if tf == 0.0 {
                continue;
            }
            score += ((1.0 - lambda) * (tf / doc_len) + lambda * (cf / collection_size)).log2();
        }
        scores.insert(doc_id, score);
    }
    scores
}
