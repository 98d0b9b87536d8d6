use crate::index::InvertedIndex;
use crate::ranking::{RankingModel, Scores};
use crate::DocId;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

/// One reported hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    /// 1-based rank among distinct identities.
    pub rank: usize,
    /// Document id, or collection id when results are grouped by collection.
    pub identity: String,
    pub algorithm: &'static str,
    pub score: f64,
}

/// Order `docs` by descending score and keep the first `limit` distinct identities.
///
/// Ties keep the order of `docs`.
pub fn top_results(
    index: &InvertedIndex,
    docs: &[DocId],
    scores: &Scores,
    model: RankingModel,
    by_collection: bool,
    limit: usize,
) -> Vec<RankedResult> {
    let score_of = |doc_id: &DocId| scores.get(doc_id).copied().unwrap_or(0.0);
    let mut ordered: Vec<DocId> = docs.to_vec();
    ordered.sort_by(|a, b| score_of(b).partial_cmp(&score_of(a)).unwrap_or(Ordering::Equal));

    let mut seen: HashSet<&str> = HashSet::new();
    let mut results = Vec::new();
    for doc_id in ordered {
        if results.len() >= limit {
            break;
        }
        let Some(doc) = index.document(doc_id) else {
            continue;
        };
        let identity = if by_collection { doc.collection_id.as_str() } else { doc.id.as_str() };
        if !seen.insert(identity) {
            continue;
        }
        results.push(RankedResult {
            rank: results.len() + 1,
            identity: identity.to_string(),
            algorithm: model.name(),
            score: score_of(&doc_id),
        });
    }
    results
}

/// Text report: the raw query, then `<rank> <identity> <algorithm> <score>` per line.
pub fn render_results(query: &str, results: &[RankedResult]) -> String {
    let mut out = format!("{query}\n");
    for r in results {
        out.push_str(&format!("{} {} {} {}\n", r.rank, r.identity, r.algorithm, r.score));
    }
    out
}
