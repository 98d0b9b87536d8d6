//! Query language.
//!
//! A query is a list of phrases, optionally split by a single `>` operator, plus
//! mode keywords:
//!
//! ```text
//! hamlet polonius ql
//! 'to be' 'or not' > 'to be' getplay
//! ```
//!
//! When the query contains a `'`, every `'`-separated segment is one token, so a
//! multi-word segment is a single phrase; otherwise every whitespace-separated word
//! is a phrase. Tokens are trimmed and lower-cased.

use crate::error::QueryError;
use crate::index::InvertedIndex;
use crate::ranking::RankingModel;
use crate::tokenizer::fold_query_token;
use crate::DocId;
use serde::{Deserialize, Serialize};

const OPERATOR: &str = ">";
const QL_KEYWORD: &str = "ql";
const COLLECTION_KEYWORD: &str = "getplay";

/// How the output mode of a query is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryDialect {
    /// Mode chosen by the optional `ql` and `getplay` keywords.
    #[default]
    Keywords,
    /// The last token is a mandatory `true`/`false`; `true` reports collections.
    TrailingBoolean,
}

/// One distinct phrase of a query and how many times the query repeats it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTerm {
    pub phrase: String,
    pub frequency: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Phrases in query order, repeats kept.
    pub phrases: Vec<String>,
    /// Phrases before this index form the left operand of `>`.
    pub operator: Option<usize>,
    /// Report parent collections instead of documents.
    pub by_collection: bool,
    pub model: RankingModel,
}

impl ParsedQuery {
    pub fn parse(raw: &str, dialect: QueryDialect) -> Result<Self, QueryError> {
        let mut tokens = split_tokens(raw);

        let mut by_collection = false;
        if dialect == QueryDialect::TrailingBoolean {
            let mode = tokens.pop().map(fold_query_token).ok_or(QueryError::MissingModeToken)?;
            if mode.contains("true") {
                by_collection = true;
            } else if !mode.contains("false") {
                return Err(QueryError::MissingModeToken);
            }
        }

        let mut phrases: Vec<String> = Vec::new();
        let mut operator: Option<usize> = None;
        let mut model = RankingModel::Bm25;
        for token in tokens {
            let token = fold_query_token(token);
            match token.as_str() {
                "" => {}
                OPERATOR => {
                    if operator.replace(phrases.len()).is_some() {
                        return Err(QueryError::MultipleOperators);
                    }
                }
                QL_KEYWORD => model = RankingModel::QueryLikelihood,
                COLLECTION_KEYWORD => by_collection = true,
                _ => phrases.push(token),
            }
        }

        if phrases.is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        if operator == Some(0) {
            tracing::debug!(query = raw, "ignoring '>' with no left operand");
            operator = None;
        }

        Ok(Self { phrases, operator, by_collection, model })
    }

    /// Distinct phrases with their repeat counts, in first-appearance order.
    pub fn term_profile(&self) -> Vec<QueryTerm> {
        let mut profile: Vec<QueryTerm> = Vec::new();
        for phrase in &self.phrases {
            match profile.iter_mut().find(|t| &t.phrase == phrase) {
                Some(term) => term.frequency += 1,
                None => profile.push(QueryTerm { phrase: phrase.clone(), frequency: 1 }),
            }
        }
        profile
    }

    /// Phrase counts for `doc_id`, one per phrase in query order.
    pub fn phrase_counts(&self, index: &InvertedIndex, doc_id: DocId) -> Vec<usize> {
        self.phrases.iter().map(|p| index.count_phrase(p, doc_id)).collect()
    }

    /// Selection predicate for one document.
    ///
    /// Without an operator a document matches if any phrase occurs in it. With one,
    /// the left phrases must occur strictly more often than the right phrases.
    pub fn matches(&self, index: &InvertedIndex, doc_id: DocId) -> bool {
        let counts = self.phrase_counts(index, doc_id);
        match self.operator {
            Some(split) => {
                let (left, right) = counts.split_at(split.min(counts.len()));
                left.iter().sum::<usize>() > right.iter().sum::<usize>()
            }
            None => counts.iter().sum::<usize>() > 0,
        }
    }

    /// All matching documents, in index order.
    pub fn select(&self, index: &InvertedIndex) -> Vec<DocId> {
        (0..index.num_docs() as DocId).filter(|&doc_id| self.matches(index, doc_id)).collect()
    }
}

fn split_tokens(raw: &str) -> Vec<&str> {
    if !raw.contains('\'') {
        return raw.split_whitespace().collect();
    }
    // Blank segments are dropped so a trailing mode segment is always last.
    raw.split('\'').filter(|segment| !segment.trim().is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Document;

    fn parse(raw: &str) -> ParsedQuery {
        ParsedQuery::parse(raw, QueryDialect::Keywords).unwrap()
    }

    fn corpus() -> InvertedIndex {
        InvertedIndex::build(vec![
            Document::new("s1", "p1", "hamlet hamlet polonius"),
            Document::new("s2", "p1", "hamlet polonius polonius"),
            Document::new("s3", "p2", "hamlet polonius"),
            Document::new("s4", "p2", "the ghost"),
        ])
        .unwrap()
    }

    #[test]
    fn space_delimited_words_are_phrases() {
        let q = parse("Hamlet  POLONIUS");
        assert_eq!(q.phrases, vec!["hamlet", "polonius"]);
        assert_eq!(q.operator, None);
        assert_eq!(q.model, RankingModel::Bm25);
        assert!(!q.by_collection);
    }

    #[test]
    fn quoted_phrases_keep_their_words_together() {
        let q = parse("'foo bar' 'baz' > 'Qux quux' 'ql' 'getplay'");
        assert_eq!(q.phrases, vec!["foo bar", "baz", "qux quux"]);
        assert_eq!(q.operator, Some(2));
        assert_eq!(q.model, RankingModel::QueryLikelihood);
        assert!(q.by_collection);
    }

    #[test]
    fn unquoted_segments_between_quotes_stay_whole() {
        let q = parse("'to be' or not");
        assert_eq!(q.phrases, vec!["to be", "or not"]);

        let q = parse("'to be' '>' or not ");
        assert_eq!(q.phrases, vec!["to be", "or not"]);
        assert_eq!(q.operator, Some(1));

        // An operator sharing a segment with words is part of that phrase.
        let q = parse("'to be' > or not");
        assert_eq!(q.phrases, vec!["to be", "> or not"]);
        assert_eq!(q.operator, None);

        // Keywords sharing a segment with other words are not keywords.
        let q = parse("'to be' ql getplay");
        assert_eq!(q.phrases, vec!["to be", "ql getplay"]);
        assert_eq!(q.model, RankingModel::Bm25);
    }

    #[test]
    fn operator_splits_multi_word_segments() {
        let idx = InvertedIndex::build(vec![Document::new("d1", "p", "to be or x not")]).unwrap();
        // "to be" once vs the bigram "or not" never
        let q = parse("'to be' '>' or not");
        assert_eq!(q.phrase_counts(&idx, 0), vec![1, 0]);
        assert_eq!(q.select(&idx), vec![0]);
    }

    #[test]
    fn leading_operator_is_ignored() {
        let q = parse("> hamlet polonius");
        assert_eq!(q.operator, None);
        assert_eq!(q.phrases.len(), 2);
    }

    #[test]
    fn malformed_queries() {
        assert_eq!(ParsedQuery::parse("  ", QueryDialect::Keywords), Err(QueryError::EmptyQuery));
        assert_eq!(ParsedQuery::parse("ql getplay", QueryDialect::Keywords), Err(QueryError::EmptyQuery));
        assert_eq!(
            ParsedQuery::parse("a > b > c", QueryDialect::Keywords),
            Err(QueryError::MultipleOperators)
        );
    }

    #[test]
    fn trailing_boolean_dialect() {
        let q = ParsedQuery::parse("'to be' > 'not' true", QueryDialect::TrailingBoolean).unwrap();
        assert_eq!(q.phrases, vec!["to be", "not"]);
        assert_eq!(q.operator, Some(1));
        assert!(q.by_collection);

        let q = ParsedQuery::parse("hamlet FALSE", QueryDialect::TrailingBoolean).unwrap();
        assert_eq!(q.phrases, vec!["hamlet"]);
        assert!(!q.by_collection);

        assert_eq!(
            ParsedQuery::parse("hamlet polonius", QueryDialect::TrailingBoolean),
            Err(QueryError::MissingModeToken)
        );
        assert_eq!(ParsedQuery::parse("", QueryDialect::TrailingBoolean), Err(QueryError::MissingModeToken));
        assert_eq!(ParsedQuery::parse("true", QueryDialect::TrailingBoolean), Err(QueryError::EmptyQuery));
    }

    #[test]
    fn profile_counts_repeated_phrases() {
        let q = parse("'to be' or 'to be' not or 'or'");
        let profile = q.term_profile();
        assert_eq!(
            profile,
            vec![
                QueryTerm { phrase: "to be".into(), frequency: 2 },
                QueryTerm { phrase: "or".into(), frequency: 2 },
                QueryTerm { phrase: "not or".into(), frequency: 1 },
            ]
        );
    }

    #[test]
    fn selection_without_operator_needs_any_occurrence() {
        let idx = corpus();
        assert_eq!(parse("polonius").select(&idx), vec![0, 1, 2]);
        assert_eq!(parse("ghost missing").select(&idx), vec![3]);
        assert!(parse("missing").select(&idx).is_empty());
    }

    #[test]
    fn selection_with_operator_is_strict() {
        let idx = corpus();
        // s1: 2 > 1, s2: 1 > 2 fails, s3: 1 > 1 fails, s4: 0 > 0 fails
        assert_eq!(parse("hamlet > polonius").select(&idx), vec![0]);
        assert_eq!(parse("polonius > hamlet").select(&idx), vec![1]);
    }

    #[test]
    fn operator_groups_quoted_phrases() {
        let idx = corpus();
        // "hamlet polonius" occurs once in s1, s2, s3; "hamlet hamlet" only in s1.
        let q = parse("'hamlet polonius' > 'hamlet hamlet'");
        assert_eq!(q.phrase_counts(&idx, 0), vec![1, 1]);
        assert_eq!(q.select(&idx), vec![1, 2]);
    }
}
