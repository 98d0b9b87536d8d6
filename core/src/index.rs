use crate::error::IndexError;
use crate::tokenizer::{phrase_words, tokenize};
use crate::{DocId, Position};
use std::collections::{HashMap, HashSet};

/// Occurrences of one term in one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    /// 1-based word offsets, strictly increasing.
    pub positions: Vec<Position>,
}

impl Posting {
    fn new(doc_id: DocId, position: Position) -> Self {
        Self { doc_id, positions: vec![position] }
    }

    pub fn contains_position(&self, position: Position) -> bool {
        self.positions.binary_search(&position).is_ok()
    }

    /// Term frequency within the document.
    pub fn frequency(&self) -> usize {
        self.positions.len()
    }
}

/// An indexed scene.
#[derive(Debug, Clone)]
pub struct Document {
    /// External document id (the scene id).
    pub id: String,
    /// Parent collection (the play the scene belongs to).
    pub collection_id: String,
    pub tokens: Vec<String>,
}

impl Document {
    pub fn new(id: impl Into<String>, collection_id: impl Into<String>, text: &str) -> Self {
        Self { id: id.into(), collection_id: collection_id.into(), tokens: tokenize(text) }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Positional inverted index over a fixed set of documents.
///
/// Built once by [`InvertedIndex::build`]; immutable afterwards.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    // term -> postings, sorted by doc_id, at most one per document
    postings: HashMap<String, Vec<Posting>>,
    // indexed by DocId
    docs: Vec<Document>,
    collection_size: u64,
}

impl InvertedIndex {
    /// Index `documents` in the order given. Document ids must be unique.
    pub fn build<I>(documents: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = Document>,
    {
        let mut index = Self::default();
        let mut seen: HashSet<String> = HashSet::new();
        for doc in documents {
            if !seen.insert(doc.id.clone()) {
                return Err(IndexError::DuplicateDocument(doc.id));
            }
            index.add_document(doc);
        }
        tracing::info!(
            num_docs = index.docs.len(),
            num_terms = index.postings.len(),
            collection_size = index.collection_size,
            "built inverted index"
        );
        Ok(index)
    }

    fn add_document(&mut self, doc: Document) {
        let doc_id = self.docs.len() as DocId;
        for (i, token) in doc.tokens.iter().enumerate() {
            let position = (i + 1) as Position;
            match self.postings.get_mut(token.as_str()) {
                Some(list) => match list.last_mut() {
                    // Documents are added in DocId order, so this document's posting, if any, is last.
                    Some(last) if last.doc_id == doc_id => last.positions.push(position),
                    _ => list.push(Posting::new(doc_id, position)),
                },
                None => {
                    self.postings.insert(token.clone(), vec![Posting::new(doc_id, position)]);
                }
            }
        }
        self.collection_size += doc.len() as u64;
        self.docs.push(doc);
    }

    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    pub fn num_terms(&self) -> usize {
        self.postings.len()
    }

    pub fn document(&self, doc_id: DocId) -> Option<&Document> {
        self.docs.get(doc_id as usize)
    }

    /// Postings list of a single indexed word (empty if the word never occurs).
    pub fn postings(&self, word: &str) -> &[Posting] {
        self.postings.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The posting of `word` in `doc_id`, if the word occurs there.
    pub fn posting(&self, word: &str, doc_id: DocId) -> Option<&Posting> {
        let list = self.postings.get(word)?;
        list.binary_search_by_key(&doc_id, |p| p.doc_id).ok().map(|i| &list[i])
    }

    /// Number of contiguous, ordered occurrences of `phrase` in `doc_id`.
    ///
    /// A single-word phrase degenerates to the word's term frequency.
    pub fn phrase_occurrences<S: AsRef<str>>(&self, phrase: &[S], doc_id: DocId) -> usize {
        if phrase.is_empty() {
            return 0;
        }
        let mut postings: Vec<&Posting> = Vec::with_capacity(phrase.len());
        for word in phrase {
            match self.posting(word.as_ref(), doc_id) {
                Some(p) => postings.push(p),
                // A missing word means the phrase cannot occur here.
                None => return 0,
            }
        }
        let Some((first, rest)) = postings.split_first() else {
            return 0;
        };
        first
            .positions
            .iter()
            .filter(|&&start| {
                rest.iter()
                    .zip(1..)
                    .all(|(posting, k)| posting.contains_position(start + k))
            })
            .count()
    }

    /// [`Self::phrase_occurrences`] for a phrase written as one whitespace-separated string.
    pub fn count_phrase(&self, phrase: &str, doc_id: DocId) -> usize {
        let words: Vec<&str> = phrase_words(phrase).collect();
        self.phrase_occurrences(&words, doc_id)
    }

    /// Concatenated postings of every word in `phrase`.
    ///
    /// This is not phrase semantics: it backs document- and collection-frequency
    /// statistics ("documents containing any of the words").
    pub fn word_union_postings(&self, phrase: &str) -> Vec<&Posting> {
        phrase_words(phrase).flat_map(|w| self.postings(w)).collect()
    }

    /// Number of distinct documents containing at least one word of `phrase`.
    pub fn document_frequency(&self, phrase: &str) -> usize {
        let docs: HashSet<DocId> =
            self.word_union_postings(phrase).into_iter().map(|p| p.doc_id).collect();
        docs.len()
    }

    /// Total occurrences of the words of `phrase` across the corpus.
    pub fn term_appearance_count(&self, phrase: &str) -> usize {
        self.word_union_postings(phrase).iter().map(|p| p.frequency()).sum()
    }

    /// Sum of all document lengths.
    pub fn collection_size(&self) -> u64 {
        self.collection_size
    }

    /// NaN for an empty corpus.
    pub fn average_document_length(&self) -> f64 {
        self.collection_size as f64 / self.docs.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(docs: &[(&str, &str, &str)]) -> InvertedIndex {
        InvertedIndex::build(docs.iter().map(|(id, play, text)| Document::new(*id, *play, text)))
            .unwrap()
    }

    #[test]
    fn positions_are_one_based_and_sorted() {
        let idx = index(&[("s1", "p", "a b a c a")]);
        let p = idx.posting("a", 0).unwrap();
        assert_eq!(p.positions, vec![1, 3, 5]);
        assert!(p.contains_position(3));
        assert!(!p.contains_position(2));
    }

    #[test]
    fn one_posting_per_document() {
        let idx = index(&[("s1", "p", "x x"), ("s2", "p", "y"), ("s3", "p", "x")]);
        let list = idx.postings("x");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].doc_id, 0);
        assert_eq!(list[1].doc_id, 2);
        assert_eq!(idx.num_terms(), 2);
        assert_eq!(idx.num_docs(), 3);
        assert!(idx.postings("zzz").is_empty());
    }

    #[test]
    fn bigram_counts_only_adjacent_pairs() {
        let idx = index(&[("s1", "p", "x a b y a z b")]);
        assert_eq!(idx.phrase_occurrences(&["a", "b"], 0), 1);
        assert_eq!(idx.count_phrase("a b", 0), 1);
        assert_eq!(idx.count_phrase("b a", 0), 0);
    }

    #[test]
    fn single_word_phrase_is_term_frequency() {
        let idx = index(&[("s1", "p", "a b a c a")]);
        assert_eq!(idx.count_phrase("a", 0), 3);
        assert_eq!(idx.count_phrase("c", 0), 1);
    }

    #[test]
    fn absent_word_zeroes_phrase() {
        let idx = index(&[("s1", "p", "a a a a"), ("s2", "p", "b")]);
        assert_eq!(idx.count_phrase("a b", 0), 0);
        assert_eq!(idx.count_phrase("a", 1), 0);
        assert_eq!(idx.phrase_occurrences::<&str>(&[], 0), 0);
    }

    #[test]
    fn overlapping_phrase_occurrences_all_count() {
        let idx = index(&[("s1", "p", "a a a")]);
        assert_eq!(idx.count_phrase("a a", 0), 2);
    }

    #[test]
    fn duplicate_document_is_rejected() {
        let err = InvertedIndex::build(vec![
            Document::new("s1", "p", "a"),
            Document::new("s1", "q", "b"),
        ])
        .unwrap_err();
        assert_eq!(err, IndexError::DuplicateDocument("s1".into()));
    }

    #[test]
    fn corpus_statistics() {
        let idx = index(&[("s1", "p", "to be or not to be"), ("s2", "p", "to be is to exist")]);
        assert_eq!(idx.collection_size(), 11);
        assert!((idx.average_document_length() - 5.5).abs() < 1e-12);
        assert_eq!(idx.document_frequency("to be"), 2);
        assert_eq!(idx.document_frequency("exist"), 1);
        assert_eq!(idx.word_union_postings("to be").len(), 4);
        assert_eq!(idx.term_appearance_count("to be"), 7);
        assert_eq!(idx.term_appearance_count("nothing"), 0);
    }

    #[test]
    fn index_keeps_source_case() {
        let idx = index(&[("s1", "p", "Hamlet hamlet")]);
        assert_eq!(idx.count_phrase("hamlet", 0), 1);
        assert_eq!(idx.count_phrase("Hamlet", 0), 1);
    }
}
