pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod query;
pub mod ranking;
pub mod results;
pub mod search;
pub mod tokenizer;

/// Dense, build-order identifier of a document inside one index.
pub type DocId = u32;
/// 1-based word offset within a document.
pub type Position = u32;

pub use config::SearchConfig;
pub use error::{IndexError, QueryError};
pub use index::{Document, InvertedIndex, Posting};
pub use query::{ParsedQuery, QueryDialect};
pub use ranking::{Bm25Params, QlParams, RankingModel, Scores};
pub use results::RankedResult;
pub use search::{SearchOutcome, Searcher};
