/// Errors raised while building an index.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Two corpus records share a document id.
    #[error("document already exists: {0}")]
    DuplicateDocument(String),
}

/// Malformed queries. The query is aborted and no partial results are produced.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("query has no terms")]
    EmptyQuery,
    #[error("query must end with a boolean value")]
    MissingModeToken,
    #[error("query has more than one '>' operator")]
    MultipleOperators,
}
