use crate::query::QueryDialect;
use crate::ranking::{Bm25Params, QlParams};
use serde::{Deserialize, Serialize};

/// Number of distinct identities reported per query.
pub const DEFAULT_TOP_K: usize = 5;

/// Settings shared by every query run against one index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub dialect: QueryDialect,
    pub top_k: usize,
    pub bm25: Bm25Params,
    pub ql: QlParams,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            dialect: QueryDialect::default(),
            top_k: DEFAULT_TOP_K,
            bm25: Bm25Params::default(),
            ql: QlParams::default(),
        }
    }
}
