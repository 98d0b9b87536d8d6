use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use scenes_core::corpus::load_corpus;
use scenes_core::results::render_results;
use scenes_core::{Bm25Params, InvertedIndex, QlParams, QueryDialect, SearchConfig, Searcher};
use tracing_subscriber::{fmt, EnvFilter};

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Input line that ends an interactive session.
const END_SENTINEL: &str = "end";

#[derive(Parser)]
#[command(name = "scenes")]
#[command(about = "Phrase search and BM25 / query-likelihood ranking over a scene corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single query and print the ranked results
    Query {
        #[command(flatten)]
        search: SearchArgs,
        /// Query text, e.g. "'to be' > 'not' ql"
        query: String,
    },
    /// Read queries from stdin until a line reading `end`
    Repl {
        #[command(flatten)]
        search: SearchArgs,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Corpus path (JSON/JSONL file or directory)
    #[arg(long)]
    corpus: PathBuf,
    /// Directory receiving one result<N>.txt file per query
    #[arg(long)]
    output: Option<PathBuf>,
    /// Number of distinct results per query
    #[arg(long, default_value_t = scenes_core::config::DEFAULT_TOP_K)]
    top_k: usize,
    /// How the output mode is written in queries
    #[arg(long, value_enum, default_value_t = Dialect::Keywords)]
    dialect: Dialect,
    #[arg(long, default_value_t = Bm25Params::default().k1)]
    k1: f64,
    #[arg(long, default_value_t = Bm25Params::default().k2)]
    k2: f64,
    #[arg(long, default_value_t = Bm25Params::default().b)]
    b: f64,
    /// Query-likelihood smoothing weight
    #[arg(long, default_value_t = QlParams::default().lambda)]
    lambda: f64,
}

#[derive(Clone, Copy, ValueEnum)]
enum Dialect {
    /// `ql` and `getplay` keywords
    Keywords,
    /// Mandatory trailing true/false
    TrailingBoolean,
}

impl SearchArgs {
    fn config(&self) -> SearchConfig {
        SearchConfig {
            dialect: match self.dialect {
                Dialect::Keywords => QueryDialect::Keywords,
                Dialect::TrailingBoolean => QueryDialect::TrailingBoolean,
            },
            top_k: self.top_k,
            bm25: Bm25Params { k1: self.k1, k2: self.k2, b: self.b },
            ql: QlParams { lambda: self.lambda },
        }
    }

    fn build_index(&self) -> Result<InvertedIndex> {
        let docs = load_corpus(&self.corpus)?;
        let index = InvertedIndex::build(docs)
            .with_context(|| format!("indexing {}", self.corpus.display()))?;
        Ok(index)
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Query { search, query } => {
            let index = search.build_index()?;
            let searcher = Searcher::new(&index, search.config());
            let mut sink = ResultSink::new(search.output.as_deref())?;
            sink.emit(&searcher, &query, &mut io::stdout().lock())
        }
        Commands::Repl { search } => {
            let index = search.build_index()?;
            let searcher = Searcher::new(&index, search.config());
            let mut sink = ResultSink::new(search.output.as_deref())?;
            let answered = run_repl(&searcher, &mut sink, io::stdin().lock(), &mut io::stdout().lock())?;
            tracing::info!(answered, "session ended");
            Ok(())
        }
    }
}

/// Where rendered results go: stdout, or numbered files in a directory.
struct ResultSink {
    dir: Option<PathBuf>,
    next: usize,
}

impl ResultSink {
    fn new(dir: Option<&Path>) -> Result<Self> {
        if let Some(dir) = dir {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        Ok(Self { dir: dir.map(Path::to_path_buf), next: 0 })
    }

    /// Run `query` and report it. Malformed queries are reported to `out` and return Ok.
    fn emit<W: Write>(&mut self, searcher: &Searcher<'_>, query: &str, out: &mut W) -> Result<()> {
        let outcome = match searcher.execute(query) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(query, error = %err, "rejected query");
                writeln!(out, "error: {err}")?;
                return Ok(());
            }
        };
        let report = render_results(query, &outcome.results);
        match &self.dir {
            Some(dir) => {
                let path = dir.join(format!("result{}.txt", self.next));
                fs::write(&path, &report).with_context(|| format!("writing {}", path.display()))?;
                writeln!(out, "Result printed to {}.", path.display())?;
            }
            None => out.write_all(report.as_bytes())?,
        }
        self.next += 1;
        Ok(())
    }
}

/// Answer queries line by line until [`END_SENTINEL`] or end of input.
fn run_repl<R: BufRead, W: Write>(
    searcher: &Searcher<'_>,
    sink: &mut ResultSink,
    input: R,
    out: &mut W,
) -> Result<usize> {
    for line in input.lines() {
        let line = line?;
        let query = line.trim_end_matches(['\r', '\n']);
        if query == END_SENTINEL {
            break;
        }
        if query.trim().is_empty() {
            continue;
        }
        sink.emit(searcher, query, out)?;
    }
    Ok(sink.next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenes_core::Document;
    use std::io::Cursor;

    fn index() -> InvertedIndex {
        InvertedIndex::build(vec![
            Document::new("hamlet:1.1", "hamlet", "to be or not to be"),
            Document::new("lear:1.1", "lear", "nothing will come of nothing"),
        ])
        .unwrap()
    }

    #[test]
    fn repl_stops_at_sentinel_and_writes_numbered_files() {
        let index = index();
        let searcher = Searcher::new(&index, SearchConfig::default());
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ResultSink::new(Some(dir.path())).unwrap();
        let input = Cursor::new("nothing\n\nql\n'to be' getplay\nend\nnothing\n");
        let mut out = Vec::new();

        let answered = run_repl(&searcher, &mut sink, input, &mut out).unwrap();
        assert_eq!(answered, 2);

        let first = fs::read_to_string(dir.path().join("result0.txt")).unwrap();
        assert!(first.starts_with("nothing\n1 lear:1.1 bm25 "));
        let second = fs::read_to_string(dir.path().join("result1.txt")).unwrap();
        assert!(second.starts_with("'to be' getplay\n1 hamlet bm25 "));
        assert!(!dir.path().join("result2.txt").exists());

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("error: query has no terms"));
    }

    #[test]
    fn query_without_output_dir_prints_report() {
        let index = index();
        let searcher = Searcher::new(&index, SearchConfig::default());
        let mut sink = ResultSink::new(None).unwrap();
        let mut out = Vec::new();
        sink.emit(&searcher, "nothing ql", &mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = printed.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("1 lear:1.1 ql -"));
    }
}
