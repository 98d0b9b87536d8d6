//! Corpus loading.
//!
//! Scene records look like `{"playId": .., "sceneId": .., "sceneNum": .., "text": ..}` and
//! may arrive as `{"corpus": [..]}`, a bare JSON array, or JSON Lines.

use crate::index::Document;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRecord {
    pub play_id: String,
    pub scene_id: String,
    #[serde(default)]
    pub scene_num: Option<u64>,
    pub text: String,
}

impl From<SceneRecord> for Document {
    fn from(record: SceneRecord) -> Self {
        Document::new(record.scene_id, record.play_id, &record.text)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusFile {
    Wrapped { corpus: Vec<SceneRecord> },
    Records(Vec<SceneRecord>),
    Single(SceneRecord),
}

/// Load every document under `path`: a single file, or all `.json`/`.jsonl` files
/// of a directory tree in path order.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let mut files: Vec<PathBuf> = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name().into_iter() {
            let entry = entry.with_context(|| format!("walking {}", path.display()))?;
            let p = entry.path();
            if p.is_file() && matches!(extension(p), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else {
        files.push(path.to_path_buf());
    }

    let mut docs = Vec::new();
    for file in &files {
        let loaded = if extension(file) == Some("jsonl") { load_jsonl(file) } else { load_json(file) };
        let records = loaded.with_context(|| format!("loading corpus file {}", file.display()))?;
        docs.extend(records.into_iter().map(Document::from));
    }
    tracing::info!(files = files.len(), num_docs = docs.len(), path = %path.display(), "loaded corpus");
    Ok(docs)
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|s| s.to_str())
}

fn load_json(file: &Path) -> Result<Vec<SceneRecord>> {
    let reader = BufReader::new(File::open(file)?);
    let records = match serde_json::from_reader(reader)? {
        CorpusFile::Wrapped { corpus } => corpus,
        CorpusFile::Records(records) => records,
        CorpusFile::Single(record) => vec![record],
    };
    Ok(records)
}

fn load_jsonl(file: &Path) -> Result<Vec<SceneRecord>> {
    let reader = BufReader::new(File::open(file)?);
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: SceneRecord =
            serde_json::from_str(&line).with_context(|| format!("line {}", i + 1))?;
        records.push(record);
    }
    Ok(records)
}
