//! Snapshots of a corpus, stored in `<history dir>/history.json`.

use crate::layout;
use alloy_primitives::hex;
use chrono::{SecondsFormat, Utc};
use eyre::{Context, Result};
use fuzz_utils_config::Fuzzer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// One sequence file, with its path relative to the corpus root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub path: PathBuf,
    pub content: Vec<Value>,
}

/// Reads every sequence file of the corpus at `root`.
///
/// Unlike test generation and conversion, an unreadable file is an error: the corpus is about to
/// be rewritten and nothing may get lost.
pub fn read_corpus(root: &Path, fuzzer: Fuzzer) -> Result<Vec<CorpusEntry>> {
    let mut entries = Vec::new();
    for dir in layout::corpus_dirs(fuzzer) {
        for path in layout::list_files(&root.join(dir))? {
            let content = layout::read_sequence(&path)?;
            let path = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            entries.push(CorpusEntry { path, content });
        }
    }
    Ok(entries)
}

/// Replaces the sequence files of the corpus at `root` with `entries`.
pub fn write_corpus(root: &Path, fuzzer: Fuzzer, entries: &[CorpusEntry]) -> Result<()> {
    let removed = layout::clear_sequences(root, fuzzer)?;
    let format = crate::wire::wire_format(fuzzer);
    for entry in entries {
        layout::write_file(&root.join(&entry.path), &format.to_file_string(&entry.content)?)?;
    }
    debug!(removed, written = entries.len(), root = %root.display(), "rewrote corpus");
    Ok(())
}

/// A saved version of a corpus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The corpus directory the snapshot was taken of.
    pub path: PathBuf,
    #[serde(default)]
    pub fuzzer: Fuzzer,
    /// RFC 3339, UTC.
    pub timestamp: String,
    #[serde(default)]
    pub comment: String,
    pub content: Vec<CorpusEntry>,
}

/// The result of [`History::snapshot`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub hash: String,
    /// Whether the corpus was saved before.
    pub existed: bool,
}

/// Corpus snapshots keyed by the SHA-256 of their content.
#[derive(Clone, Debug, Default)]
pub struct History {
    file: PathBuf,
    entries: BTreeMap<String, HistoryEntry>,
}

impl History {
    pub const FILE_NAME: &'static str = "history.json";

    /// Loads the history kept in `dir`. A missing file is an empty history.
    pub fn load(dir: &Path) -> Result<Self> {
        let file = dir.join(Self::FILE_NAME);
        let entries = if file.exists() {
            let content = fs::read_to_string(&file)
                .wrap_err_with(|| format!("failed to read {}", file.display()))?;
            serde_json::from_str(&content)
                .wrap_err_with(|| format!("corrupt corpus history in {}", file.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self { file, entries })
    }

    pub fn save(&self) -> Result<()> {
        layout::write_file(&self.file, &serde_json::to_string(&self.entries)?)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &HistoryEntry)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Saves the current state of the corpus at `root` and persists the history.
    ///
    /// A corpus whose content is already in the history is not saved twice.
    pub fn snapshot(&mut self, root: &Path, fuzzer: Fuzzer, comment: &str) -> Result<Snapshot> {
        let content = read_corpus(root, fuzzer)?;
        let hash = content_hash(&content)?;
        if self.entries.contains_key(&hash) {
            return Ok(Snapshot { hash, existed: true });
        }

        let entry = HistoryEntry {
            path: root.to_path_buf(),
            fuzzer,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            comment: comment.to_string(),
            content,
        };
        self.entries.insert(hash.clone(), entry);
        self.save()?;
        debug!(%hash, root = %root.display(), "saved corpus snapshot");
        Ok(Snapshot { hash, existed: false })
    }

    /// Finds a snapshot by its hash or a unique prefix of it.
    pub fn get(&self, hash: &str) -> Result<(&String, &HistoryEntry)> {
        if let Some(found) = self.entries.get_key_value(hash) {
            return Ok(found);
        }
        let mut matches = self.entries.iter().filter(|(key, _)| key.starts_with(hash));
        match (matches.next(), matches.next()) {
            (Some(found), None) if !hash.is_empty() => Ok(found),
            (Some(_), Some(_)) => eyre::bail!("the hash prefix `{hash}` is ambiguous"),
            _ => eyre::bail!("no corpus with the hash `{hash}` was found in the history"),
        }
    }

    /// Overwrites the corpus a snapshot was taken of with the snapshot's content.
    pub fn restore(&self, hash: &str) -> Result<&HistoryEntry> {
        let (_, entry) = self.get(hash)?;
        write_corpus(&entry.path, entry.fuzzer, &entry.content)?;
        Ok(entry)
    }
}

/// SHA-256 of the corpus as JSON with sorted object keys.
pub fn content_hash(content: &[CorpusEntry]) -> Result<String> {
    let canonical = canonicalize(serde_json::to_value(content)?);
    let digest = Sha256::digest(serde_json::to_string(&canonical)?.as_bytes());
    Ok(hex::encode(digest))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<_, _> =
                map.into_iter().map(|(key, value)| (key, canonicalize(value))).collect();
            Value::Object(sorted.into_iter().collect::<Map<_, _>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
