//! Where each fuzzer keeps its call sequences, and reading and writing them.

use eyre::{Context, Result};
use fuzz_utils_config::Fuzzer;
use serde_json::Value;
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Echidna corpus directory with sequences that increased coverage.
pub const ECHIDNA_COVERAGE: &str = "coverage";
/// Echidna corpus directory with shrunk property violations.
pub const ECHIDNA_REPRODUCERS: &str = "reproducers";
pub const MEDUSA_IMMUTABLE: &str = "call_sequences/immutable";
pub const MEDUSA_MUTABLE: &str = "call_sequences/mutable";
pub const MEDUSA_TEST_RESULTS: &str = "test_results";

/// Every sequence directory of `fuzzer`, relative to the corpus root.
pub fn corpus_dirs(fuzzer: Fuzzer) -> &'static [&'static str] {
    match fuzzer {
        Fuzzer::Echidna => &[ECHIDNA_COVERAGE, ECHIDNA_REPRODUCERS],
        Fuzzer::Medusa => &[MEDUSA_IMMUTABLE, MEDUSA_MUTABLE, MEDUSA_TEST_RESULTS],
    }
}

/// The directories tests are generated from. Only failing sequences unless `all_sequences`.
pub fn sequence_dirs(fuzzer: Fuzzer, all_sequences: bool) -> &'static [&'static str] {
    match (fuzzer, all_sequences) {
        (Fuzzer::Echidna, false) => &[ECHIDNA_REPRODUCERS],
        (Fuzzer::Medusa, false) => &[MEDUSA_TEST_RESULTS],
        (fuzzer, true) => corpus_dirs(fuzzer),
    }
}

/// The directory of the other fuzzer that sequences from `dir` of `from` are converted into.
pub fn converted_dir(from: Fuzzer, dir: &str) -> Option<&'static str> {
    match (from, dir) {
        (Fuzzer::Echidna, ECHIDNA_COVERAGE) => Some(MEDUSA_MUTABLE),
        (Fuzzer::Echidna, ECHIDNA_REPRODUCERS) => Some(MEDUSA_TEST_RESULTS),
        (Fuzzer::Medusa, MEDUSA_IMMUTABLE | MEDUSA_MUTABLE) => Some(ECHIDNA_COVERAGE),
        (Fuzzer::Medusa, MEDUSA_TEST_RESULTS) => Some(ECHIDNA_REPRODUCERS),
        _ => None,
    }
}

/// Files directly inside `dir`, sorted by name. A missing directory has no files.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        debug!(dir = %dir.display(), "corpus directory does not exist");
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.wrap_err_with(|| format!("failed to list {}", dir.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Reads one sequence file.
///
/// Sequences are JSON arrays. Echidna releases that wrote YAML are accepted too.
pub fn read_sequence(path: &Path) -> Result<Vec<Value>> {
    let content =
        fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let value = match serde_json::from_str::<Value>(&content) {
        Ok(value) => value,
        Err(json_err) => serde_yaml::from_str::<Value>(&content)
            .map_err(|_| json_err)
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?,
    };
    match value {
        Value::Array(calls) => Ok(calls),
        other => eyre::bail!(
            "{} is not a call sequence, expected a list but found {}",
            path.display(),
            kind(&other)
        ),
    }
}

/// Writes a serialized sequence, creating parent directories.
pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).wrap_err_with(|| format!("failed to write {}", path.display()))
}

/// Deletes the sequence files of every corpus directory of `fuzzer` under `root`.
///
/// Anything else in the corpus, such as coverage reports, is left alone.
pub fn clear_sequences(root: &Path, fuzzer: Fuzzer) -> Result<usize> {
    let mut removed = 0;
    for dir in corpus_dirs(fuzzer) {
        for path in list_files(&root.join(dir))? {
            fs::remove_file(&path)
                .wrap_err_with(|| format!("failed to remove {}", path.display()))?;
            removed += 1;
        }
    }
    Ok(removed)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
