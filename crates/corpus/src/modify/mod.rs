//! Corpus maintenance after the target or the fuzzer configuration changed.
//!
//! Calls that the fuzzer would no longer generate are removed, senders can be remapped, and
//! every change is preceded by a snapshot in the corpus [`History`].

use crate::wire::{WireFormat, parse_address, wire_format};
use alloy_primitives::Address;
use eyre::{Context, Result};
use fuzz_utils_config::{ModifyConfig, ModifyMode};
use serde_json::Value;
use std::{collections::HashMap, path::PathBuf};

mod history;
pub use history::{
    CorpusEntry, History, HistoryEntry, Snapshot, content_hash, read_corpus, write_corpus,
};

mod rules;
pub use rules::{FuzzerLimits, Rules, Violation};

/// What happened to one sequence file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileChange {
    Unchanged,
    /// Some calls were dropped or rewritten.
    Modified { removed: Vec<(usize, Violation)> },
    /// The whole file goes away.
    Deleted { reason: Option<(usize, Violation)> },
}

/// The outcome of a modification, or of a dry run.
#[derive(Clone, Debug, Default)]
pub struct ModifyReport {
    pub changes: Vec<(PathBuf, FileChange)>,
    /// The modified corpus.
    pub corpus: Vec<CorpusEntry>,
    /// Hash of the snapshot taken before writing. `None` for dry runs.
    pub snapshot: Option<Snapshot>,
}

impl ModifyReport {
    pub fn changed(&self) -> impl Iterator<Item = &(PathBuf, FileChange)> {
        self.changes.iter().filter(|(_, change)| *change != FileChange::Unchanged)
    }
}

/// Applies [`Rules`] and sender remapping to every sequence of a corpus.
pub struct CorpusModifier<'a> {
    config: &'a ModifyConfig,
    format: &'static dyn WireFormat,
    rules: Rules<'a>,
    senders: HashMap<Address, Address>,
}

impl<'a> CorpusModifier<'a> {
    pub fn new(config: &'a ModifyConfig, rules: Rules<'a>) -> Result<Self> {
        let address = |value: &String| {
            parse_address(value).ok_or_else(|| eyre::eyre!("invalid sender address `{value}`"))
        };
        let senders = config
            .modify_senders
            .iter()
            .map(|(from, to)| Ok((address(from)?, address(to)?)))
            .collect::<Result<_>>()
            .wrap_err("invalid `modifySenders`")?;
        Ok(Self { config, format: wire_format(config.fuzzer), rules, senders })
    }

    /// Computes the modified corpus without touching the disk.
    pub fn plan(&self) -> Result<ModifyReport> {
        let corpus = read_corpus(&self.config.corpus_dir, self.config.fuzzer)?;
        let mut report = ModifyReport::default();
        for entry in corpus {
            let (calls, change) = self
                .modify_sequence(entry.content)
                .wrap_err_with(|| format!("failed to read {}", entry.path.display()))?;
            if let Some(content) = calls {
                report.corpus.push(CorpusEntry { path: entry.path.clone(), content });
            }
            report.changes.push((entry.path, change));
        }
        Ok(report)
    }

    /// Snapshots the corpus into `history` and writes the modified corpus, unless this is a dry
    /// run.
    pub fn modify(&self, history: &mut History) -> Result<ModifyReport> {
        let mut report = self.plan()?;
        if self.config.dry_run {
            return Ok(report);
        }
        let root = &self.config.corpus_dir;
        report.snapshot = Some(history.snapshot(root, self.config.fuzzer, "before modify-corpus")?);
        write_corpus(root, self.config.fuzzer, &report.corpus)?;
        Ok(report)
    }

    /// Filters and rewrites one sequence. `None` when nothing of it is kept.
    fn modify_sequence(&self, calls: Vec<Value>) -> Result<(Option<Vec<Value>>, FileChange)> {
        let parsed = calls
            .iter()
            .map(|raw| self.format.parse_call(raw))
            .collect::<Result<Vec<_>, _>>()?;

        // nonces continue from the first one each (remapped) sender used in the sequence
        let mut nonces = HashMap::new();
        for call in &parsed {
            if let Some(nonce) = call.meta.nonce {
                nonces.entry(self.sender(call.meta.sender)).or_insert(nonce);
            }
        }

        let mut kept = Vec::with_capacity(calls.len());
        let mut removed = Vec::new();
        let mut rewritten = false;
        for (index, (mut raw, call)) in calls.into_iter().zip(parsed).enumerate() {
            if let Some(violation) = self.rules.check(&call) {
                trace!(index, %violation, "invalid call");
                if self.config.mode == ModifyMode::DeleteSequence {
                    return Ok((None, FileChange::Deleted { reason: Some((index, violation)) }));
                }
                removed.push((index, violation));
                continue;
            }

            let sender = self.sender(call.meta.sender);
            if sender != call.meta.sender {
                self.format.set_sender(&mut raw, sender);
                rewritten = true;
            }
            if let (Some(recorded), Some(next)) = (call.meta.nonce, nonces.get_mut(&sender)) {
                if recorded != *next {
                    self.format.set_nonce(&mut raw, *next);
                    rewritten = true;
                }
                *next += 1;
            }
            kept.push(raw);
        }

        if kept.is_empty() {
            return Ok((None, FileChange::Deleted { reason: None }));
        }
        let change = if removed.is_empty() && !rewritten {
            FileChange::Unchanged
        } else {
            FileChange::Modified { removed }
        };
        Ok((Some(kept), change))
    }

    fn sender(&self, sender: Address) -> Address {
        self.senders.get(&sender).copied().unwrap_or(sender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzz_utils_config::Fuzzer;
    use serde_json::json;
    use std::{collections::BTreeMap, fs, path::Path};

    const USER: &str = "0x0000000000000000000000000000000000010000";
    const OTHER: &str = "0x0000000000000000000000000000000000020000";

    fn medusa_call(from: &str, nonce: u64, time_delay: u64) -> Value {
        json!({
            "call": {
                "from": from,
                "to": "0xa647ff3c36cfab592509e13860ab8c4f28781a66",
                "nonce": nonce,
                "value": "0x0",
                "gasLimit": 12500000,
                "gasPrice": "0x1",
                "data": "0x",
                "dataAbiValues": {"methodSignature": "poke()", "inputValues": []},
            },
            "blockNumberDelay": 0,
            "blockTimestampDelay": time_delay,
        })
    }

    fn config(root: &Path, mode: ModifyMode) -> ModifyConfig {
        ModifyConfig {
            corpus_dir: root.to_path_buf(),
            fuzzer: Fuzzer::Medusa,
            mode,
            ..Default::default()
        }
    }

    fn rules() -> Rules<'static> {
        let limits = FuzzerLimits { max_time_delay: Some(100), ..Default::default() };
        Rules { fuzzer: Fuzzer::Medusa, limits, contract: None }
    }

    fn write(root: &Path, name: &str, calls: &[Value]) {
        let dir = root.join("call_sequences/mutable");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), serde_json::to_string(calls).unwrap()).unwrap();
    }

    #[test]
    fn deletes_calls_and_renumbers_nonces() {
        let root = tempfile::tempdir().unwrap();
        write(
            root.path(),
            "1.json",
            &[medusa_call(USER, 4, 0), medusa_call(USER, 5, 1000), medusa_call(USER, 6, 0)],
        );
        let config = config(root.path(), ModifyMode::DeleteCalls);
        let report = CorpusModifier::new(&config, rules()).unwrap().plan().unwrap();

        let [(path, FileChange::Modified { removed })] = report.changes.as_slice() else {
            panic!("{:?}", report.changes)
        };
        assert_eq!(path, Path::new("call_sequences/mutable/1.json"));
        assert_eq!(removed[0].0, 1);
        let nonces: Vec<_> =
            report.corpus[0].content.iter().map(|call| call["call"]["nonce"].clone()).collect();
        assert_eq!(nonces, [json!(4), json!(5)]);
    }

    #[test]
    fn deletes_whole_sequences() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "1.json", &[medusa_call(USER, 0, 0), medusa_call(USER, 1, 1000)]);
        write(root.path(), "2.json", &[medusa_call(USER, 0, 0)]);
        let config = config(root.path(), ModifyMode::DeleteSequence);
        let report = CorpusModifier::new(&config, rules()).unwrap().plan().unwrap();

        assert_eq!(report.corpus.len(), 1);
        assert_eq!(report.corpus[0].path, Path::new("call_sequences/mutable/2.json"));
        assert!(matches!(report.changes[0].1, FileChange::Deleted { reason: Some((1, _)) }));
        assert_eq!(report.changed().count(), 1);
    }

    #[test]
    fn remaps_senders() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "1.json", &[medusa_call(USER, 2, 0), medusa_call(OTHER, 7, 0)]);
        let config = ModifyConfig {
            modify_senders: BTreeMap::from([("0x10000".to_string(), "0x20000".to_string())]),
            ..config(root.path(), ModifyMode::DeleteCalls)
        };
        let report = CorpusModifier::new(&config, rules()).unwrap().plan().unwrap();
        let calls = &report.corpus[0].content;
        assert_eq!(calls[0]["call"]["from"], OTHER);
        assert_eq!((calls[0]["call"]["nonce"].clone(), calls[1]["call"]["nonce"].clone()), (json!(2), json!(3)));
    }

    #[test]
    fn snapshots_before_writing() {
        let root = tempfile::tempdir().unwrap();
        let history_dir = tempfile::tempdir().unwrap();
        write(root.path(), "1.json", &[medusa_call(USER, 0, 1000)]);
        write(root.path(), "2.json", &[medusa_call(USER, 0, 0)]);

        let dry = ModifyConfig { dry_run: true, ..config(root.path(), ModifyMode::DeleteCalls) };
        let mut history = History::load(history_dir.path()).unwrap();
        let report = CorpusModifier::new(&dry, rules()).unwrap().modify(&mut history).unwrap();
        assert!(report.snapshot.is_none());
        assert!(history.is_empty());
        assert!(root.path().join("call_sequences/mutable/1.json").exists());

        let config = config(root.path(), ModifyMode::DeleteCalls);
        let report = CorpusModifier::new(&config, rules()).unwrap().modify(&mut history).unwrap();
        let snapshot = report.snapshot.unwrap();
        assert!(!root.path().join("call_sequences/mutable/1.json").exists());
        assert!(root.path().join("call_sequences/mutable/2.json").exists());

        history.restore(&snapshot.hash).unwrap();
        assert!(root.path().join("call_sequences/mutable/1.json").exists());
    }

    #[test]
    fn rejects_invalid_sender_mapping() {
        let config = ModifyConfig {
            modify_senders: BTreeMap::from([("alice".to_string(), "0x1".to_string())]),
            ..Default::default()
        };
        let err = CorpusModifier::new(&config, rules()).err().unwrap();
        assert_eq!(format!("{err:#}"), "invalid `modifySenders`: invalid sender address `alice`");
    }
}
