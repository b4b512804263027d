use clap::{Parser, ValueHint};
use eyre::Result;
use fuzz_utils_cli::utils::{display, print_success};
use fuzz_utils_config::{Fuzzer, ModifyConfig, Section};
use fuzz_utils_corpus::modify::History;
use serde::Serialize;
use std::path::{Path, PathBuf};
use yansi::Paint;

/// CLI arguments for `fuzz-utils snapshot`.
#[derive(Clone, Debug, Default, Parser, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotArgs {
    /// Path to the corpus directory.
    #[arg(long, short = 'd', value_hint = ValueHint::DirPath)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_dir: Option<PathBuf>,

    /// The fuzzer that produced the corpus: echidna or medusa.
    #[arg(long, short = 'f')]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzer: Option<Fuzzer>,

    /// Directory that holds the corpus history.
    #[arg(long, value_hint = ValueHint::DirPath)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_dir: Option<PathBuf>,

    /// Note stored with the snapshot.
    #[arg(long, short = 'm', default_value = "manual snapshot")]
    #[serde(skip)]
    pub comment: String,
}

impl SnapshotArgs {
    pub fn run(self, config_file: Option<&Path>) -> Result<()> {
        let config = ModifyConfig::load(config_file, &self)?;
        let mut history = History::load(&config.history_dir)?;
        let snapshot = history.snapshot(&config.corpus_dir, config.fuzzer, &self.comment)?;
        if snapshot.existed {
            println!("The corpus is already saved as {}", snapshot.hash.as_str().bold());
        } else {
            print_success(format!(
                "Saved {} as {}",
                display(&config.corpus_dir),
                snapshot.hash.as_str().bold()
            ));
        }
        Ok(())
    }
}

/// CLI arguments for `fuzz-utils restore`.
#[derive(Clone, Debug, Default, Parser, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreArgs {
    /// Hash of the saved corpus, or a unique prefix of it.
    #[arg(required_unless_present = "list_history")]
    #[serde(skip)]
    pub hash: Option<String>,

    /// List the saved corpora instead.
    #[arg(long, short = 'l', conflicts_with = "hash")]
    #[serde(skip)]
    pub list_history: bool,

    /// Directory that holds the corpus history.
    #[arg(long, value_hint = ValueHint::DirPath)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_dir: Option<PathBuf>,
}

impl RestoreArgs {
    pub fn run(self, config_file: Option<&Path>) -> Result<()> {
        let config = ModifyConfig::load(config_file, &self)?;
        let history = History::load(&config.history_dir)?;

        let Some(hash) = self.hash.as_deref().filter(|_| !self.list_history) else {
            if history.is_empty() {
                println!("No corpora saved in {}", display(&config.history_dir));
            }
            for (hash, entry) in history.entries() {
                println!(
                    "{} {} {} ({}, {} files) {}",
                    hash.as_str().bold(),
                    entry.timestamp,
                    display(&entry.path),
                    entry.fuzzer,
                    entry.content.len(),
                    entry.comment.as_str().dim()
                );
            }
            return Ok(());
        };

        let entry = history.restore(hash)?;
        print_success(format!("Restored {} from {}", display(&entry.path), entry.timestamp));
        Ok(())
    }
}
