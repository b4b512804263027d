use clap::{Parser, ValueEnum, ValueHint};
use eyre::{Result, WrapErr};
use fuzz_utils_abi::SignatureProvider;
use fuzz_utils_cli::utils::{self, display, print_success};
use fuzz_utils_config::{Fuzzer, ModifyConfig, Section};
use fuzz_utils_corpus::modify::{CorpusModifier, FileChange, FuzzerLimits, History, Rules};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use yansi::Paint;

/// CLI arguments for `fuzz-utils modify-corpus`.
#[derive(Clone, Debug, Default, Parser, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyArgs {
    /// Path to the Foundry project or its compiled artifacts.
    #[arg(value_hint = ValueHint::DirPath, value_name = "PATH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compilation_path: Option<PathBuf>,

    /// Path to the corpus directory.
    #[arg(long, short = 'd', value_hint = ValueHint::DirPath)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_dir: Option<PathBuf>,

    /// Name of the target contract, for `--filter-functions`.
    #[arg(long = "contract", short = 'c', value_name = "NAME")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_contract: Option<String>,

    /// The fuzzer that produced the corpus: echidna or medusa.
    #[arg(long, short = 'f')]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzer: Option<Fuzzer>,

    /// The fuzzer's config file, which the delay and function filters are read from.
    #[arg(long = "fuzzer-config", value_hint = ValueHint::FilePath, value_name = "PATH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzer_config_path: Option<PathBuf>,

    /// What to drop when a sequence contains an invalid call.
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,

    /// Replace a call sender, e.g. `0x10000=0x20000`. Can be repeated.
    #[arg(long = "modify-sender", value_name = "FROM=TO", value_parser = parse_sender)]
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "collect_senders")]
    pub modify_senders: Vec<(String, String)>,

    /// Drop calls to functions the target contract no longer has.
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub filter_functions: bool,

    /// Report what would change without writing anything.
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,

    /// Directory that holds the corpus history.
    #[arg(long, value_hint = ValueHint::DirPath)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_dir: Option<PathBuf>,
}

/// What to drop when a sequence contains an invalid call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// The whole sequence.
    DeleteSequence,
    /// Only the invalid calls.
    DeleteCalls,
}

fn parse_sender(s: &str) -> Result<(String, String), String> {
    let (from, to) = s.split_once('=').ok_or_else(|| format!("expected `FROM=TO`, found `{s}`"))?;
    Ok((from.trim().to_string(), to.trim().to_string()))
}

fn collect_senders<S: serde::Serializer>(
    senders: &[(String, String)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(senders.iter().map(|(from, to)| (from, to)))
}

impl ModifyArgs {
    pub fn run(self, config_file: Option<&Path>) -> Result<()> {
        let mut config = ModifyConfig::load(config_file, &self)?;
        let limits = match &config.fuzzer_config_path {
            Some(path) => FuzzerLimits::load(config.fuzzer, path)?,
            None => FuzzerLimits::default(),
        };

        let provider = if config.filter_functions {
            Some(utils::load_provider(&config.compilation_path)?)
        } else {
            None
        };
        if let Some(provider) = &provider {
            config.target_contract = utils::target_contract(provider, &config.target_contract)?;
        }
        let contract = provider
            .as_ref()
            .map(|provider| provider.contract(&config.target_contract))
            .transpose()
            .wrap_err("`--filter-functions` needs the target contract")?;

        let rules = Rules { fuzzer: config.fuzzer, limits, contract };
        let modifier = CorpusModifier::new(&config, rules)?;
        let mut history = History::load(&config.history_dir)?;
        let report = modifier.modify(&mut history)?;

        let mut changed = 0;
        for (path, change) in report.changed() {
            changed += 1;
            match change {
                FileChange::Modified { removed } => {
                    println!("{}: removed {} calls", display(path), removed.len());
                    for (index, violation) in removed {
                        println!("  call {index}: {violation}");
                    }
                }
                FileChange::Deleted { reason: Some((index, violation)) } => {
                    println!("{}: {} (call {index}: {violation})", display(path), "deleted".red());
                }
                FileChange::Deleted { reason: None } => {
                    println!("{}: {} (no calls left)", display(path), "deleted".red());
                }
                FileChange::Unchanged => {}
            }
        }

        if config.dry_run {
            println!("{}", format!("Dry run, {changed} corpus files would change").yellow());
            return Ok(());
        }
        if let Some(snapshot) = &report.snapshot {
            info!(hash = %snapshot.hash, existed = snapshot.existed, "saved corpus before modifying");
            println!("Previous corpus saved as {}", snapshot.hash.as_str().bold());
        }
        print_success(format!("Modified {changed} of {} corpus files", report.changes.len()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzz_utils_config::ModifyMode;

    #[test]
    fn collects_sender_overrides() {
        let args = ModifyArgs::parse_from([
            "modify-corpus",
            "--modify-sender",
            "0x10000=0x20000",
            "--modify-sender",
            "0x30000 = 0x40000",
            "--mode",
            "delete-sequence",
            "--dry-run",
        ]);
        let config = ModifyConfig::load(None, &args).unwrap();
        assert_eq!(config.mode, ModifyMode::DeleteSequence);
        assert!(config.dry_run);
        assert_eq!(
            config.modify_senders,
            BTreeMap::from([
                ("0x10000".to_string(), "0x20000".to_string()),
                ("0x30000".to_string(), "0x40000".to_string()),
            ])
        );

        let err = ModifyArgs::try_parse_from(["modify-corpus", "--modify-sender", "0x1"]);
        assert!(err.is_err());
    }
}
