use clap::{Parser, ValueHint};
use eyre::Result;
use fuzz_utils_cli::utils::{self, display, print_success};
use fuzz_utils_config::{ConvertConfig, Fuzzer, Section};
use fuzz_utils_corpus::{CollectedDiagnostics, CorpusConverter};
use serde::Serialize;
use std::path::{Path, PathBuf};
use yansi::Paint;

/// CLI arguments for `fuzz-utils convert`.
#[derive(Clone, Debug, Default, Parser, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertArgs {
    /// Path to the Foundry project or its compiled artifacts.
    #[arg(value_hint = ValueHint::DirPath, value_name = "PATH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compilation_path: Option<PathBuf>,

    /// Path to the corpus directory.
    #[arg(long, short = 'd', value_hint = ValueHint::DirPath)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_dir: Option<PathBuf>,

    /// Name of the target contract. Derived when the project has a single contract.
    #[arg(long = "contract", short = 'c', value_name = "NAME")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_contract: Option<String>,

    /// The fuzzer that produced the corpus. It is converted for the other one.
    #[arg(long, short = 'f')]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzer: Option<Fuzzer>,

    /// Where to write the converted corpus. Defaults to `<corpus-dir>-<fuzzer>`.
    #[arg(long, short = 'o', value_hint = ValueHint::DirPath)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Address of the harness in the converted corpus.
    #[arg(long, value_name = "ADDRESS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_address: Option<String>,

    /// Account that deploys the harness.
    #[arg(long, value_name = "ADDRESS")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployer: Option<String>,

    /// Nonce of the deployer's first call in converted Medusa sequences.
    #[arg(long, value_name = "NONCE")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployer_nonce: Option<u64>,
}

impl ConvertArgs {
    pub fn run(self, config_file: Option<&Path>) -> Result<()> {
        let mut config = ConvertConfig::load(config_file, &self)?;
        let provider = utils::load_provider(&config.compilation_path)?;
        config.target_contract = utils::target_contract(&provider, &config.target_contract)?;
        info!(
            from = %config.fuzzer,
            to = %config.fuzzer.other(),
            corpus = %config.corpus_dir.display(),
            "converting corpus"
        );

        let mut diagnostics = CollectedDiagnostics::default();
        let converted = CorpusConverter::new(&config, &provider).convert(&mut diagnostics)?;
        converted.write()?;

        print_success(format!(
            "Converted {} sequences for {} into {}",
            converted.files.len(),
            config.fuzzer.other(),
            display(&config.output_dir()).bold()
        ));
        if converted.skipped > 0 {
            println!("{}", format!("Skipped {} corpus files", converted.skipped).yellow());
        }
        Ok(())
    }
}
