use clap::{Parser, ValueHint};
use eyre::Result;
use fuzz_utils_cli::utils::{self, display, print_success};
use fuzz_utils_config::{Fuzzer, GenerateConfig, Section};
use fuzz_utils_corpus::{CollectedDiagnostics, TestGenerator};
use serde::Serialize;
use std::path::{Path, PathBuf};
use yansi::Paint;

/// CLI arguments for `fuzz-utils generate`.
#[derive(Clone, Debug, Default, Parser, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateArgs {
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

    /// Directory that receives the Foundry tests.
    #[arg(long = "test-directory", short = 't', value_hint = ValueHint::DirPath)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tests_dir: Option<PathBuf>,

    /// Import path of the target contract, relative to the test directory.
    #[arg(long, short = 'i', value_name = "PATH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inheritance_path: Option<String>,

    /// The fuzzer that produced the corpus: echidna or medusa.
    #[arg(long, short = 'f')]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzer: Option<Fuzzer>,

    /// Call functions with named arguments.
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub named_inputs: bool,

    /// Turn every corpus sequence into a test, not only the reproducers.
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub all_sequences: bool,

    /// Write printable strings as `unicode"..."` literals.
    #[arg(long)]
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unicode_strings: bool,
}

impl GenerateArgs {
    pub fn run(self, config_file: Option<&Path>) -> Result<()> {
        let mut config = GenerateConfig::load(config_file, &self)?;
        let provider = utils::load_provider(&config.compilation_path)?;
        config.target_contract = utils::target_contract(&provider, &config.target_contract)?;
        info!(
            fuzzer = %config.fuzzer,
            corpus = %config.corpus_dir.display(),
            "generating unit tests for `{}`",
            config.target_contract
        );

        let mut diagnostics = CollectedDiagnostics::default();
        let generated = TestGenerator::new(&config, &provider).generate(&mut diagnostics)?;
        generated.write()?;

        print_success(format!(
            "Generated {} unit tests in {}",
            generated.tests,
            display(&generated.path).bold()
        ));
        if !diagnostics.is_empty() {
            println!("{}", format!("Skipped {} corpus files:", diagnostics.skipped.len()).yellow());
            for (path, reason) in &diagnostics.skipped {
                println!("  {}: {reason}", display(path));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_only_given_options() {
        let args = GenerateArgs::parse_from(["generate", ".", "-c", "Vault", "-f", "echidna"]);
        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"compilationPath": ".", "targetContract": "Vault", "fuzzer": "echidna"})
        );

        let args = GenerateArgs::parse_from(["generate", "--named-inputs", "-t", "test/gen"]);
        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(json, serde_json::json!({"testsDir": "test/gen", "namedInputs": true}));
    }

    #[test]
    fn rejects_unknown_fuzzer() {
        let err = GenerateArgs::try_parse_from(["generate", "-f", "afl"]).unwrap_err();
        assert!(err.to_string().contains("not supported"), "{err}");
    }
}
