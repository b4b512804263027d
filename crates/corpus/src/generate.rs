//! Foundry unit tests from a fuzzer corpus.

use crate::{
    DecodeError, Decoder, SequenceContext,
    diagnostics::Diagnostics,
    layout,
    render::{RenderOptions, render_call, render_contract, render_test},
    wire::wire_format,
};
use eyre::{Context, Result};
use fuzz_utils_abi::{ContractInterface, SignatureProvider};
use fuzz_utils_config::GenerateConfig;
use itertools::Itertools;
use serde_json::Value;
use std::path::{Component, Path, PathBuf};

/// A rendered test contract, not yet written to disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedTests {
    /// Where the contract belongs, `<testsDir>/<Target>_<Fuzzer>_Test.t.sol`.
    pub path: PathBuf,
    pub source: String,
    /// Number of test functions in the contract.
    pub tests: usize,
    /// Number of sequence files that could not be turned into tests.
    pub skipped: usize,
}

impl GeneratedTests {
    pub fn write(&self) -> Result<()> {
        layout::write_file(&self.path, &self.source)
    }
}

/// Turns the sequences of one corpus into Foundry tests against one contract.
pub struct TestGenerator<'a> {
    config: &'a GenerateConfig,
    provider: &'a dyn SignatureProvider,
}

impl<'a> TestGenerator<'a> {
    pub fn new(config: &'a GenerateConfig, provider: &'a dyn SignatureProvider) -> Self {
        Self { config, provider }
    }

    fn options(&self) -> RenderOptions {
        RenderOptions {
            named_inputs: self.config.named_inputs,
            unicode_strings: self.config.unicode_strings,
        }
    }

    /// Renders one test per sequence file.
    ///
    /// Files that fail to parse or decode are reported to `diagnostics` and skipped. Failing to
    /// find the target contract is fatal.
    pub fn generate(&self, diagnostics: &mut dyn Diagnostics) -> Result<GeneratedTests> {
        let config = self.config;
        let target = &config.target_contract;
        let contract = self
            .provider
            .contract(target)
            .wrap_err("cannot generate tests without the target contract")?;
        let format = wire_format(config.fuzzer);
        let decoder = Decoder::new(format, self.provider, target);

        let mut tests = Vec::new();
        let mut skipped = 0;
        let mut index = 0;
        for dir in layout::sequence_dirs(config.fuzzer, config.all_sequences) {
            for path in layout::list_files(&config.corpus_dir.join(dir))? {
                let calls = match layout::read_sequence(&path) {
                    Ok(calls) => calls,
                    Err(err) => {
                        diagnostics.file_skipped(&path, &err);
                        skipped += 1;
                        continue;
                    }
                };
                let source = display_path(&path);
                match self.render_sequence(&decoder, &calls, index, &source) {
                    Ok(test) => tests.push(test),
                    Err(err) => {
                        let err = eyre::Report::new(err)
                            .wrap_err(format!("failed to replay {source}"));
                        diagnostics.file_skipped(&path, &err);
                        skipped += 1;
                    }
                }
                index += 1;
            }
        }
        debug!(tests = tests.len(), skipped, "rendered sequences");

        let fuzzer = config.fuzzer.name();
        let source = render_contract(target, fuzzer, &self.inheritance_path(contract), &tests);
        let path = config.tests_dir.join(format!("{target}_{fuzzer}_Test.t.sol"));
        Ok(GeneratedTests { path, source, tests: tests.len(), skipped })
    }

    /// Renders one sequence as a test function.
    ///
    /// The test is named after the last function the sequence calls, which is usually the one
    /// that broke the property.
    pub fn render_sequence(
        &self,
        decoder: &Decoder<'_>,
        calls: &[Value],
        index: usize,
        source: &str,
    ) -> Result<String, DecodeError> {
        let mut ctx = SequenceContext::new();
        let mut statements = Vec::with_capacity(calls.len());
        let mut last = String::new();
        for raw in calls {
            let call = decoder.decode_raw(raw)?;
            let (statement, function) = render_call(&call, &mut ctx, self.options())?;
            statements.push(statement);
            if !function.is_empty() {
                last = function;
            }
        }
        Ok(render_test(&last, index, source, &statements, &ctx))
    }

    /// Import path of the target, relative to the tests directory.
    fn inheritance_path(&self, contract: &ContractInterface) -> String {
        if !self.config.inheritance_path.is_empty() {
            return self.config.inheritance_path.clone();
        }
        let source = contract
            .source
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("src/{}.sol", contract.name)));
        let depth = self
            .config
            .tests_dir
            .components()
            .filter(|component| matches!(component, Component::Normal(_)))
            .count();
        format!("{}{}", "../".repeat(depth), display_path(&source))
    }
}

/// Forward slashes on every platform, generated sources must not depend on the host.
fn display_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            Component::ParentDir => Some("..".into()),
            Component::RootDir => Some("".into()),
            Component::CurDir | Component::Prefix(_) => None,
        })
        .join("/")
}
