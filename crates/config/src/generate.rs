use crate::{Fuzzer, Section};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings of the `generate` command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateConfig {
    /// Contract the tests are generated for. Derived when the project has a single contract.
    pub target_contract: String,
    /// Foundry project root or compiled artifacts.
    pub compilation_path: PathBuf,
    pub corpus_dir: PathBuf,
    pub fuzzer: Fuzzer,
    /// Directory the test file is written to.
    pub tests_dir: PathBuf,
    /// Import path of the target contract, relative to `tests_dir`. Derived when empty.
    pub inheritance_path: String,
    /// Call functions with named arguments, `f({a: 1, b: 2})`.
    pub named_inputs: bool,
    /// Also replay the coverage corpus, not only the reproducers.
    pub all_sequences: bool,
    /// Emit ASCII strings as `unicode"..."` escapes instead of hex literals.
    pub unicode_strings: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            target_contract: String::new(),
            compilation_path: PathBuf::from("."),
            corpus_dir: PathBuf::from("corpus"),
            fuzzer: Fuzzer::Medusa,
            tests_dir: PathBuf::from("test"),
            inheritance_path: String::new(),
            named_inputs: false,
            all_sequences: false,
            unicode_strings: false,
        }
    }
}

impl Section for GenerateConfig {
    const KEY: &'static str = "generate";
}
