use crate::{Fuzzer, Section};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default deployer account of both fuzzers.
pub const DEFAULT_DEPLOYER: &str = "0x0000000000000000000000000000000000030000";

/// Settings of the `convert` command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertConfig {
    pub target_contract: String,
    pub compilation_path: PathBuf,
    pub corpus_dir: PathBuf,
    /// Format of the corpus being converted.
    pub fuzzer: Fuzzer,
    /// Where the converted corpus is written. Defaults to `<corpusDir>-<target fuzzer>`.
    pub output_dir: Option<PathBuf>,
    /// Overrides the call target. The fuzzers deploy the harness at different addresses.
    pub target_address: Option<String>,
    pub deployer: String,
    /// Initial nonce of the deployer in converted Medusa sequences.
    ///
    /// Medusa counts the harness deployment against the deployer, so its first call uses nonce
    /// 1. This is only right when a single contract is deployed.
    pub deployer_nonce: u64,
    /// `gasFeeCap` of converted Medusa calls. Echidna sequences don't record it.
    pub gas_fee_cap: String,
    /// `gasTipCap` of converted Medusa calls.
    pub gas_tip_cap: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            target_contract: String::new(),
            compilation_path: PathBuf::from("."),
            corpus_dir: PathBuf::from("corpus"),
            fuzzer: Fuzzer::Echidna,
            output_dir: None,
            target_address: None,
            deployer: DEFAULT_DEPLOYER.to_string(),
            deployer_nonce: 1,
            gas_fee_cap: "0x0".to_string(),
            gas_tip_cap: "0x0".to_string(),
        }
    }
}

impl ConvertConfig {
    /// The output directory, derived from the corpus directory when not set.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            let name = self
                .corpus_dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "corpus".to_string());
            let parent = self.corpus_dir.parent().unwrap_or(Path::new(""));
            parent.join(format!("{name}-{}", self.fuzzer.other().as_str()))
        })
    }
}

impl Section for ConvertConfig {
    const KEY: &'static str = "convert";
}
