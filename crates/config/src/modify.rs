use crate::{Fuzzer, Section};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::PathBuf};

/// What happens to a sequence that contains an invalid call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifyMode {
    /// Drop the whole sequence.
    DeleteSequence,
    /// Drop only the invalid calls.
    #[default]
    DeleteCalls,
}

/// Settings of the `modify-corpus`, `snapshot` and `restore` commands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModifyConfig {
    pub compilation_path: PathBuf,
    /// Needed by the function-existence rule only.
    pub target_contract: String,
    pub corpus_dir: PathBuf,
    pub fuzzer: Fuzzer,
    /// Echidna YAML or Medusa JSON config the delay and function rules are read from.
    pub fuzzer_config_path: Option<PathBuf>,
    pub mode: ModifyMode,
    /// Replaces call senders, keyed by the original sender.
    pub modify_senders: BTreeMap<String, String>,
    /// Drop calls to functions the target contract no longer has.
    pub filter_functions: bool,
    /// Report the changes without writing them.
    pub dry_run: bool,
    /// Directory that holds the corpus history.
    pub history_dir: PathBuf,
}

impl Default for ModifyConfig {
    fn default() -> Self {
        Self {
            compilation_path: PathBuf::from("."),
            target_contract: String::new(),
            corpus_dir: PathBuf::from("corpus"),
            fuzzer: Fuzzer::Medusa,
            fuzzer_config_path: None,
            mode: ModifyMode::DeleteCalls,
            modify_senders: BTreeMap::new(),
            filter_functions: false,
            dry_run: false,
            history_dir: PathBuf::from(".fuzz_utils"),
        }
    }
}

impl Section for ModifyConfig {
    const KEY: &'static str = "modify-corpus";
}
