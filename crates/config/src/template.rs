use crate::Section;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How harness functions reach the targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarnessMode {
    /// The harness calls the targets directly.
    #[default]
    Simple,
    /// The harness pranks a fuzzed sender before each call.
    Prank,
    /// Calls are routed through deployed actor contracts.
    Actor,
}

/// Settings of the `template` command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateConfig {
    /// Name of the harness contract.
    pub name: String,
    pub mode: HarnessMode,
    /// Contracts the harness wraps.
    pub targets: Vec<String>,
    pub output_dir: PathBuf,
    pub compilation_path: PathBuf,
    pub actors: Vec<ActorConfig>,
    /// Attack contracts to generate, e.g. `Donation`.
    pub attacks: Vec<String>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            name: "DefaultHarness".to_string(),
            mode: HarnessMode::Simple,
            targets: Vec::new(),
            output_dir: PathBuf::from("./test/fuzzing"),
            compilation_path: PathBuf::from("."),
            actors: vec![ActorConfig::default()],
            attacks: Vec::new(),
        }
    }
}

impl Section for TemplateConfig {
    const KEY: &'static str = "template";
}

/// A group of identical actor contracts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActorConfig {
    pub name: String,
    /// Contracts this actor calls. Empty means all harness targets.
    pub targets: Vec<String>,
    /// How many instances the harness deploys.
    pub number: usize,
    pub filters: ActorFilters,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            targets: Vec::new(),
            number: 3,
            filters: ActorFilters::default(),
        }
    }
}

/// Restricts which target functions an actor wraps.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActorFilters {
    /// Require every filter to match instead of any.
    pub strict: bool,
    pub only_modifiers: Vec<String>,
    pub only_payable: bool,
    pub only_external_calls: Vec<String>,
}
