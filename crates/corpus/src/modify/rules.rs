use crate::{CallKind, CallObject};
use eyre::{Context, Result};
use fuzz_utils_abi::ContractInterface;
use fuzz_utils_config::Fuzzer;
use serde::Deserialize;
use std::{fmt, fs, path::Path};

/// The parts of a fuzzer's own configuration that decide whether a recorded call is still valid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FuzzerLimits {
    pub max_time_delay: Option<u64>,
    pub max_block_delay: Option<u64>,
    /// Echidna's `filterFunctions`.
    pub filter_functions: Vec<String>,
    /// Whether `filter_functions` lists forbidden functions rather than the allowed ones.
    pub filter_blacklist: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EchidnaConfig {
    max_time_delay: Option<u64>,
    max_block_delay: Option<u64>,
    #[serde(default)]
    filter_functions: Vec<String>,
    #[serde(default = "default_blacklist")]
    filter_blacklist: bool,
}

fn default_blacklist() -> bool {
    true
}

#[derive(Deserialize)]
struct MedusaConfig {
    fuzzing: MedusaFuzzing,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MedusaFuzzing {
    block_timestamp_delay_max: Option<u64>,
    block_number_delay_max: Option<u64>,
}

impl FuzzerLimits {
    /// Reads the limits from an Echidna YAML or Medusa JSON config file.
    ///
    /// A limit of zero means unlimited.
    pub fn load(fuzzer: Fuzzer, path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read the {fuzzer} config {}", path.display()))?;
        let err = || format!("invalid {fuzzer} config {}", path.display());
        let limits = match fuzzer {
            Fuzzer::Echidna => {
                let config: EchidnaConfig = serde_yaml::from_str(&content).wrap_err_with(err)?;
                Self {
                    max_time_delay: config.max_time_delay,
                    max_block_delay: config.max_block_delay,
                    filter_functions: config.filter_functions,
                    filter_blacklist: config.filter_blacklist,
                }
            }
            Fuzzer::Medusa => {
                let config: MedusaConfig = serde_json::from_str(&content).wrap_err_with(err)?;
                Self {
                    max_time_delay: config.fuzzing.block_timestamp_delay_max,
                    max_block_delay: config.fuzzing.block_number_delay_max,
                    ..Default::default()
                }
            }
        };
        Ok(Self {
            max_time_delay: limits.max_time_delay.filter(|max| *max > 0),
            max_block_delay: limits.max_block_delay.filter(|max| *max > 0),
            ..limits
        })
    }
}

/// Why a call was found invalid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    IncorrectDelay { time: u64, blocks: u64 },
    FilteredFunction(String),
    NonexistentFunction(String),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncorrectDelay { time, blocks } => {
                write!(f, "delay of {time}s and {blocks} blocks exceeds the maximum")
            }
            Self::FilteredFunction(name) => write!(f, "`{name}` is filtered by the fuzzer config"),
            Self::NonexistentFunction(name) => {
                write!(f, "`{name}` does not exist in the target contract")
            }
        }
    }
}

/// The checks a call has to pass to stay in the corpus.
#[derive(Clone, Debug)]
pub struct Rules<'a> {
    pub fuzzer: Fuzzer,
    pub limits: FuzzerLimits,
    /// Calls to functions missing from this contract are invalid.
    pub contract: Option<&'a ContractInterface>,
}

impl Rules<'_> {
    /// The first rule `call` breaks, if any.
    pub fn check(&self, call: &CallObject) -> Option<Violation> {
        self.incorrect_delay(call)
            .or_else(|| self.filtered_function(call))
            .or_else(|| self.nonexistent_function(call))
    }

    fn incorrect_delay(&self, call: &CallObject) -> Option<Violation> {
        let (time, blocks) = (call.meta.time_delay, call.meta.block_delay);
        let exceeds = |max: Option<u64>, delay: u64| max.is_some_and(|max| delay > max);
        (exceeds(self.limits.max_time_delay, time) || exceeds(self.limits.max_block_delay, blocks))
            .then_some(Violation::IncorrectDelay { time, blocks })
    }

    /// Medusa has no function filter of this shape, only Echidna's is applied.
    fn filtered_function(&self, call: &CallObject) -> Option<Violation> {
        let filters = &self.limits.filter_functions;
        if self.fuzzer != Fuzzer::Echidna || filters.is_empty() {
            return None;
        }
        let CallKind::Invoke { .. } = call.kind else { return None };
        let name = call.kind.function_name();
        let listed = filters.iter().any(|filter| filter_matches(filter, name));
        (listed == self.limits.filter_blacklist)
            .then(|| Violation::FilteredFunction(name.to_string()))
    }

    fn nonexistent_function(&self, call: &CallObject) -> Option<Violation> {
        let contract = self.contract?;
        let CallKind::Invoke { .. } = call.kind else { return None };
        let name = call.kind.function_name();
        (!contract.has_function(name)).then(|| Violation::NonexistentFunction(name.to_string()))
    }
}

/// Echidna filters are either bare names or `Contract.name(types)`.
fn filter_matches(filter: &str, name: &str) -> bool {
    let filter = filter.split('(').next().unwrap_or(filter);
    let filter = filter.rsplit('.').next().unwrap_or(filter);
    filter == name
}
