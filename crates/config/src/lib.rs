//! # fuzz-utils-config
//!
//! fuzz-utils configuration.
//!
//! Every command reads its own section of the config file (`fuzz-utils.json` by default, TOML is
//! accepted by extension). Values are layered in this order, later ones winning:
//!
//! 1. built-in defaults
//! 2. the command's section of the config file
//! 3. `FUZZ_UTILS_<SECTION>_<SETTING>` environment variables
//! 4. command line arguments

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::path::Path;

mod convert;
pub use convert::{ConvertConfig, DEFAULT_DEPLOYER};

mod error;
pub use error::ExtractConfigError;

mod fuzzer;
pub use fuzzer::{Fuzzer, UnsupportedFuzzer};

mod generate;
pub use generate::GenerateConfig;

mod modify;
pub use modify::{ModifyConfig, ModifyMode};

mod template;
pub use template::{ActorConfig, ActorFilters, HarnessMode, TemplateConfig};

/// One command's section of the config file.
pub trait Section: Default + Serialize + DeserializeOwned {
    /// Key of the section in the config file.
    const KEY: &'static str;

    /// Loads the section, with `overrides` merged on top.
    ///
    /// `overrides` is usually the command's CLI arguments, serialized with unset options skipped.
    fn load<O: Serialize>(file: Option<&Path>, overrides: &O) -> Result<Self, ExtractConfigError> {
        let figment = Self::figment(file).merge(Serialized::defaults(overrides));
        let section = figment.extract().map_err(ExtractConfigError::new)?;
        trace!(section = Self::KEY, "loaded config");
        Ok(section)
    }

    /// The figment of this section without any CLI overrides.
    fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            let data = if path.extension().is_some_and(|ext| ext == "toml") {
                Figment::from(Toml::file(path))
            } else {
                Figment::from(Json::file(path))
            };
            figment = figment.merge(data.focus(Self::KEY));
        }
        let prefix = format!("FUZZ_UTILS_{}_", Self::KEY.replace('-', "_").to_uppercase());
        // keys are camel cased here, `Env` must not lowercase them afterwards
        figment.merge(
            Env::prefixed(&prefix).lowercase(false).map(|key| snake_to_camel(key.as_str()).into()),
        )
    }
}

/// The whole config file, as written by `fuzz-utils init`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generate: GenerateConfig,
    pub convert: ConvertConfig,
    pub template: TemplateConfig,
    #[serde(rename = "modify-corpus")]
    pub modify_corpus: ModifyConfig,
}

impl Config {
    /// File name of the config in the project root.
    pub const FILE_NAME: &'static str = "fuzz-utils.json";

    /// The config as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Environment variables are upper snake case, config keys are camel case.
fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}
