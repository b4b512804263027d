use clap::{Parser, ValueEnum, ValueHint};
use eyre::Result;
use fuzz_utils_cli::utils::{self, display, print_success};
use fuzz_utils_config::{Section, TemplateConfig};
use fuzz_utils_harness::{HarnessGenerator, Remappings};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// CLI arguments for `fuzz-utils template`.
#[derive(Clone, Debug, Default, Parser, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateArgs {
    /// Path to the Foundry project.
    #[arg(value_hint = ValueHint::DirPath, value_name = "PATH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compilation_path: Option<PathBuf>,

    /// Name of the harness contract.
    #[arg(long, short = 'n')]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Contracts the harness wraps.
    #[arg(long = "contracts", short = 'c', num_args(1..), value_name = "NAME")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,

    /// Directory that receives the harness, relative to `./test`.
    #[arg(long, short = 'o', value_name = "DIR")]
    #[serde(skip)]
    pub output_dir: Option<PathBuf>,

    /// How the harness reaches the targets.
    #[arg(long, value_enum, ignore_case = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
}

/// Harness generation strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Call the targets directly.
    Simple,
    /// Prank one of the fuzzer's senders before each call.
    Prank,
    /// Route calls through deployed actor contracts.
    Actor,
}

impl TemplateArgs {
    pub fn run(self, config_file: Option<&Path>) -> Result<()> {
        let mut config = TemplateConfig::load(config_file, &self)?;
        if let Some(dir) = &self.output_dir {
            config.output_dir = Path::new("./test").join(dir);
        }
        let provider = utils::load_provider(&config.compilation_path)?;
        if config.targets.is_empty() {
            config.targets = vec![utils::target_contract(&provider, "")?];
        }
        let root = if config.compilation_path.is_dir() {
            config.compilation_path.as_path()
        } else {
            Path::new(".")
        };
        let remappings = Remappings::load(root)?;
        info!(mode = ?config.mode, targets = ?config.targets, "generating `{}`", config.name);

        let harness = HarnessGenerator::new(&config, &provider, remappings).generate()?;
        harness.write()?;
        for (path, _) in &harness.files {
            print_success(format!("Wrote {}", display(path)));
        }
        Ok(())
    }
}
