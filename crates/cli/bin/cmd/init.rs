use clap::{Parser, ValueHint};
use eyre::{Context, Result};
use fuzz_utils_cli::utils::{display, print_success};
use fuzz_utils_config::Config;
use std::path::PathBuf;

/// CLI arguments for `fuzz-utils init`.
#[derive(Clone, Debug, Parser)]
pub struct InitArgs {
    /// Where to write the config file.
    #[arg(long, value_hint = ValueHint::FilePath, default_value = Config::FILE_NAME)]
    pub out: PathBuf,

    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        if self.out.exists() && !self.force {
            eyre::bail!("{} already exists, pass --force to overwrite it", display(&self.out));
        }
        let json = Config::default().to_json_pretty()?;
        std::fs::write(&self.out, json + "\n")
            .wrap_err_with(|| format!("failed to write {}", display(&self.out)))?;
        print_success(format!("Initial config file saved to {}", display(&self.out)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzz_utils_config::{GenerateConfig, Section};

    #[test]
    fn writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("fuzz-utils.json");
        InitArgs { out: out.clone(), force: false }.run().unwrap();

        let written: Config =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written, Config::default());
        let generate = GenerateConfig::load(Some(&out), &serde_json::Map::new()).unwrap();
        assert_eq!(generate, GenerateConfig::default());

        let err = InitArgs { out, force: false }.run().unwrap_err();
        assert!(err.to_string().contains("--force"), "{err}");
    }
}
