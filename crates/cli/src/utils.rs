use crate::opts::ColorChoice;
use eyre::{Chain, Context, Result};
use fuzz_utils_abi::ArtifactProvider;
use std::{error::Error, path::Path};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};
use yansi::Paint;

/// Deduplicates a chain of errors.
///
/// The common pattern `msg1: msg2; msg2` becomes `msg1: msg2`.
pub fn dedup_chain(error: &(dyn Error + 'static)) -> Vec<String> {
    let mut causes: Vec<_> =
        Chain::new(error).map(|cause| cause.to_string().trim().to_string()).collect();
    causes.dedup_by(|b, a| a.contains(b.as_str()));
    causes
}

/// Initializes a tracing subscriber for logging, filtered by `RUST_LOG` and falling back to
/// `level`.
pub fn subscriber(level: LevelFilter) {
    let filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();
    let _ = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}

pub fn enable_paint(choice: ColorChoice) {
    match choice {
        ColorChoice::Auto => yansi::whenever(yansi::Condition::TTY_AND_COLOR),
        ColorChoice::Always => yansi::enable(),
        ColorChoice::Never => yansi::disable(),
    }
}

/// Loads the compiled artifacts of the project at `path`.
pub fn load_provider(path: &Path) -> Result<ArtifactProvider> {
    ArtifactProvider::load(path).wrap_err_with(|| {
        let path = display(path);
        format!("failed to load the compiled contracts from {path}, run `forge build` first")
    })
}

/// The target contract, derived from the artifacts when `name` is empty.
pub fn target_contract(provider: &ArtifactProvider, name: &str) -> Result<String> {
    if !name.is_empty() {
        return Ok(name.to_string());
    }
    let Some(contract) = provider.sole_contract() else {
        eyre::bail!("the target contract cannot be determined, specify it with `-c <NAME>`");
    };
    info!("target contract not specified, using derived target `{}`", contract.name);
    Ok(contract.name.clone())
}

/// A path as the user expects to read it, without Windows verbatim prefixes.
pub fn display(path: &Path) -> String {
    dunce::simplified(path).display().to_string()
}

/// Prints a success line.
pub fn print_success(message: impl std::fmt::Display) {
    println!("{} {message}", "✓".green().bold());
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzz_utils_abi::ContractInterface;

    #[test]
    fn dedups_contained() {
        let err = eyre::eyre!("hello").wrap_err("my error: hello");
        assert_eq!(dedup_chain(err.as_ref()), ["my error: hello"]);

        let err = eyre::eyre!("not found").wrap_err("failed to load");
        assert_eq!(dedup_chain(err.as_ref()), ["failed to load", "not found"]);
    }

    #[test]
    fn derives_sole_target() {
        let provider = ArtifactProvider::new(vec![
            ContractInterface::new("Vault", Default::default()).with_source("src/Vault.sol"),
            ContractInterface::new("Helper", Default::default()).with_source("lib/x/Helper.sol"),
        ]);
        assert_eq!(target_contract(&provider, "").unwrap(), "Vault");
        assert_eq!(target_contract(&provider, "Other").unwrap(), "Other");

        let provider = ArtifactProvider::new(vec![
            ContractInterface::new("A", Default::default()),
            ContractInterface::new("B", Default::default()),
        ]);
        let err = target_contract(&provider, "").unwrap_err();
        assert!(err.to_string().contains("-c <NAME>"), "{err}");
    }
}
