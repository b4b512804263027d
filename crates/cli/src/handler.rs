use crate::utils::dedup_chain;
use eyre::{Chain, EyreHandler};
use fuzz_utils_abi::AbiError;
use fuzz_utils_config::{Config, ExtractConfigError};
use fuzz_utils_harness::HarnessError;
use itertools::Itertools;
use std::{error::Error, fmt, fmt::Write};

/// Reports errors as their de-duplicated cause chain, followed by a hint when the failure is one
/// the user can fix.
///
/// With `FUZZ_UTILS_DEBUG` set, reports are rendered by `color-eyre` instead.
struct Handler {
    debug_handler: Option<Box<dyn EyreHandler>>,
}

impl EyreHandler for Handler {
    fn display(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Display;
        dedup_chain(error).into_iter().format("; ").fmt(f)
    }

    fn debug(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.debug_handler {
            Some(debug_handler) => debug_handler.debug(error, f),
            None if f.alternate() => fmt::Debug::fmt(error, f),
            None => f.write_str(&report(error)),
        }
    }

    fn track_caller(&mut self, location: &'static std::panic::Location<'static>) {
        if let Some(debug_handler) = &mut self.debug_handler {
            debug_handler.track_caller(location);
        }
    }
}

/// The error, its causes and a hint.
fn report(error: &(dyn Error + 'static)) -> String {
    let errors = dedup_chain(error);
    let mut out = String::new();
    if let Some((error, causes)) = errors.split_first() {
        out.push_str(error);
        if !causes.is_empty() {
            out.push_str("\n\nCaused by:");
            for cause in causes {
                let _ = write!(out, "\n  {cause}");
            }
        }
    }
    if let Some(hint) = hint(error) {
        let _ = write!(out, "\n\nHint: {hint}");
    }
    out
}

/// What to do about the first cause in the chain that is a known fuzz-utils error.
fn hint(error: &(dyn Error + 'static)) -> Option<String> {
    Chain::new(error).find_map(|cause| {
        if let Some(err) = cause.downcast_ref::<AbiError>() {
            return abi_hint(err);
        }
        if let Some(err) = cause.downcast_ref::<HarnessError>() {
            return match err {
                HarnessError::MissingRemappings(_) | HarnessError::PropertiesNotInstalled => Some(
                    "add `properties/=lib/properties/contracts/` to remappings.txt".to_string(),
                ),
                HarnessError::Abi(err) => abi_hint(err),
                _ => None,
            };
        }
        cause.downcast_ref::<ExtractConfigError>().map(|_| {
            format!("`fuzz-utils init` writes a {} with every setting", Config::FILE_NAME)
        })
    })
}

fn abi_hint(error: &AbiError) -> Option<String> {
    match error {
        AbiError::ContractNotFound(_) => Some(
            "compile the project with `forge build` and check the `--contract` name".to_string(),
        ),
        _ => None,
    }
}

/// Installs the fuzz-utils [`eyre`] and [`panic`](mod@std::panic) hooks as the global ones.
///
/// Panics are always reported by `color-eyre`. Errors are reported by a short user-facing
/// handler unless `FUZZ_UTILS_DEBUG` is set.
pub fn install() {
    let panic_section =
        "This is a bug. Consider reporting it at https://github.com/crytic/fuzz-utils";
    let (panic_hook, debug_hook) =
        color_eyre::config::HookBuilder::default().panic_section(panic_section).into_hooks();
    panic_hook.install();
    let debug_hook = debug_hook.into_eyre_hook();
    let debug = std::env::var_os("FUZZ_UTILS_DEBUG").is_some();
    if let Err(e) = eyre::set_hook(Box::new(move |e| {
        Box::new(Handler { debug_handler: debug.then(|| debug_hook(e)) })
    })) {
        debug!("failed to install eyre error hook: {e}");
    }
}
