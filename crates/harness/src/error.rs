use fuzz_utils_abi::AbiError;
use std::path::PathBuf;

/// Errors raised while scaffolding a harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error(
        "no remappings.txt in {}, install crytic/properties with `forge install crytic/properties` \
         and add its remapping",
        .0.display()
    )]
    MissingRemappings(PathBuf),
    #[error("crytic/properties is not remapped, install it with `forge install crytic/properties`")]
    PropertiesNotInstalled,
    #[error("no target contracts to wrap")]
    NoTargets,
    #[error("`{0}` has no bytecode and cannot be deployed by the harness")]
    NotDeployable(String),
    #[error("actor `{actor}` targets `{target}`, which is not one of the harness targets")]
    UnknownActorTarget { actor: String, target: String },
    #[error("actor `{0}` must be deployed at least once")]
    NoActors(String),
    #[error("unknown attack `{0}`, available attacks: Donation")]
    UnknownAttack(String),
    #[error(transparent)]
    Abi(#[from] AbiError),
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
