use std::path::PathBuf;

/// Errors raised while loading artifacts or resolving contract interfaces.
#[derive(Debug, thiserror::Error)]
pub enum AbiError {
    #[error("could not find contract `{0}` in the compiled artifacts")]
    ContractNotFound(String),
    #[error("function `{function}` not found in contract `{contract}`")]
    FunctionNotFound { contract: String, function: String },
    #[error("function `{function}` takes {expected} parameter(s) but the call provides {found}")]
    ArityMismatch { function: String, expected: usize, found: usize },
    #[error("struct `{0}` is not used by any function of the contract")]
    StructNotFound(String),
    #[error("invalid type `{0}`")]
    InvalidType(String),
    #[error("no compiled artifacts found in {}", .0.display())]
    NoArtifacts(PathBuf),
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
