use fuzz_utils_abi::AbiError;

/// Errors raised while decoding a single call.
///
/// These never abort a batch: the offending sequence is skipped and reported.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown parameter tag `{0}`")]
    UnknownTag(String),
    #[error("expected a `{expected}` parameter, found tag `{found}`")]
    TagMismatch { expected: String, found: String },
    #[error("parameter of type `{0}` has no type tag")]
    MissingTag(String),
    #[error("unsupported parameter type `{0}`")]
    UnsupportedType(String),
    #[error("malformed `{ty}` value: {reason}")]
    Malformed { ty: String, reason: String },
    #[error("struct `{name}` has no value for field `{field}`")]
    MissingField { name: String, field: String },
    #[error("expected {expected} values, found {found}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("values are nested deeper than {0} levels")]
    TooDeep(usize),
    #[error("malformed call object: {0}")]
    MalformedCall(String),
    #[error("cannot write an anonymous tuple as a Solidity literal")]
    AnonymousTuple,
    #[error(transparent)]
    Abi(#[from] AbiError),
    #[error("failed to decode call data")]
    Calldata(#[from] alloy_dyn_abi::Error),
}

impl DecodeError {
    pub(crate) fn malformed(ty: impl ToString, reason: impl ToString) -> Self {
        Self::Malformed { ty: ty.to_string(), reason: reason.to_string() }
    }
}
