use crate::ValueNode;
use alloy_primitives::{Address, Bytes, U256};
use fuzz_utils_abi::FunctionSignature;
use serde_json::Value;

/// Transaction fields shared by both corpus formats.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallMeta {
    pub sender: Address,
    /// Only Medusa and converted Echidna corpora record the target.
    pub target: Option<Address>,
    pub value: U256,
    pub time_delay: u64,
    pub block_delay: u64,
    pub gas_limit: u64,
    pub gas_price: U256,
    /// Medusa records sender nonces, Echidna doesn't.
    pub nonce: Option<u64>,
}

impl CallMeta {
    pub fn has_delay(&self) -> bool {
        self.time_delay > 0 || self.block_delay > 0
    }
}

/// One call as read from a corpus file, arguments still in wire form.
#[derive(Clone, Debug, PartialEq)]
pub struct CallObject {
    pub meta: CallMeta,
    pub kind: CallKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CallKind {
    /// Only advances time and block number.
    NoCall,
    /// Plain value transfer to the target.
    Transfer,
    /// A function call. `function` is a bare name or a full signature.
    Invoke { function: String, args: CallArgs },
}

impl CallKind {
    /// The bare function name, empty unless this is an invocation.
    pub fn function_name(&self) -> &str {
        match self {
            Self::Invoke { function, .. } => function.split('(').next().unwrap_or(function),
            Self::NoCall | Self::Transfer => "",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CallArgs {
    /// One raw value per parameter.
    Params(Vec<Value>),
    /// ABI-encoded call data, selector included, for Medusa calls without decoded values.
    Calldata(Bytes),
}

impl CallArgs {
    /// Number of raw parameters, when known without decoding.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Self::Params(params) => Some(params.len()),
            Self::Calldata(_) => None,
        }
    }
}

/// A call whose arguments have been checked against the function signature.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedCall {
    pub meta: CallMeta,
    pub action: Action,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    NoCall,
    Transfer,
    Invoke(Invocation),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    pub function: FunctionSignature,
    pub args: Vec<ValueNode>,
}

impl DecodedCall {
    /// Name of the called function, empty for transfers and empty calls.
    pub fn function_name(&self) -> &str {
        match &self.action {
            Action::Invoke(invocation) => &invocation.function.name,
            Action::NoCall | Action::Transfer => "",
        }
    }
}
