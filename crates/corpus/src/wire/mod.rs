//! The on-disk call formats of the supported fuzzers.
//!
//! Both formats are read through [`WireFormat`], which hides field names and tag vocabulary
//! behind one interface so a single type-directed dispatcher can decode either of them.

use crate::{CallObject, DecodeError, DecodedCall, ValueNode};
use alloy_primitives::{Address, U256, hex};
use fuzz_utils_abi::TypeNode;
use fuzz_utils_config::Fuzzer;
use serde_json::Value;

mod echidna;
pub use echidna::Echidna;

mod medusa;
pub use medusa::Medusa;

/// Returns the wire format of `fuzzer`.
pub fn wire_format(fuzzer: Fuzzer) -> &'static dyn WireFormat {
    match fuzzer {
        Fuzzer::Echidna => &Echidna,
        Fuzzer::Medusa => &Medusa,
    }
}

/// Settings that only exist in the written format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeSettings {
    pub gas_fee_cap: String,
    pub gas_tip_cap: String,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self { gas_fee_cap: "0x0".to_string(), gas_tip_cap: "0x0".to_string() }
    }
}

/// Reads and writes one fuzzer's call objects.
///
/// The payload accessors receive the raw parameter as found in the call, tag included, and only
/// interpret its shape. Which accessor is called is decided by the parameter's declared type.
pub trait WireFormat: Send + Sync {
    fn fuzzer(&self) -> Fuzzer;

    /// Whether every parameter carries its own type tag.
    fn has_self_describing_tags(&self) -> bool;

    /// The type tag of a raw parameter.
    fn param_tag<'a>(&self, _raw: &'a Value) -> Option<&'a str> {
        None
    }

    /// The tag a parameter of type `ty` must carry. `None` for unsupported types.
    fn expected_tag(&self, _ty: &TypeNode) -> Option<&'static str> {
        None
    }

    /// Whether `tag` belongs to the format's tag vocabulary.
    fn is_known_tag(&self, _tag: &str) -> bool {
        false
    }

    fn bool(&self, raw: &Value) -> Result<bool, DecodeError>;

    /// The integer as text: decimal, optionally signed, or `0x` hex.
    fn integer(&self, raw: &Value) -> Result<String, DecodeError>;

    fn address(&self, raw: &Value) -> Result<Address, DecodeError>;

    fn bytes(&self, raw: &Value) -> Result<Vec<u8>, DecodeError>;

    fn string(&self, raw: &Value) -> Result<Vec<u8>, DecodeError>;

    fn array_items<'a>(&self, raw: &'a Value) -> Result<&'a [Value], DecodeError>;

    /// The value holding a struct's fields, either a list or a map.
    fn struct_payload<'a>(&self, raw: &'a Value) -> Result<&'a Value, DecodeError>;

    /// Extracts one struct field.
    ///
    /// List payloads must have exactly `arity` entries and are read in declaration order. Map
    /// payloads must contain every field by name.
    fn struct_field<'a>(
        &self,
        raw: &'a Value,
        name: &str,
        field: &str,
        index: usize,
        arity: usize,
    ) -> Result<&'a Value, DecodeError> {
        match self.struct_payload(raw)? {
            Value::Array(items) if items.len() == arity => Ok(&items[index]),
            Value::Array(items) => {
                Err(DecodeError::LengthMismatch { expected: arity, found: items.len() })
            }
            Value::Object(map) => map.get(field).ok_or_else(|| DecodeError::MissingField {
                name: name.to_string(),
                field: field.to_string(),
            }),
            other => Err(DecodeError::malformed(name, format!("expected a list or map, got {other}"))),
        }
    }

    /// Whether a call can only advance time and block number. Medusa has no such calls.
    fn supports_empty_calls(&self) -> bool {
        true
    }

    /// Parses one call object of a sequence.
    fn parse_call(&self, raw: &Value) -> Result<CallObject, DecodeError>;

    /// Writes a value in this format.
    fn encode_value(&self, value: &ValueNode, ty: &TypeNode) -> Value;

    /// Writes a decoded call in this format.
    fn encode_call(
        &self,
        call: &DecodedCall,
        settings: &EncodeSettings,
    ) -> Result<Value, DecodeError>;

    /// Replaces the sender of a raw call object in place.
    fn set_sender(&self, raw: &mut Value, sender: Address);

    /// Replaces the nonce of a raw call object. A no-op for formats without nonces.
    fn set_nonce(&self, _raw: &mut Value, _nonce: u64) {}

    /// Extension of corpus files written in this format.
    fn file_extension(&self) -> &'static str;

    /// Serializes a whole sequence for writing to disk.
    fn to_file_string(&self, sequence: &[Value]) -> serde_json::Result<String>;
}

/// Parses a hex or decimal quantity. Missing or empty values are zero.
pub(crate) fn quantity(value: Option<&Value>) -> Option<U256> {
    match value {
        None | Some(Value::Null) => Some(U256::ZERO),
        Some(Value::Number(n)) => U256::from_str_radix(&n.to_string(), 10).ok(),
        Some(Value::String(s)) => {
            let s = s.trim();
            match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some("") => Some(U256::ZERO),
                Some(digits) => U256::from_str_radix(digits, 16).ok(),
                None if s.is_empty() => Some(U256::ZERO),
                None => U256::from_str_radix(s, 10).ok(),
            }
        }
        Some(_) => None,
    }
}

pub(crate) fn quantity_u64(value: Option<&Value>, field: &str) -> Result<u64, DecodeError> {
    quantity(value)
        .and_then(|q| u64::try_from(q).ok())
        .ok_or_else(|| DecodeError::MalformedCall(format!("invalid `{field}` quantity")))
}

pub(crate) fn quantity_u256(value: Option<&Value>, field: &str) -> Result<U256, DecodeError> {
    quantity(value).ok_or_else(|| DecodeError::MalformedCall(format!("invalid `{field}` quantity")))
}

/// Parses an address, accepting short forms such as `0x10000`.
pub fn parse_address(s: &str) -> Option<Address> {
    let digits = s.trim().strip_prefix("0x").unwrap_or(s.trim());
    if digits.is_empty() || digits.len() > 40 {
        return None;
    }
    let padded = format!("{digits:0>40}");
    let bytes = hex::decode(padded).ok()?;
    Some(Address::from_slice(&bytes))
}

pub(crate) fn required_address(value: Option<&Value>, field: &str) -> Result<Address, DecodeError> {
    value
        .and_then(Value::as_str)
        .and_then(parse_address)
        .ok_or_else(|| DecodeError::MalformedCall(format!("invalid `{field}` address")))
}

/// `0x` prefixed lowercase hex without leading zeros.
pub(crate) fn hex_quantity(value: U256) -> String {
    format!("{value:#x}")
}

pub(crate) fn lower_address(address: Address) -> String {
    format!("{address:#x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_quantities() {
        assert_eq!(quantity(Some(&json!("0x64"))), Some(U256::from(100)));
        assert_eq!(quantity(Some(&json!("100"))), Some(U256::from(100)));
        assert_eq!(quantity(Some(&json!(100))), Some(U256::from(100)));
        assert_eq!(quantity(Some(&json!(""))), Some(U256::ZERO));
        assert_eq!(quantity(None), Some(U256::ZERO));
        assert_eq!(quantity(Some(&json!("zz"))), None);
        assert_eq!(hex_quantity(U256::ZERO), "0x0");
        assert_eq!(hex_quantity(U256::from(255)), "0xff");
    }

    #[test]
    fn parses_short_addresses() {
        let address = parse_address("0x10000").unwrap();
        assert_eq!(lower_address(address), "0x0000000000000000000000000000000000010000");
        assert_eq!(parse_address("0xnope"), None);
        assert_eq!(parse_address(&format!("0x{}", "1".repeat(41))), None);
    }
}
