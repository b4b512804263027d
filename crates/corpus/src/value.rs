use crate::DecodeError;
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, I256, U256};
use fuzz_utils_abi::TypeNode;

/// A type-checked argument value.
///
/// Both wire formats decode into this tree and every renderer reads from it, so it carries exactly
/// what is needed to write the value back out: integer widths, raw bytes, struct field names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueNode {
    Bool(bool),
    Uint { value: U256, bits: usize },
    Int { value: I256, bits: usize },
    Address(Address),
    /// `bytesN`, holding exactly `N` bytes.
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    /// Raw string bytes. Echidna strings are not guaranteed to be valid UTF-8.
    String(Vec<u8>),
    FixedArray(Vec<ValueNode>),
    Array(Vec<ValueNode>),
    Struct { name: String, fields: Vec<(String, ValueNode)> },
    Enum { name: String, value: u8 },
}

impl ValueNode {
    /// Converts the value for ABI encoding.
    ///
    /// Strings are encoded as `bytes`, which has the same ABI encoding and keeps invalid UTF-8
    /// intact.
    pub fn to_dyn_sol(&self) -> DynSolValue {
        match self {
            Self::Bool(b) => DynSolValue::Bool(*b),
            Self::Uint { value, bits } => DynSolValue::Uint(*value, *bits),
            Self::Int { value, bits } => DynSolValue::Int(*value, *bits),
            Self::Address(address) => DynSolValue::Address(*address),
            Self::FixedBytes(bytes) => {
                DynSolValue::FixedBytes(B256::right_padding_from(bytes), bytes.len())
            }
            Self::Bytes(bytes) | Self::String(bytes) => DynSolValue::Bytes(bytes.clone()),
            Self::FixedArray(items) => {
                DynSolValue::FixedArray(items.iter().map(Self::to_dyn_sol).collect())
            }
            Self::Array(items) => DynSolValue::Array(items.iter().map(Self::to_dyn_sol).collect()),
            Self::Struct { fields, .. } => {
                DynSolValue::Tuple(fields.iter().map(|(_, value)| value.to_dyn_sol()).collect())
            }
            Self::Enum { value, .. } => DynSolValue::Uint(U256::from(*value), 8),
        }
    }

    /// Rebuilds a value from ABI-decoded data, using `ty` for names and widths.
    pub fn from_dyn_sol(value: DynSolValue, ty: &TypeNode) -> Result<Self, DecodeError> {
        let mismatch = || DecodeError::malformed(ty, "call data does not match the parameter type");
        Ok(match (ty, value) {
            (TypeNode::Elementary { name }, value) => {
                let kind = Elementary::parse(name)
                    .ok_or_else(|| DecodeError::UnsupportedType(name.clone()))?;
                match (kind, value) {
                    (Elementary::Bool, DynSolValue::Bool(b)) => Self::Bool(b),
                    (Elementary::Address, DynSolValue::Address(a)) => Self::Address(a),
                    (Elementary::Uint(bits), DynSolValue::Uint(value, _)) => {
                        Self::Uint { value, bits }
                    }
                    (Elementary::Int(bits), DynSolValue::Int(value, _)) => Self::Int { value, bits },
                    (Elementary::FixedBytes(size), DynSolValue::FixedBytes(word, _)) => {
                        Self::FixedBytes(word[..size].to_vec())
                    }
                    (Elementary::Bytes, DynSolValue::Bytes(bytes)) => Self::Bytes(bytes),
                    (Elementary::String, DynSolValue::String(s)) => Self::String(s.into_bytes()),
                    (Elementary::String, DynSolValue::Bytes(bytes)) => Self::String(bytes),
                    _ => return Err(mismatch()),
                }
            }
            (TypeNode::FixedArray { element, length }, DynSolValue::FixedArray(items)) => {
                if items.len() != *length {
                    return Err(DecodeError::LengthMismatch { expected: *length, found: items.len() });
                }
                Self::FixedArray(
                    items
                        .into_iter()
                        .map(|item| Self::from_dyn_sol(item, element))
                        .collect::<Result<_, _>>()?,
                )
            }
            (TypeNode::DynamicArray { element }, DynSolValue::Array(items)) => Self::Array(
                items
                    .into_iter()
                    .map(|item| Self::from_dyn_sol(item, element))
                    .collect::<Result<_, _>>()?,
            ),
            (TypeNode::Struct { name, fields }, DynSolValue::Tuple(items)) => {
                if items.len() != fields.len() {
                    return Err(DecodeError::LengthMismatch {
                        expected: fields.len(),
                        found: items.len(),
                    });
                }
                let fields = fields
                    .iter()
                    .zip(items)
                    .map(|((field, ty), item)| Ok((field.clone(), Self::from_dyn_sol(item, ty)?)))
                    .collect::<Result<_, DecodeError>>()?;
                Self::Struct { name: name.clone(), fields }
            }
            (TypeNode::Enum { name }, DynSolValue::Uint(value, _)) => Self::Enum {
                name: name.clone(),
                value: u8::try_from(value)
                    .map_err(|_| DecodeError::malformed(ty, format!("{value} is out of range")))?,
            },
            _ => return Err(mismatch()),
        })
    }
}

/// Elementary Solidity types, parsed from their canonical names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Elementary {
    Bool,
    Address,
    String,
    Bytes,
    FixedBytes(usize),
    Uint(usize),
    Int(usize),
}

impl Elementary {
    pub(crate) fn parse(name: &str) -> Option<Self> {
        match name {
            "bool" => return Some(Self::Bool),
            "address" => return Some(Self::Address),
            "string" => return Some(Self::String),
            "bytes" => return Some(Self::Bytes),
            _ => {}
        }
        if let Some(bits) = name.strip_prefix("uint") {
            return int_bits(bits).map(Self::Uint);
        }
        if let Some(bits) = name.strip_prefix("int") {
            return int_bits(bits).map(Self::Int);
        }
        let size: usize = name.strip_prefix("bytes")?.parse().ok()?;
        (1..=32).contains(&size).then_some(Self::FixedBytes(size))
    }
}

fn int_bits(bits: &str) -> Option<usize> {
    if bits.is_empty() {
        return Some(256);
    }
    let bits: usize = bits.parse().ok()?;
    (bits % 8 == 0 && (8..=256).contains(&bits)).then_some(bits)
}

/// Parses a decimal or `0x` hex quantity that must fit into `bits`.
pub(crate) fn parse_uint(s: &str, bits: usize) -> Option<U256> {
    let s = s.trim();
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some("") => U256::ZERO,
        Some(hex) => U256::from_str_radix(hex, 16).ok()?,
        None => U256::from_str_radix(s, 10).ok()?,
    };
    (value.bit_len() <= bits).then_some(value)
}

/// Parses a signed decimal or hex quantity that must fit into `bits`.
pub(crate) fn parse_int(s: &str, bits: usize) -> Option<I256> {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let magnitude = parse_uint(digits, 256)?;
    let value = if negative {
        I256::checked_from_sign_and_abs(alloy_primitives::Sign::Negative, magnitude)?
    } else {
        I256::try_from(magnitude).ok()?
    };
    let needed = if value.is_negative() {
        (value + I256::ONE).unsigned_abs().bit_len() + 1
    } else {
        value.unsigned_abs().bit_len() + 1
    };
    (needed <= bits).then_some(value)
}
