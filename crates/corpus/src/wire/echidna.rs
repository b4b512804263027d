use super::{
    EncodeSettings, WireFormat, hex_quantity, lower_address, parse_address, quantity_u256,
    quantity_u64, required_address,
};
use crate::{
    Action, CallArgs, CallKind, CallMeta, CallObject, DecodeError, DecodedCall, ValueNode,
    codec::{decode_escaped_bytes, encode_escaped},
    value::Elementary,
};
use alloy_primitives::{Address, U256};
use fuzz_utils_abi::TypeNode;
use fuzz_utils_config::Fuzzer;
use serde_json::{Value, json};

const TAGS: &[&str] = &[
    "AbiBool",
    "AbiUInt",
    "AbiInt",
    "AbiAddress",
    "AbiBytes",
    "AbiBytesDynamic",
    "AbiString",
    "AbiArray",
    "AbiArrayDynamic",
    "AbiTuple",
];

/// Echidna call objects.
///
/// ```json
/// {"call": {"tag": "SolCall", "contents": ["deposit", [{"tag": "AbiUInt", "contents": [256, "5"]}]]},
///  "delay": ["0x0", "0x0"], "dst": "0x...", "gas": 12500000, "gasprice": "0x0", "src": "0x...",
///  "value": "0x0"}
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Echidna;

impl Echidna {
    fn contents<'a>(&self, raw: &'a Value) -> Result<&'a Value, DecodeError> {
        raw.get("contents").ok_or_else(|| {
            let tag = self.param_tag(raw).unwrap_or("parameter");
            DecodeError::malformed(tag, "missing `contents`")
        })
    }

    /// The type descriptor Echidna stores next to array values.
    fn type_descriptor(ty: &TypeNode) -> Value {
        match ty {
            TypeNode::Elementary { name } => match Elementary::parse(name) {
                Some(Elementary::Bool) => json!({"tag": "AbiBoolType"}),
                Some(Elementary::Address) => json!({"tag": "AbiAddressType"}),
                Some(Elementary::String) => json!({"tag": "AbiStringType"}),
                Some(Elementary::Bytes) => json!({"tag": "AbiBytesDynamicType"}),
                Some(Elementary::FixedBytes(size)) => {
                    json!({"tag": "AbiBytesType", "contents": size})
                }
                Some(Elementary::Uint(bits)) => json!({"tag": "AbiUIntType", "contents": bits}),
                Some(Elementary::Int(bits)) => json!({"tag": "AbiIntType", "contents": bits}),
                None => json!({"tag": name}),
            },
            TypeNode::FixedArray { element, length } => {
                json!({"tag": "AbiArrayType", "contents": [length, Self::type_descriptor(element)]})
            }
            TypeNode::DynamicArray { element } => {
                json!({"tag": "AbiArrayDynamicType", "contents": Self::type_descriptor(element)})
            }
            TypeNode::Struct { fields, .. } => {
                let fields: Vec<_> = fields.iter().map(|(_, ty)| Self::type_descriptor(ty)).collect();
                json!({"tag": "AbiTupleType", "contents": fields})
            }
            TypeNode::Enum { .. } => json!({"tag": "AbiUIntType", "contents": 8}),
        }
    }

    fn encode_items(&self, items: &[ValueNode], element: Option<&TypeNode>) -> Vec<Value> {
        match element {
            Some(element) => items.iter().map(|item| self.encode_value(item, element)).collect(),
            None => Vec::new(),
        }
    }
}

impl WireFormat for Echidna {
    fn fuzzer(&self) -> Fuzzer {
        Fuzzer::Echidna
    }

    fn has_self_describing_tags(&self) -> bool {
        true
    }

    fn param_tag<'a>(&self, raw: &'a Value) -> Option<&'a str> {
        raw.get("tag").and_then(Value::as_str)
    }

    fn expected_tag(&self, ty: &TypeNode) -> Option<&'static str> {
        Some(match ty {
            TypeNode::Elementary { name } => match Elementary::parse(name)? {
                Elementary::Bool => "AbiBool",
                Elementary::Address => "AbiAddress",
                Elementary::String => "AbiString",
                Elementary::Bytes => "AbiBytesDynamic",
                Elementary::FixedBytes(_) => "AbiBytes",
                Elementary::Uint(_) => "AbiUInt",
                Elementary::Int(_) => "AbiInt",
            },
            TypeNode::FixedArray { .. } => "AbiArray",
            TypeNode::DynamicArray { .. } => "AbiArrayDynamic",
            TypeNode::Struct { .. } => "AbiTuple",
            TypeNode::Enum { .. } => "AbiUInt",
        })
    }

    fn is_known_tag(&self, tag: &str) -> bool {
        TAGS.contains(&tag)
    }

    fn bool(&self, raw: &Value) -> Result<bool, DecodeError> {
        self.contents(raw)?.as_bool().ok_or_else(|| DecodeError::malformed("bool", "not a boolean"))
    }

    fn integer(&self, raw: &Value) -> Result<String, DecodeError> {
        // `[bits, n]`, with `n` either a number or a decimal string
        match self.contents(raw)?.get(1) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(DecodeError::malformed("integer", "expected `[bits, value]`")),
        }
    }

    fn address(&self, raw: &Value) -> Result<Address, DecodeError> {
        self.contents(raw)?
            .as_str()
            .and_then(parse_address)
            .ok_or_else(|| DecodeError::malformed("address", "not an address"))
    }

    fn bytes(&self, raw: &Value) -> Result<Vec<u8>, DecodeError> {
        // fixed size bytes are `[size, escaped]`, dynamic ones just the escaped string
        let contents = self.contents(raw)?;
        let escaped = match contents {
            Value::Array(pair) => pair.get(1).and_then(Value::as_str),
            other => other.as_str(),
        };
        escaped
            .map(decode_escaped_bytes)
            .ok_or_else(|| DecodeError::malformed("bytes", "expected an escaped string"))
    }

    fn string(&self, raw: &Value) -> Result<Vec<u8>, DecodeError> {
        self.contents(raw)?
            .as_str()
            .map(decode_escaped_bytes)
            .ok_or_else(|| DecodeError::malformed("string", "expected an escaped string"))
    }

    fn array_items<'a>(&self, raw: &'a Value) -> Result<&'a [Value], DecodeError> {
        // `AbiArray` is `[length, elementType, items]`, `AbiArrayDynamic` is `[elementType, items]`
        let index = match self.param_tag(raw) {
            Some("AbiArray") => 2,
            _ => 1,
        };
        self.contents(raw)?
            .get(index)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .ok_or_else(|| DecodeError::malformed("array", "missing array items"))
    }

    fn struct_payload<'a>(&self, raw: &'a Value) -> Result<&'a Value, DecodeError> {
        self.contents(raw)
    }

    fn parse_call(&self, raw: &Value) -> Result<CallObject, DecodeError> {
        let delay = raw.get("delay").and_then(Value::as_array);
        let meta = CallMeta {
            sender: required_address(raw.get("src"), "src")?,
            target: raw.get("dst").and_then(Value::as_str).and_then(parse_address),
            value: quantity_u256(raw.get("value"), "value")?,
            time_delay: quantity_u64(delay.and_then(|d| d.first()), "delay")?,
            block_delay: quantity_u64(delay.and_then(|d| d.get(1)), "delay")?,
            gas_limit: quantity_u64(raw.get("gas"), "gas")?,
            gas_price: quantity_u256(raw.get("gasprice"), "gasprice")?,
            nonce: None,
        };

        let call = raw.get("call").ok_or_else(|| DecodeError::MalformedCall("missing `call`".into()))?;
        let tag = call.get("tag").and_then(Value::as_str);
        if tag == Some("NoCall") {
            return Ok(CallObject { meta, kind: CallKind::NoCall });
        }

        let contents = call.get("contents").and_then(Value::as_array).ok_or_else(|| {
            DecodeError::MalformedCall(format!("call `{}` has no contents", tag.unwrap_or("?")))
        })?;
        let function = contents
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| DecodeError::MalformedCall("missing function name".into()))?;
        let params = contents.get(1).and_then(Value::as_array).cloned().unwrap_or_default();

        let kind = if !function.is_empty() {
            CallKind::Invoke { function: function.to_string(), args: CallArgs::Params(params) }
        } else if meta.value.is_zero() {
            CallKind::NoCall
        } else {
            CallKind::Transfer
        };
        Ok(CallObject { meta, kind })
    }

    fn encode_value(&self, value: &ValueNode, ty: &TypeNode) -> Value {
        match value {
            ValueNode::Bool(b) => json!({"tag": "AbiBool", "contents": b}),
            ValueNode::Uint { value, bits } => {
                json!({"tag": "AbiUInt", "contents": [bits, value.to_string()]})
            }
            ValueNode::Int { value, bits } => {
                json!({"tag": "AbiInt", "contents": [bits, value.to_string()]})
            }
            ValueNode::Address(address) => {
                json!({"tag": "AbiAddress", "contents": lower_address(*address)})
            }
            ValueNode::FixedBytes(bytes) => {
                json!({"tag": "AbiBytes", "contents": [bytes.len(), encode_escaped(bytes)]})
            }
            ValueNode::Bytes(bytes) => {
                json!({"tag": "AbiBytesDynamic", "contents": encode_escaped(bytes)})
            }
            ValueNode::String(bytes) => json!({"tag": "AbiString", "contents": encode_escaped(bytes)}),
            ValueNode::FixedArray(items) => {
                let element = ty.element();
                let descriptor = element.map(Self::type_descriptor).unwrap_or(Value::Null);
                json!({
                    "tag": "AbiArray",
                    "contents": [items.len(), descriptor, self.encode_items(items, element)],
                })
            }
            ValueNode::Array(items) => {
                let element = ty.element();
                let descriptor = element.map(Self::type_descriptor).unwrap_or(Value::Null);
                json!({
                    "tag": "AbiArrayDynamic",
                    "contents": [descriptor, self.encode_items(items, element)],
                })
            }
            ValueNode::Struct { fields, .. } => {
                let types = match ty {
                    TypeNode::Struct { fields, .. } => fields.as_slice(),
                    _ => &[],
                };
                let items: Vec<_> = fields
                    .iter()
                    .zip(types)
                    .map(|((_, value), (_, ty))| self.encode_value(value, ty))
                    .collect();
                json!({"tag": "AbiTuple", "contents": items})
            }
            ValueNode::Enum { value, .. } => {
                json!({"tag": "AbiUInt", "contents": [8, value.to_string()]})
            }
        }
    }

    fn encode_call(
        &self,
        call: &DecodedCall,
        _settings: &EncodeSettings,
    ) -> Result<Value, DecodeError> {
        let meta = &call.meta;
        let body = match &call.action {
            Action::NoCall => json!({"tag": "NoCall"}),
            Action::Transfer => json!({"tag": "SolCall", "contents": ["", []]}),
            Action::Invoke(invocation) => {
                let params: Vec<_> = invocation
                    .args
                    .iter()
                    .zip(invocation.function.input_types())
                    .map(|(value, ty)| self.encode_value(value, ty))
                    .collect();
                json!({"tag": "SolCall", "contents": [invocation.function.name, params]})
            }
        };
        Ok(json!({
            "call": body,
            "delay": [
                hex_quantity(U256::from(meta.time_delay)),
                hex_quantity(U256::from(meta.block_delay)),
            ],
            "dst": lower_address(meta.target.unwrap_or_default()),
            "gas": meta.gas_limit,
            "gasprice": hex_quantity(meta.gas_price),
            "src": lower_address(meta.sender),
            "value": hex_quantity(meta.value),
        }))
    }

    fn set_sender(&self, raw: &mut Value, sender: Address) {
        if let Some(call) = raw.as_object_mut() {
            call.insert("src".to_string(), Value::String(lower_address(sender)));
        }
    }

    fn file_extension(&self) -> &'static str {
        "txt"
    }

    fn to_file_string(&self, sequence: &[Value]) -> serde_json::Result<String> {
        serde_json::to_string(sequence)
    }
}
