use super::{
    EncodeSettings, WireFormat, hex_quantity, lower_address, parse_address, quantity_u256,
    quantity_u64, required_address,
};
use crate::{Action, CallArgs, CallKind, CallMeta, CallObject, DecodeError, DecodedCall, ValueNode};
use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, hex};
use fuzz_utils_abi::TypeNode;
use fuzz_utils_config::Fuzzer;
use serde_json::{Map, Value, json};
use std::borrow::Cow;

/// Medusa call sequence elements.
///
/// Argument values are untagged and only make sense next to the function signature. Older
/// releases name the function with `methodName`, newer ones with `methodSignature`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Medusa;

impl WireFormat for Medusa {
    fn fuzzer(&self) -> Fuzzer {
        Fuzzer::Medusa
    }

    fn has_self_describing_tags(&self) -> bool {
        false
    }

    fn supports_empty_calls(&self) -> bool {
        false
    }

    fn bool(&self, raw: &Value) -> Result<bool, DecodeError> {
        match raw {
            Value::Bool(b) => Ok(*b),
            Value::String(s) if s == "true" => Ok(true),
            Value::String(s) if s == "false" => Ok(false),
            _ => Err(DecodeError::malformed("bool", format!("not a boolean: {raw}"))),
        }
    }

    fn integer(&self, raw: &Value) -> Result<String, DecodeError> {
        match raw {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(DecodeError::malformed("integer", format!("not an integer: {raw}"))),
        }
    }

    fn address(&self, raw: &Value) -> Result<Address, DecodeError> {
        raw.as_str()
            .and_then(parse_address)
            .ok_or_else(|| DecodeError::malformed("address", format!("not an address: {raw}")))
    }

    fn bytes(&self, raw: &Value) -> Result<Vec<u8>, DecodeError> {
        match raw {
            Value::String(s) => hex::decode(s).map_err(|err| DecodeError::malformed("bytes", err)),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| DecodeError::malformed("bytes", "expected a list of bytes")),
            _ => Err(DecodeError::malformed("bytes", format!("not a byte string: {raw}"))),
        }
    }

    fn string(&self, raw: &Value) -> Result<Vec<u8>, DecodeError> {
        raw.as_str()
            .map(|s| s.as_bytes().to_vec())
            .ok_or_else(|| DecodeError::malformed("string", format!("not a string: {raw}")))
    }

    fn array_items<'a>(&self, raw: &'a Value) -> Result<&'a [Value], DecodeError> {
        raw.as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| DecodeError::malformed("array", format!("not a list: {raw}")))
    }

    fn struct_payload<'a>(&self, raw: &'a Value) -> Result<&'a Value, DecodeError> {
        Ok(raw)
    }

    fn parse_call(&self, raw: &Value) -> Result<CallObject, DecodeError> {
        let call = raw.get("call").ok_or_else(|| DecodeError::MalformedCall("missing `call`".into()))?;
        let meta = CallMeta {
            sender: required_address(call.get("from"), "from")?,
            target: call.get("to").and_then(Value::as_str).and_then(parse_address),
            value: quantity_u256(call.get("value"), "value")?,
            time_delay: quantity_u64(raw.get("blockTimestampDelay"), "blockTimestampDelay")?,
            block_delay: quantity_u64(raw.get("blockNumberDelay"), "blockNumberDelay")?,
            gas_limit: quantity_u64(call.get("gasLimit"), "gasLimit")?,
            gas_price: quantity_u256(call.get("gasPrice"), "gasPrice")?,
            nonce: call.get("nonce").and_then(Value::as_u64),
        };

        let function = call
            .get("dataAbiValues")
            .filter(|abi| !abi.is_null())
            .map(|abi| {
                abi.get("methodName")
                    .or_else(|| abi.get("methodSignature"))
                    .and_then(Value::as_str)
                    .map(|function| (function, abi.get("inputValues")))
                    .ok_or_else(|| {
                        DecodeError::MalformedCall(
                            "`dataAbiValues` has neither `methodName` nor `methodSignature`".into(),
                        )
                    })
            })
            .transpose()?
            .filter(|(function, _)| !function.is_empty());

        let kind = match function {
            Some((function, Some(Value::Array(values)))) => CallKind::Invoke {
                function: function.to_string(),
                args: CallArgs::Params(values.clone()),
            },
            Some((function, _)) => {
                let data = call.get("data").and_then(Value::as_str).unwrap_or_default();
                let data = hex::decode(data)
                    .map_err(|err| DecodeError::MalformedCall(format!("invalid `data`: {err}")))?;
                CallKind::Invoke {
                    function: function.to_string(),
                    args: CallArgs::Calldata(Bytes::from(data)),
                }
            }
            None if meta.value.is_zero() => CallKind::NoCall,
            None => CallKind::Transfer,
        };
        Ok(CallObject { meta, kind })
    }

    fn encode_value(&self, value: &ValueNode, _ty: &TypeNode) -> Value {
        encode_untagged(value)
    }

    fn encode_call(
        &self,
        call: &DecodedCall,
        settings: &EncodeSettings,
    ) -> Result<Value, DecodeError> {
        let meta = &call.meta;
        let target = meta
            .target
            .ok_or_else(|| DecodeError::MalformedCall("call has no target address".into()))?;

        let (data, abi_values) = match &call.action {
            Action::Invoke(invocation) => {
                let args = DynSolValue::Tuple(invocation.args.iter().map(ValueNode::to_dyn_sol).collect());
                let mut data = invocation.function.selector.to_vec();
                data.extend(args.abi_encode_params());
                let inputs: Vec<_> = invocation.args.iter().map(encode_untagged).collect();
                let abi = json!({
                    "methodSignature": invocation.function.signature,
                    "inputValues": inputs,
                });
                (hex::encode_prefixed(data), abi)
            }
            Action::NoCall | Action::Transfer => ("0x".to_string(), Value::Null),
        };

        Ok(json!({
            "call": {
                "from": lower_address(meta.sender),
                "to": lower_address(target),
                "nonce": meta.nonce.unwrap_or_default(),
                "value": hex_quantity(meta.value),
                "gasLimit": meta.gas_limit,
                "gasPrice": hex_quantity(meta.gas_price),
                "gasFeeCap": settings.gas_fee_cap,
                "gasTipCap": settings.gas_tip_cap,
                "data": data,
                "dataAbiValues": abi_values,
                "AccessList": null,
                "SkipAccountChecks": false,
            },
            "blockNumberDelay": meta.block_delay,
            "blockTimestampDelay": meta.time_delay,
        }))
    }

    fn set_sender(&self, raw: &mut Value, sender: Address) {
        if let Some(call) = raw.get_mut("call").and_then(Value::as_object_mut) {
            call.insert("from".to_string(), Value::String(lower_address(sender)));
        }
    }

    fn set_nonce(&self, raw: &mut Value, nonce: u64) {
        if let Some(call) = raw.get_mut("call").and_then(Value::as_object_mut) {
            call.insert("nonce".to_string(), Value::from(nonce));
        }
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }

    fn to_file_string(&self, sequence: &[Value]) -> serde_json::Result<String> {
        serde_json::to_string_pretty(sequence)
    }
}

/// Integers are decimal strings, bytes unprefixed hex, structs maps in field order.
///
/// Medusa stores strings as UTF-8 JSON, so invalid sequences in a string are replaced with
/// U+FFFD.
fn encode_untagged(value: &ValueNode) -> Value {
    match value {
        ValueNode::Bool(b) => Value::Bool(*b),
        ValueNode::Uint { value, .. } => Value::String(value.to_string()),
        ValueNode::Int { value, .. } => Value::String(value.to_string()),
        ValueNode::Address(address) => Value::String(address.to_checksum(None)),
        ValueNode::FixedBytes(bytes) | ValueNode::Bytes(bytes) => Value::String(hex::encode(bytes)),
        ValueNode::String(bytes) => {
            let string = String::from_utf8_lossy(bytes);
            if let Cow::Owned(_) = string {
                warn!(
                    bytes = %hex::encode(bytes),
                    "string is not valid UTF-8, replacing invalid bytes"
                );
            }
            Value::String(string.into_owned())
        }
        ValueNode::FixedArray(items) | ValueNode::Array(items) => {
            Value::Array(items.iter().map(encode_untagged).collect())
        }
        ValueNode::Struct { fields, .. } => Value::Object(
            fields.iter().map(|(name, value)| (name.clone(), encode_untagged(value))).collect::<Map<_, _>>(),
        ),
        ValueNode::Enum { value, .. } => Value::String(value.to_string()),
    }
}
