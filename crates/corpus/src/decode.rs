use crate::{
    Action, CallArgs, CallKind, CallObject, DecodeError, DecodedCall, Invocation, ValueNode,
    value::{Elementary, parse_int, parse_uint},
    wire::WireFormat,
};
use alloy_dyn_abi::DynSolValue;
use fuzz_utils_abi::{SignatureProvider, TypeNode};
use serde_json::Value;

/// How deep values may nest before decoding gives up.
pub const MAX_DEPTH: usize = 64;

/// Decodes call objects of one wire format against the interface of the target contract.
///
/// Dispatch is driven by the declared parameter types. Tags, where the format has them, are
/// only checked against the type and then used to read the payload.
pub struct Decoder<'a> {
    format: &'a dyn WireFormat,
    provider: &'a dyn SignatureProvider,
    contract: &'a str,
}

impl<'a> Decoder<'a> {
    pub fn new(
        format: &'a dyn WireFormat,
        provider: &'a dyn SignatureProvider,
        contract: &'a str,
    ) -> Self {
        Self { format, provider, contract }
    }

    pub fn format(&self) -> &'a dyn WireFormat {
        self.format
    }

    /// Parses and decodes one raw call object.
    pub fn decode_raw(&self, raw: &Value) -> Result<DecodedCall, DecodeError> {
        self.decode_call(self.format.parse_call(raw)?)
    }

    /// Resolves the called function and decodes every argument.
    pub fn decode_call(&self, call: CallObject) -> Result<DecodedCall, DecodeError> {
        let action = match call.kind {
            CallKind::NoCall => Action::NoCall,
            CallKind::Transfer => Action::Transfer,
            CallKind::Invoke { function, args } => {
                let function =
                    self.provider.lookup_function(self.contract, &function, args.arity())?;
                let args = match args {
                    CallArgs::Params(params) => self.decode_params(&params, function.input_types())?,
                    CallArgs::Calldata(data) => {
                        if data.len() < 4 || data[..4] != function.selector[..] {
                            return Err(DecodeError::MalformedCall(format!(
                                "call data does not start with the selector of `{}`",
                                function.signature
                            )));
                        }
                        let DynSolValue::Tuple(values) =
                            function.input_tuple()?.abi_decode_params(&data[4..])?
                        else {
                            return Err(DecodeError::MalformedCall("call data is not a tuple".into()));
                        };
                        values
                            .into_iter()
                            .zip(function.input_types())
                            .map(|(value, ty)| ValueNode::from_dyn_sol(value, ty))
                            .collect::<Result<_, _>>()?
                    }
                };
                Action::Invoke(Invocation { function, args })
            }
        };
        Ok(DecodedCall { meta: call.meta, action })
    }

    /// Decodes a parameter list positionally against `types`.
    pub fn decode_params<'t>(
        &self,
        params: &[Value],
        types: impl ExactSizeIterator<Item = &'t TypeNode>,
    ) -> Result<Vec<ValueNode>, DecodeError> {
        if params.len() != types.len() {
            return Err(DecodeError::LengthMismatch { expected: types.len(), found: params.len() });
        }
        params.iter().zip(types).map(|(raw, ty)| self.decode_value(raw, ty)).collect()
    }

    /// Decodes a single value of type `ty`.
    pub fn decode_value(&self, raw: &Value, ty: &TypeNode) -> Result<ValueNode, DecodeError> {
        self.decode_at(raw, ty, 0)
    }

    fn decode_at(&self, raw: &Value, ty: &TypeNode, depth: usize) -> Result<ValueNode, DecodeError> {
        if depth > MAX_DEPTH {
            return Err(DecodeError::TooDeep(MAX_DEPTH));
        }
        self.check_tag(raw, ty)?;

        match ty {
            TypeNode::Elementary { name } => self.decode_elementary(raw, name),
            TypeNode::FixedArray { element, length } => {
                let items = self.format.array_items(raw)?;
                if items.len() != *length {
                    return Err(DecodeError::LengthMismatch { expected: *length, found: items.len() });
                }
                Ok(ValueNode::FixedArray(self.decode_items(items, element, depth)?))
            }
            TypeNode::DynamicArray { element } => {
                let items = self.format.array_items(raw)?;
                Ok(ValueNode::Array(self.decode_items(items, element, depth)?))
            }
            TypeNode::Struct { name, fields } => {
                let mut values = Vec::with_capacity(fields.len());
                for (index, (field, field_ty)) in fields.iter().enumerate() {
                    let raw = self.format.struct_field(raw, name, field, index, fields.len())?;
                    values.push((field.clone(), self.decode_at(raw, field_ty, depth + 1)?));
                }
                Ok(ValueNode::Struct { name: name.clone(), fields: values })
            }
            TypeNode::Enum { name } => {
                let text = self.format.integer(raw)?;
                let value = parse_uint(&text, 8)
                    .and_then(|value| u8::try_from(value).ok())
                    .ok_or_else(|| DecodeError::malformed(ty, format!("`{text}` is not a valid variant")))?;
                Ok(ValueNode::Enum { name: name.clone(), value })
            }
        }
    }

    fn decode_items(
        &self,
        items: &[Value],
        element: &TypeNode,
        depth: usize,
    ) -> Result<Vec<ValueNode>, DecodeError> {
        items.iter().map(|item| self.decode_at(item, element, depth + 1)).collect()
    }

    fn decode_elementary(&self, raw: &Value, name: &str) -> Result<ValueNode, DecodeError> {
        let kind = Elementary::parse(name).ok_or_else(|| DecodeError::UnsupportedType(name.to_string()))?;
        Ok(match kind {
            Elementary::Bool => ValueNode::Bool(self.format.bool(raw)?),
            Elementary::Address => ValueNode::Address(self.format.address(raw)?),
            Elementary::Uint(bits) => {
                let text = self.format.integer(raw)?;
                let value = parse_uint(&text, bits)
                    .ok_or_else(|| DecodeError::malformed(name, format!("`{text}` is out of range")))?;
                ValueNode::Uint { value, bits }
            }
            Elementary::Int(bits) => {
                let text = self.format.integer(raw)?;
                let value = parse_int(&text, bits)
                    .ok_or_else(|| DecodeError::malformed(name, format!("`{text}` is out of range")))?;
                ValueNode::Int { value, bits }
            }
            Elementary::FixedBytes(size) => {
                let mut bytes = self.format.bytes(raw)?;
                if bytes.len() > size {
                    return Err(DecodeError::malformed(
                        name,
                        format!("{} bytes do not fit", bytes.len()),
                    ));
                }
                bytes.resize(size, 0);
                ValueNode::FixedBytes(bytes)
            }
            Elementary::Bytes => ValueNode::Bytes(self.format.bytes(raw)?),
            Elementary::String => ValueNode::String(self.format.string(raw)?),
        })
    }

    fn check_tag(&self, raw: &Value, ty: &TypeNode) -> Result<(), DecodeError> {
        if !self.format.has_self_describing_tags() {
            return Ok(());
        }
        let found = self.format.param_tag(raw).ok_or_else(|| DecodeError::MissingTag(ty.to_string()))?;
        if !self.format.is_known_tag(found) {
            return Err(DecodeError::UnknownTag(found.to_string()));
        }
        match self.format.expected_tag(ty) {
            Some(expected) if expected == found => Ok(()),
            Some(expected) => Err(DecodeError::TagMismatch {
                expected: expected.to_string(),
                found: found.to_string(),
            }),
            None => Err(DecodeError::UnsupportedType(ty.to_string())),
        }
    }
}
