use crate::AbiError;
use alloy_dyn_abi::DynSolType;
use alloy_json_abi::{InternalType, Param};
use std::fmt;

/// The statically known type of a function parameter.
///
/// Built from an ABI [`Param`]; `internalType` is what tells structs and enums apart from plain
/// tuples and `uint8`s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeNode {
    /// A value type, `bytes` or `string`, e.g. `uint256`, `bytes32`.
    Elementary { name: String },
    /// `T[N]`
    FixedArray { element: Box<TypeNode>, length: usize },
    /// `T[]`
    DynamicArray { element: Box<TypeNode> },
    /// A struct. The name is qualified with the declaring contract when there is one
    /// (`Vault.Position`). Anonymous tuples have an empty name.
    Struct { name: String, fields: Vec<(String, TypeNode)> },
    /// An enum, ABI-encoded as `uint8`.
    Enum { name: String },
}

impl TypeNode {
    pub fn elementary(name: impl Into<String>) -> Self {
        Self::Elementary { name: name.into() }
    }

    pub fn fixed_array(element: Self, length: usize) -> Self {
        Self::FixedArray { element: Box::new(element), length }
    }

    pub fn dynamic_array(element: Self) -> Self {
        Self::DynamicArray { element: Box::new(element) }
    }

    /// Builds the type tree of an ABI parameter.
    pub fn from_param(param: &Param) -> Result<Self, AbiError> {
        Self::resolve(&param.ty, &param.components, param.internal_type.as_ref())
    }

    fn resolve(
        ty: &str,
        components: &[Param],
        internal: Option<&InternalType>,
    ) -> Result<Self, AbiError> {
        // The last dimension is the outermost one: `uint8[2][]` is a dynamic array of `uint8[2]`.
        if let Some(inner) = ty.strip_suffix(']') {
            let open = inner.rfind('[').ok_or_else(|| AbiError::InvalidType(ty.to_string()))?;
            let element = Box::new(Self::resolve(&inner[..open], components, internal)?);
            let dimension = &inner[open + 1..];
            if dimension.is_empty() {
                return Ok(Self::DynamicArray { element });
            }
            let length =
                dimension.parse().map_err(|_| AbiError::InvalidType(ty.to_string()))?;
            return Ok(Self::FixedArray { element, length });
        }

        if let Some(InternalType::Enum { contract, ty: name }) = internal {
            return Ok(Self::Enum { name: qualified(contract.as_deref(), name) });
        }

        if ty == "tuple" {
            let name = match internal {
                Some(InternalType::Struct { contract, ty: name }) => {
                    qualified(contract.as_deref(), name)
                }
                _ => String::new(),
            };
            let fields = components
                .iter()
                .map(|field| Ok((field.name.clone(), Self::from_param(field)?)))
                .collect::<Result<_, AbiError>>()?;
            return Ok(Self::Struct { name, fields });
        }

        let name = match ty {
            "uint" => "uint256",
            "int" => "int256",
            other => other,
        };
        Ok(Self::elementary(name))
    }

    /// The element type of an array, if this is one.
    pub fn element(&self) -> Option<&Self> {
        match self {
            Self::FixedArray { element, .. } | Self::DynamicArray { element } => Some(element),
            _ => None,
        }
    }

    /// Whether a parameter of this type needs a `memory` location in a function signature.
    pub fn is_reference(&self) -> bool {
        match self {
            Self::Elementary { name } => name == "string" || name == "bytes",
            Self::FixedArray { .. } | Self::DynamicArray { .. } | Self::Struct { .. } => true,
            Self::Enum { .. } => false,
        }
    }

    /// The canonical ABI type string, e.g. `(uint256,address)[]`.
    pub fn abi_type(&self) -> String {
        match self {
            Self::Elementary { name } => name.clone(),
            Self::FixedArray { element, length } => format!("{}[{length}]", element.abi_type()),
            Self::DynamicArray { element } => format!("{}[]", element.abi_type()),
            Self::Struct { fields, .. } => {
                let inner: Vec<_> = fields.iter().map(|(_, ty)| ty.abi_type()).collect();
                format!("({})", inner.join(","))
            }
            Self::Enum { .. } => "uint8".to_string(),
        }
    }

    /// Resolves the type for ABI encoding and decoding.
    pub fn dyn_sol_type(&self) -> Result<DynSolType, AbiError> {
        Ok(match self {
            Self::Elementary { name } => {
                DynSolType::parse(name).map_err(|_| AbiError::InvalidType(name.clone()))?
            }
            Self::FixedArray { element, length } => {
                DynSolType::FixedArray(Box::new(element.dyn_sol_type()?), *length)
            }
            Self::DynamicArray { element } => DynSolType::Array(Box::new(element.dyn_sol_type()?)),
            Self::Struct { fields, .. } => DynSolType::Tuple(
                fields.iter().map(|(_, ty)| ty.dyn_sol_type()).collect::<Result<_, _>>()?,
            ),
            Self::Enum { .. } => DynSolType::Uint(8),
        })
    }

    /// Looks up a struct with the given name anywhere in this tree.
    ///
    /// Matches either the qualified name or the bare struct name.
    pub fn find_struct(&self, type_name: &str) -> Option<&Vec<(String, Self)>> {
        match self {
            Self::Struct { name, fields } => {
                let bare = name.rsplit('.').next().unwrap_or(name);
                if name == type_name || bare == type_name {
                    return Some(fields);
                }
                fields.iter().find_map(|(_, ty)| ty.find_struct(type_name))
            }
            Self::FixedArray { element, .. } | Self::DynamicArray { element } => {
                element.find_struct(type_name)
            }
            Self::Elementary { .. } | Self::Enum { .. } => None,
        }
    }
}

/// Formats the type as written in Solidity source, e.g. `Vault.Position[]`.
impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elementary { name } | Self::Enum { name } => f.write_str(name),
            Self::Struct { name, .. } => f.write_str(name),
            Self::FixedArray { element, length } => write!(f, "{element}[{length}]"),
            Self::DynamicArray { element } => write!(f, "{element}[]"),
        }
    }
}

/// `internalType` repeats the array dimensions of the parameter, strip them off the name.
fn qualified(contract: Option<&str>, ty: &str) -> String {
    let name = ty.split('[').next().unwrap_or(ty);
    match contract {
        Some(contract) => format!("{contract}.{name}"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(json: &str) -> Param {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn resolves_nested_arrays_outermost_last() {
        let ty = TypeNode::from_param(&param(
            r#"{"name":"grid","type":"uint8[2][]","internalType":"uint8[2][]"}"#,
        ))
        .unwrap();
        assert_eq!(
            ty,
            TypeNode::dynamic_array(TypeNode::fixed_array(TypeNode::elementary("uint8"), 2))
        );
        assert_eq!(ty.to_string(), "uint8[2][]");
    }

    #[test]
    fn resolves_structs_and_enums() {
        let ty = TypeNode::from_param(&param(
            r#"{
                "name": "positions",
                "type": "tuple[]",
                "internalType": "struct Vault.Position[]",
                "components": [
                    {"name": "size", "type": "uint256", "internalType": "uint256"},
                    {"name": "side", "type": "uint8", "internalType": "enum Vault.Side"}
                ]
            }"#,
        ))
        .unwrap();
        let TypeNode::DynamicArray { element } = &ty else { panic!("expected array: {ty:?}") };
        assert_eq!(
            **element,
            TypeNode::Struct {
                name: "Vault.Position".into(),
                fields: vec![
                    ("size".into(), TypeNode::elementary("uint256")),
                    ("side".into(), TypeNode::Enum { name: "Vault.Side".into() }),
                ],
            }
        );
        assert_eq!(ty.abi_type(), "(uint256,uint8)[]");
        assert!(ty.find_struct("Position").is_some());
        assert!(ty.find_struct("Vault.Position").is_some());
        assert!(ty.find_struct("Side").is_none());
    }

    #[test]
    fn file_level_struct_is_unqualified() {
        let ty = TypeNode::from_param(&param(
            r#"{"name":"p","type":"tuple","internalType":"struct Point",
                "components":[{"name":"x","type":"int","internalType":"int256"}]}"#,
        ))
        .unwrap();
        assert_eq!(ty.to_string(), "Point");
        assert_eq!(ty.abi_type(), "(int256)");
        assert_eq!(ty.dyn_sol_type().unwrap(), DynSolType::Tuple(vec![DynSolType::Int(256)]));
    }

    #[test]
    fn contract_types_are_addresses() {
        let ty = TypeNode::from_param(&param(
            r#"{"name":"token","type":"address","internalType":"contract IERC20"}"#,
        ))
        .unwrap();
        assert_eq!(ty, TypeNode::elementary("address"));
        assert!(!ty.is_reference());
    }
}
