use crate::{AbiError, TypeNode};
use alloy_dyn_abi::DynSolType;
use alloy_json_abi::{Function, JsonAbi, StateMutability};
use alloy_primitives::Selector;
use std::path::PathBuf;

/// A resolved function of a contract interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    /// Canonical signature, e.g. `deposit(uint256,(address,uint8))`.
    pub signature: String,
    pub selector: Selector,
    /// Named parameters in declaration order.
    pub inputs: Vec<(String, TypeNode)>,
    pub outputs: Vec<(String, TypeNode)>,
    pub state_mutability: StateMutability,
}

impl FunctionSignature {
    pub fn from_function(function: &Function) -> Result<Self, AbiError> {
        let params = |params: &[alloy_json_abi::Param]| {
            params
                .iter()
                .map(|param| Ok((param.name.clone(), TypeNode::from_param(param)?)))
                .collect::<Result<Vec<_>, AbiError>>()
        };
        Ok(Self {
            name: function.name.clone(),
            signature: function.signature(),
            selector: function.selector(),
            inputs: params(&function.inputs)?,
            outputs: params(&function.outputs)?,
            state_mutability: function.state_mutability,
        })
    }

    pub fn is_payable(&self) -> bool {
        self.state_mutability == StateMutability::Payable
    }

    /// Whether the function may modify state, i.e. it is neither `view` nor `pure`.
    pub fn is_state_changing(&self) -> bool {
        matches!(self.state_mutability, StateMutability::Payable | StateMutability::NonPayable)
    }

    pub fn input_types(&self) -> impl ExactSizeIterator<Item = &TypeNode> {
        self.inputs.iter().map(|(_, ty)| ty)
    }

    /// The input types as a single tuple, for encoding and decoding call data.
    pub fn input_tuple(&self) -> Result<DynSolType, AbiError> {
        Ok(DynSolType::Tuple(
            self.input_types().map(TypeNode::dyn_sol_type).collect::<Result<_, _>>()?,
        ))
    }
}

/// The public interface of one compiled contract.
#[derive(Clone, Debug, Default)]
pub struct ContractInterface {
    pub name: String,
    /// Source file the contract was compiled from, relative to the project root.
    pub source: Option<PathBuf>,
    /// Whether the artifact carries deployable bytecode. Interfaces and abstract contracts don't.
    pub deployable: bool,
    pub abi: JsonAbi,
}

impl ContractInterface {
    pub fn new(name: impl Into<String>, abi: JsonAbi) -> Self {
        Self { name: name.into(), source: None, deployable: true, abi }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Resolves a function by name or by full signature.
    ///
    /// Overloads are narrowed by `arity` when it is known; otherwise the first declared overload
    /// wins.
    pub fn lookup_function(
        &self,
        function: &str,
        arity: Option<usize>,
    ) -> Result<FunctionSignature, AbiError> {
        let not_found = || AbiError::FunctionNotFound {
            contract: self.name.clone(),
            function: function.to_string(),
        };

        if function.contains('(') {
            let found =
                self.abi.functions().find(|f| f.signature() == function).ok_or_else(not_found)?;
            return check_arity(FunctionSignature::from_function(found)?, arity);
        }

        let overloads = self.abi.functions.get(function).ok_or_else(not_found)?;
        let found = match arity {
            Some(arity) => overloads.iter().find(|f| f.inputs.len() == arity),
            None => None,
        }
        .or_else(|| overloads.first())
        .ok_or_else(not_found)?;
        check_arity(FunctionSignature::from_function(found)?, arity)
    }

    /// Whether the contract has a function with this name.
    pub fn has_function(&self, name: &str) -> bool {
        self.abi.functions.contains_key(name)
    }

    /// All functions, sorted by name and then by declaration order.
    pub fn functions(&self) -> Result<Vec<FunctionSignature>, AbiError> {
        self.abi.functions().map(FunctionSignature::from_function).collect()
    }

    /// Finds the fields of a struct used by any function parameter or return value.
    pub fn lookup_struct_fields(&self, type_name: &str) -> Option<Vec<(String, TypeNode)>> {
        self.abi
            .functions()
            .flat_map(|f| f.inputs.iter().chain(&f.outputs))
            .filter_map(|param| TypeNode::from_param(param).ok())
            .find_map(|ty| ty.find_struct(type_name).cloned())
    }
}

fn check_arity(
    function: FunctionSignature,
    arity: Option<usize>,
) -> Result<FunctionSignature, AbiError> {
    match arity {
        Some(found) if found != function.inputs.len() => Err(AbiError::ArityMismatch {
            function: function.name,
            expected: function.inputs.len(),
            found,
        }),
        _ => Ok(function),
    }
}
