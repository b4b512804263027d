//! Pieces shared by the generated contracts.

use fuzz_utils_abi::{ContractInterface, FunctionSignature};
use itertools::Itertools;
use std::path::{Component, Path};

/// Header of every generated file.
pub const PREFACE: &str = "\
// SPDX-License-Identifier: UNLICENSED
pragma solidity ^0.8.0;

/// --------------------------------------------------------------------
/// @notice This file was automatically generated using fuzz-utils
///
/// -- [ Prerequisites ]
/// 1. The generated contracts depend on crytic/properties utilities
///    which need to be installed, this can be done by running:
///    `forge install crytic/properties`
/// 2. Absolute paths are used for contract inheritance, requiring
///    the main directory that contains the contracts to be added to
///    the Foundry remappings. This can be done by adding:
///    `directoryName/=directoryName/` to foundry.toml or remappings.txt";

pub const INDENT: &str = "    ";

/// A state-changing target function and the wrapper that forwards to it.
#[derive(Clone, Debug)]
pub struct Wrapper {
    pub function: FunctionSignature,
    /// `uint256 amount`, `Vault.Position memory p`.
    pub params: Vec<String>,
    pub args: Vec<String>,
}

impl Wrapper {
    pub fn new(function: FunctionSignature) -> Self {
        let (params, args) = function
            .inputs
            .iter()
            .enumerate()
            .map(|(index, (name, ty))| {
                let name = if name.is_empty() { format!("arg{index}") } else { name.clone() };
                let location = if ty.is_reference() { " memory" } else { "" };
                (format!("{ty}{location} {name}"), name)
            })
            .unzip();
        Self { function, params, args }
    }

    pub fn mutability(&self) -> &'static str {
        if self.function.is_payable() { " payable" } else { "" }
    }

    /// `{value: msg.value}` for payable functions.
    pub fn value(&self) -> &'static str {
        if self.function.is_payable() { "{value: msg.value}" } else { "" }
    }

    /// The forwarding call, `receiver.name{value: msg.value}(a, b)`.
    pub fn call(&self, receiver: &str, name: &str) -> String {
        format!("{receiver}.{name}{}({})", self.value(), self.args.join(", "))
    }
}

/// The functions of `contract` a harness may call: neither `view` nor `pure`.
pub fn state_changing(contract: &ContractInterface) -> Result<Vec<Wrapper>, fuzz_utils_abi::AbiError> {
    Ok(contract
        .functions()?
        .into_iter()
        .filter(FunctionSignature::is_state_changing)
        .map(Wrapper::new)
        .collect())
}

/// Name of the state variable holding a deployed contract, `Vault` becomes `vault`.
pub fn variable_name(contract: &str) -> String {
    let mut chars = contract.chars();
    let lowered = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    };
    if lowered == contract { format!("{lowered}_") } else { lowered }
}

/// Import path of a contract's source, with forward slashes on every platform.
pub fn import_path(contract: &ContractInterface) -> String {
    match &contract.source {
        Some(source) => slash_path(source),
        None => format!("src/{}.sol", contract.name),
    }
}

pub fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            Component::ParentDir => Some("..".into()),
            Component::RootDir => Some("".into()),
            Component::CurDir | Component::Prefix(_) => None,
        })
        .join("/")
}

/// A `// ---` banner introducing a group of functions.
pub fn section(title: &str) -> String {
    format!(
        "{INDENT}// -------------------------------------\n\
         {INDENT}// {title}\n\
         {INDENT}// -------------------------------------\n"
    )
}
