//! # fuzz-utils-abi
//!
//! Contract interfaces and the parameter type trees the corpus decoder walks.
//!
//! Contracts are loaded from compiled artifacts (a Foundry `out/` directory, a single artifact,
//! or a bare ABI file) and exposed through the [`SignatureProvider`] trait.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod artifacts;
pub use artifacts::ArtifactProvider;

mod error;
pub use error::AbiError;

mod interface;
pub use interface::{ContractInterface, FunctionSignature};

mod types;
pub use types::TypeNode;

/// Read-only access to contract interfaces, keyed by contract name.
///
/// Implementations are immutable once loaded and may be shared across threads.
pub trait SignatureProvider: Send + Sync {
    /// Returns the contract with the given name. The first exact match wins.
    fn contract(&self, name: &str) -> Result<&ContractInterface, AbiError>;

    /// Resolves `function` (a bare name or a full signature) in `contract`.
    ///
    /// When `arity` is given, overloads are narrowed to the ones taking that many parameters.
    fn lookup_function(
        &self,
        contract: &str,
        function: &str,
        arity: Option<usize>,
    ) -> Result<FunctionSignature, AbiError> {
        self.contract(contract)?.lookup_function(function, arity)
    }

    /// Returns the ordered fields of the struct `type_name` as used by `contract`.
    fn lookup_struct_fields(
        &self,
        contract: &str,
        type_name: &str,
    ) -> Result<Vec<(String, TypeNode)>, AbiError> {
        self.contract(contract)?
            .lookup_struct_fields(type_name)
            .ok_or_else(|| AbiError::StructNotFound(type_name.to_string()))
    }
}
