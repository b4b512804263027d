//! # fuzz-utils-harness
//!
//! Scaffolds Solidity fuzzing harnesses for Echidna and Medusa.
//!
//! The harness wraps every state-changing function of its targets, either calling them directly,
//! pranking one of the default fuzzer senders, or routing the call through deployed actor
//! contracts. Generated contracts build on the `crytic/properties` helpers.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod attacks;
pub use attacks::Attack;

mod error;
pub use error::HarnessError;

mod generator;
pub use generator::{GeneratedHarness, HarnessGenerator, SENDERS};

mod remappings;
pub use remappings::Remappings;

pub mod solidity;
