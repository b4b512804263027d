//! # fuzz-utils-corpus
//!
//! Reading, converting and replaying Echidna and Medusa corpora.
//!
//! Raw call objects are parsed by a fuzzer's [`WireFormat`](wire::WireFormat) and decoded by the
//! [`Decoder`] against the target contract's interface into a typed [`ValueNode`] tree. From
//! there a sequence is either rendered as a Foundry test ([`generate`]) or re-encoded for the
//! other fuzzer ([`convert`]). The [`modify`] module cleans up corpora in place.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

mod call;
pub use call::{Action, CallArgs, CallKind, CallMeta, CallObject, DecodedCall, Invocation};

pub mod codec;

mod context;
pub use context::SequenceContext;

pub mod convert;
pub use convert::{ConvertedCorpus, CorpusConverter};

mod decode;
pub use decode::{Decoder, MAX_DEPTH};

pub mod diagnostics;
pub use diagnostics::{CollectedDiagnostics, Diagnostics, TracingDiagnostics};

mod error;
pub use error::DecodeError;

pub mod generate;
pub use generate::{GeneratedTests, TestGenerator};

pub mod layout;

pub mod modify;

pub mod render;

mod value;
pub use value::ValueNode;

pub mod wire;
