//! Re-serialization of decoded sequences into the other fuzzer's format.

use crate::{
    Action, DecodeError, DecodedCall, SequenceContext,
    wire::{EncodeSettings, WireFormat},
};
use alloy_primitives::Address;
use serde_json::Value;

/// How converted calls are addressed and paid for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Replaces the recorded target of every call.
    pub target_address: Option<Address>,
    pub deployer: Address,
    /// First nonce of the deployer account in a sequence.
    pub deployer_nonce: u64,
    pub settings: EncodeSettings,
}

/// Writes a decoded sequence in the format `to`.
///
/// Sender nonces are renumbered from the start of the sequence. Formats that cannot express an
/// empty call get its delays added to the next call instead; trailing empty calls are dropped.
pub fn convert_sequence(
    calls: Vec<DecodedCall>,
    to: &dyn WireFormat,
    options: &ConvertOptions,
) -> Result<Vec<Value>, DecodeError> {
    let mut ctx = SequenceContext::with_deployer(options.deployer, options.deployer_nonce);
    let mut pending = (0u64, 0u64);
    let mut out = Vec::with_capacity(calls.len());

    for mut call in calls {
        if matches!(call.action, Action::NoCall) && !to.supports_empty_calls() {
            pending.0 = pending.0.saturating_add(call.meta.time_delay);
            pending.1 = pending.1.saturating_add(call.meta.block_delay);
            continue;
        }

        let meta = &mut call.meta;
        meta.time_delay = meta.time_delay.saturating_add(pending.0);
        meta.block_delay = meta.block_delay.saturating_add(pending.1);
        pending = (0, 0);
        if let Some(target) = options.target_address {
            meta.target = Some(target);
        }
        meta.nonce = Some(ctx.next_nonce(meta.sender));
        out.push(to.encode_call(&call, &options.settings)?);
    }

    if pending != (0, 0) {
        debug!(time = pending.0, blocks = pending.1, "dropping delay of trailing empty calls");
    }
    Ok(out)
}
