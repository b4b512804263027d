use alloy_primitives::Address;
use std::collections::HashMap;

/// Mutable state scoped to one call sequence.
///
/// A fresh context is created for every corpus file, nothing in here may leak into the next
/// sequence.
#[derive(Clone, Debug, Default)]
pub struct SequenceContext {
    nonces: HashMap<Address, u64>,
    next_array: usize,
    uses_low_level_call: bool,
}

impl SequenceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context whose `deployer` starts at `nonce` instead of 0.
    ///
    /// Medusa deploys the target from the deployer account before replaying a sequence, so its
    /// first recorded call carries nonce 1. This only holds when a single contract is deployed.
    pub fn with_deployer(deployer: Address, nonce: u64) -> Self {
        let mut ctx = Self::default();
        ctx.nonces.insert(deployer, nonce);
        ctx
    }

    /// Returns the sender's next nonce and bumps it.
    pub fn next_nonce(&mut self, sender: Address) -> u64 {
        let nonce = self.nonces.entry(sender).or_default();
        let current = *nonce;
        *nonce += 1;
        current
    }

    /// Allocates a memory array variable name, unique within the sequence.
    pub fn next_array_name(&mut self) -> String {
        let name = format!("dynArr_{}", self.next_array);
        self.next_array += 1;
        name
    }

    pub fn mark_low_level_call(&mut self) {
        self.uses_low_level_call = true;
    }

    /// Whether any call in the sequence is a raw value transfer.
    pub fn uses_low_level_call(&self) -> bool {
        self.uses_low_level_call
    }
}
