//! Spent-nullifier tracking
//!
//! A verifier accepts at most one vote per `(poll_id, nullifier)` pair. The
//! registry only answers "seen before?"; it never learns the voter's secret
//! and does not count votes per option.

use std::collections::HashSet;

use ark_bn254::Fr;
use ark_ff::Zero;
use tracing::debug;

use super::inputs::PublicInputs;
use crate::crypto::field::fr_to_hex;
use crate::crypto::nullifier::Nullifier;
use crate::error::RegistryError;

/// In-memory set of nullifiers spent per poll
#[derive(Clone, Debug, Default)]
pub struct NullifierRegistry {
    used: HashSet<(Fr, Nullifier)>,
}

impl NullifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `nullifier` has already voted in `poll_id`
    pub fn is_used(&self, poll_id: &Fr, nullifier: &Nullifier) -> bool {
        self.used.contains(&(*poll_id, *nullifier))
    }

    /// Mark `nullifier` as spent in `poll_id`.
    ///
    /// Fails if it was already spent in that poll, or if it is zero.
    pub fn record(&mut self, poll_id: &Fr, nullifier: &Nullifier) -> Result<(), RegistryError> {
        if nullifier.as_field().is_zero() {
            return Err(RegistryError::InvalidNullifierFormat);
        }

        if !self.used.insert((*poll_id, *nullifier)) {
            debug!(poll_id = %fr_to_hex(poll_id), "duplicate nullifier rejected");
            return Err(RegistryError::NullifierAlreadyUsed {
                poll_id: fr_to_hex(poll_id),
            });
        }

        debug!(poll_id = %fr_to_hex(poll_id), "nullifier recorded");
        Ok(())
    }

    /// Record the nullifier carried by a vote's public inputs
    pub fn record_vote(&mut self, public: &PublicInputs) -> Result<(), RegistryError> {
        self.record(&public.poll_id, &Nullifier::from_field(public.nullifier))
    }

    /// Number of nullifiers spent in `poll_id`
    pub fn used_in_poll(&self, poll_id: &Fr) -> usize {
        self.used.iter().filter(|(poll, _)| poll == poll_id).count()
    }

    /// Total number of recorded nullifiers
    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
