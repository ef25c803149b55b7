//! Poll-bound vote acceptance
//!
//! A verifier never takes the public statement from the voter. The tree root
//! and option count come from the poll it stores; only the nullifier and the
//! proof are supplied with the vote.

use ark_bn254::Fr;
use ark_ff::Zero;
use tracing::{debug, info};

use super::inputs::PublicInputs;
use super::registry::NullifierRegistry;
use crate::crypto::field::fr_to_hex;
use crate::crypto::nullifier::Nullifier;
use crate::error::{ProofError, RegistryError, ZkPollResult};
use crate::proof::VoteProofSystem;

/// Verifier-side poll configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poll {
    pub id: Fr,
    /// Root of the eligible-voter tree fixed when the poll was opened
    pub merkle_root: Fr,
    pub num_options: u32,
}

impl Poll {
    pub fn new(id: Fr, merkle_root: Fr, num_options: u32) -> Self {
        Self {
            id,
            merkle_root,
            num_options,
        }
    }

    /// Public statement a vote carrying `nullifier` must prove
    pub fn public_inputs(&self, nullifier: &Nullifier) -> PublicInputs {
        PublicInputs {
            merkle_root: self.merkle_root,
            nullifier: *nullifier.as_field(),
            poll_id: self.id,
            max_options: Fr::from(self.num_options),
        }
    }
}

/// Accept one vote in `poll`.
///
/// Zero and already-spent nullifiers are rejected before the proof is
/// looked at. The nullifier is recorded only once the proof verifies
/// against the poll's own statement.
pub fn accept_vote<const DEPTH: usize>(
    system: &VoteProofSystem<DEPTH>,
    registry: &mut NullifierRegistry,
    poll: &Poll,
    proof: &[u8],
    nullifier: &Nullifier,
) -> ZkPollResult<()> {
    let poll_id = fr_to_hex(&poll.id);

    if nullifier.as_field().is_zero() {
        return Err(RegistryError::InvalidNullifierFormat.into());
    }
    if registry.is_used(&poll.id, nullifier) {
        debug!(poll_id = %poll_id, "vote replay rejected");
        return Err(RegistryError::NullifierAlreadyUsed { poll_id }.into());
    }

    let statement = poll.public_inputs(nullifier);
    if !system.verify(proof, &statement)? {
        debug!(poll_id = %poll_id, "vote proof rejected");
        return Err(ProofError::VerificationFailed(format!(
            "proof does not match poll {}",
            poll_id
        ))
        .into());
    }

    registry.record(&poll.id, nullifier)?;
    info!(poll_id = %poll_id, "vote accepted");
    Ok(())
}
