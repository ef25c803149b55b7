//! Voter secrets, leaf commitments and poll nullifiers
//!
//! One hidden secret drives both public values a voter ever produces:
//! 1. leaf = hash_single(secret), stored in the eligible-voter tree
//! 2. nullifier = hash_pair(secret, poll_id), revealed with the vote
//!
//! The nullifier is deterministic per (secret, poll), which is what lets a
//! verifier reject a second vote in the same poll. It does not try to make
//! nullifiers from different polls unlinkable.

use ark_bn254::Fr;
use ark_ff::{UniformRand, Zero};
use rand::{CryptoRng, RngCore};

use super::field::{fr_from_canonical_bytes, fr_to_bytes};
use super::poseidon::{hash_pair, hash_single};
use crate::error::CryptoError;

/// Leaf commitment for a voter secret
pub fn leaf_commitment(secret: &Fr) -> Fr {
    hash_single(secret)
}

/// Nullifier value for a voter secret in a given poll
pub fn derive_nullifier(secret: &Fr, poll_id: &Fr) -> Fr {
    hash_pair(secret, poll_id)
}

/// A voter's secret identity. Never zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoterSecret {
    value: Fr,
}

impl VoterSecret {
    /// Wrap a scalar, rejecting zero
    pub fn new(value: Fr) -> Result<Self, CryptoError> {
        if value.is_zero() {
            return Err(CryptoError::InvalidSecret);
        }
        Ok(Self { value })
    }

    /// Sample a uniformly random non-zero secret
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        loop {
            let value = Fr::rand(rng);
            if !value.is_zero() {
                return Self { value };
            }
        }
    }

    /// Decode from 32 canonical little-endian bytes
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        Self::new(fr_from_canonical_bytes(bytes)?)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        fr_to_bytes(&self.value)
    }

    pub fn as_field(&self) -> &Fr {
        &self.value
    }

    /// The leaf this voter occupies in the eligible-voter tree
    pub fn leaf(&self) -> Fr {
        leaf_commitment(&self.value)
    }

    /// The nullifier this voter reveals when voting in `poll_id`
    pub fn nullifier(&self, poll_id: &Fr) -> Nullifier {
        Nullifier::derive(&self.value, poll_id)
    }
}

/// A poll nullifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Nullifier {
    value: Fr,
}

impl Nullifier {
    /// nullifier = hash_pair(secret, poll_id)
    pub fn derive(secret: &Fr, poll_id: &Fr) -> Self {
        Self {
            value: derive_nullifier(secret, poll_id),
        }
    }

    pub fn from_field(value: Fr) -> Self {
        Self { value }
    }

    pub fn as_field(&self) -> &Fr {
        &self.value
    }

    /// Serialize to 32 bytes
    pub fn to_bytes(&self) -> [u8; 32] {
        fr_to_bytes(&self.value)
    }

    /// Deserialize from 32 canonical bytes
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        Ok(Self {
            value: fr_from_canonical_bytes(bytes)?,
        })
    }
}
