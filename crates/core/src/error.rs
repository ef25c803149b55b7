//! Unified Error Types for zkpoll
//!
//! Predicate failures are [`ConstraintViolation`] values; everything else
//! (bad encodings, wrong shapes, proof-system failures) is reported through
//! [`ZkPollError`].

use thiserror::Error;

use crate::crypto::merkle::MerkleError;
use crate::crypto::poseidon::PoseidonError;

/// Top-level error type for the crate
#[derive(Error, Debug)]
pub enum ZkPollError {
    /// Cryptographic operation error
    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),

    /// Proof generation/verification error
    #[error("Proof error: {0}")]
    Proof(#[from] ProofError),

    /// The vote predicate does not hold
    #[error("Constraint violated: {0}")]
    Constraint(#[from] ConstraintViolation),

    /// Nullifier registry rejected a vote
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Malformed input shape, rejected before evaluation
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for ZkPollError {
    fn from(e: serde_json::Error) -> Self {
        ZkPollError::Serialization(e.to_string())
    }
}

/// Result type alias for zkpoll operations
pub type ZkPollResult<T> = Result<T, ZkPollError>;

/// Errors from cryptographic operations
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid secret: must be a non-zero field element")]
    InvalidSecret,

    #[error("Invalid field element encoding: {0}")]
    InvalidFieldEncoding(String),

    #[error("Poseidon hash error: {0}")]
    Poseidon(#[from] PoseidonError),

    #[error("Merkle tree error: {0}")]
    Merkle(#[from] MerkleError),
}

/// Errors from proof operations
#[derive(Error, Debug)]
pub enum ProofError {
    #[error("Invalid witness data: {0}")]
    InvalidWitness(String),

    #[error("Proof generation failed: {0}")]
    GenerationFailed(String),

    #[error("Proof verification failed: {0}")]
    VerificationFailed(String),

    #[error("Invalid proving key")]
    InvalidProvingKey,

    #[error("Invalid verifying key")]
    InvalidVerifyingKey,

    #[error("Setup failed: {0}")]
    SetupFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// The four conditions a vote must satisfy.
///
/// Only the native validator reports which one failed; a proof reveals
/// nothing beyond "no valid proof exists".
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintViolation {
    #[error("vote choice is not below the number of options")]
    RangeViolation,

    #[error("nullifier does not match the secret and poll")]
    NullifierMismatch,

    #[error("leaf is not a member of the eligible-voter tree")]
    MembershipFailure,

    #[error("secret is zero")]
    DegenerateSecret,
}

impl ConstraintViolation {
    /// Canonical reporting order
    pub const ALL: [ConstraintViolation; 4] = [
        ConstraintViolation::RangeViolation,
        ConstraintViolation::NullifierMismatch,
        ConstraintViolation::MembershipFailure,
        ConstraintViolation::DegenerateSecret,
    ];

    /// Stable identifier, used by the bindings and in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintViolation::RangeViolation => "range_violation",
            ConstraintViolation::NullifierMismatch => "nullifier_mismatch",
            ConstraintViolation::MembershipFailure => "membership_failure",
            ConstraintViolation::DegenerateSecret => "degenerate_secret",
        }
    }
}

/// Errors from the nullifier registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Nullifier already used in poll {poll_id}")]
    NullifierAlreadyUsed { poll_id: String },

    #[error("Invalid nullifier format")]
    InvalidNullifierFormat,
}

/// Input validation utilities
pub mod validation {
    use super::*;

    /// Validate a 32-byte scalar encoding
    pub fn validate_hash32(hash: &[u8], name: &str) -> Result<(), ZkPollError> {
        if hash.len() != 32 {
            return Err(ZkPollError::InvalidInput(format!(
                "{} must be exactly 32 bytes, got {}",
                name,
                hash.len()
            )));
        }
        Ok(())
    }

    /// Validate secret bytes (32 bytes, not all zero)
    pub fn validate_secret(secret: &[u8]) -> Result<(), ZkPollError> {
        validate_hash32(secret, "Secret")?;

        if secret.iter().all(|&b| b == 0) {
            return Err(ZkPollError::InvalidInput(
                "Secret cannot be all zeros".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate the shape of a Merkle path
    pub fn validate_merkle_path(
        siblings_len: usize,
        indices_len: usize,
        expected_depth: usize,
    ) -> Result<(), ZkPollError> {
        if siblings_len != expected_depth {
            return Err(ZkPollError::InvalidInput(format!(
                "Merkle path has wrong depth: {} != {}",
                siblings_len, expected_depth
            )));
        }
        if indices_len != expected_depth {
            return Err(ZkPollError::InvalidInput(format!(
                "Merkle indices has wrong length: {} != {}",
                indices_len, expected_depth
            )));
        }
        Ok(())
    }

    /// Validate that index flags are binary (0 = left, 1 = right)
    pub fn validate_index_flags(flags: &[u64]) -> Result<Vec<bool>, ZkPollError> {
        flags
            .iter()
            .enumerate()
            .map(|(level, &flag)| match flag {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(ZkPollError::InvalidInput(format!(
                    "Merkle index at level {} must be 0 or 1, got {}",
                    level, other
                ))),
            })
            .collect()
    }
}
