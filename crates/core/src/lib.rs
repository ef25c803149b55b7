//! zkpoll - Anonymous Voting Core
//!
//! Proof predicate for anonymous votes: a voter proves membership in an
//! eligible-voter Merkle tree, a correctly derived per-poll nullifier and an
//! in-range choice, without revealing which leaf is theirs.
//!
//! # Modules
//! - `crypto`: Cryptographic primitives (Poseidon hash, Merkle trees, nullifiers)
//! - `ballot`: Vote inputs, the native vote validator, the nullifier registry and
//!   poll-bound vote acceptance
//! - `proof`: zkSNARK proof generation and verification (Groth16)

pub mod ballot;
pub mod crypto;
pub mod error;
pub mod proof;

#[cfg(feature = "python")]
mod python;

// Re-export common types
pub use ballot::{accept_vote, NullifierRegistry, Poll, PublicInputs, VoteInputs, VoteValidator, VoterInputs};
pub use crypto::{MerklePath, MerkleVerifier, PoseidonMerkleTree, TREE_DEPTH};
pub use error::{ConstraintViolation, CryptoError, ProofError, RegistryError, ZkPollError, ZkPollResult};
pub use proof::{SerializedProof, VoteCircuit, VoteProofSystem, VoterProofSystem};
