//! Cryptographic primitives for anonymous polls

pub mod field;
pub mod merkle;
pub mod nullifier;
pub mod poseidon;
pub mod poseidon_constants;

pub use field::{fr_from_canonical_bytes, fr_from_hex, fr_to_bytes, fr_to_hex};
pub use merkle::{
    MerkleError, MerklePath, MerkleVerifier, PoseidonMerkleTree, VoterPath, VoterTree, TREE_DEPTH,
};
pub use nullifier::{derive_nullifier, leaf_commitment, Nullifier, VoterSecret};
pub use poseidon::{hash_pair, hash_single, poseidon_hash_bytes, poseidon_hash_fields, PoseidonError};
