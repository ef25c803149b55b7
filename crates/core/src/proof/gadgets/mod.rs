//! Circuit gadgets for zkSNARK proofs
//!
//! This module contains constraint system implementations for:
//! - Poseidon hash function
//! - Merkle tree path verification
//! - Range and non-zero checks on scalars

pub mod merkle;
pub mod poseidon;
pub mod scalar;

pub use merkle::MerklePathGadget;
pub use poseidon::PoseidonGadget;
pub use scalar::{enforce_bit_width, enforce_less_than, enforce_nonzero};
