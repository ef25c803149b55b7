//! Poseidon parameters for the BN254 scalar field
//!
//! Round constants are expanded from a fixed domain string with BLAKE3, and the
//! MDS matrix is a Cauchy matrix, so both sides of the system (native hashing
//! and the R1CS gadget) derive identical parameters without shipping tables.
//!
//! Parameters:
//! - Field: BN254 scalar field (Fr)
//! - Width: t = 3 (2 rate elements + 1 capacity element)
//! - Full rounds: RF = 8 (4 at start, 4 at end)
//! - Partial rounds: RP = 57
//! - S-box: x^5

use ark_bn254::Fr;
use ark_ff::{Field, PrimeField};

/// Number of full rounds (RF = 8)
pub const FULL_ROUNDS: usize = 8;

/// Number of partial rounds (RP = 57)
pub const PARTIAL_ROUNDS: usize = 57;

/// State width (t = 3)
pub const WIDTH: usize = 3;

/// Number of elements absorbed per permutation
pub const RATE: usize = WIDTH - 1;

/// Total number of round constants
pub const NUM_CONSTANTS: usize = WIDTH * (FULL_ROUNDS + PARTIAL_ROUNDS);

const ROUND_CONSTANT_DOMAIN: &[u8] = b"zkpoll/poseidon/bn254/t3/rf8/rp57";

/// Expand the round constants, one BLAKE3 digest per constant.
pub fn get_round_constants() -> Vec<Fr> {
    (0..NUM_CONSTANTS)
        .map(|i| {
            let mut hasher = blake3::Hasher::new();
            hasher.update(ROUND_CONSTANT_DOMAIN);
            hasher.update(&(i as u64).to_le_bytes());
            Fr::from_le_bytes_mod_order(hasher.finalize().as_bytes())
        })
        .collect()
}

/// Cauchy MDS matrix `M[i][j] = 1 / (x_i + y_j)` with `x = [0, 1, 2]`, `y = [3, 4, 5]`.
pub fn get_mds_matrix() -> [[Fr; WIDTH]; WIDTH] {
    let mut matrix = [[Fr::from(0u64); WIDTH]; WIDTH];

    for (i, row) in matrix.iter_mut().enumerate() {
        for (j, entry) in row.iter_mut().enumerate() {
            let sum = Fr::from(i as u64) + Fr::from((WIDTH + j) as u64);
            // x_i + y_j ranges over 3..=7, never zero.
            *entry = sum.inverse().unwrap_or_else(|| Fr::from(1u64));
        }
    }

    matrix
}
