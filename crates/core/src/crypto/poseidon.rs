//! Poseidon Hash Function
//!
//! A zkSNARK-friendly hash over the BN254 scalar field, following the
//! permutation from the Poseidon paper (https://eprint.iacr.org/2019/458).
//!
//! The hash family exposes exactly two arities:
//! - [`hash_pair`]: two inputs, used for Merkle nodes and nullifiers
//! - [`hash_single`]: one input, used for leaf commitments
//!
//! The capacity element of the initial state carries the number of absorbed
//! inputs, so `hash_single(a)` never equals `hash_pair(a, 0)`.

use ark_bn254::Fr;
use ark_ff::Field;
use thiserror::Error;

use super::field::{fr_from_le_bytes, fr_to_bytes};
use super::poseidon_constants::{self, RATE, WIDTH};

#[derive(Error, Debug)]
pub enum PoseidonError {
    #[error("Invalid input length: expected at most {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },
    #[error("Empty input")]
    EmptyInput,
}

/// Poseidon parameters for width t=3
pub struct PoseidonParams {
    /// Number of full rounds
    pub full_rounds: usize,
    /// Number of partial rounds
    pub partial_rounds: usize,
    /// Round constants, `WIDTH` per round
    pub round_constants: Vec<Fr>,
    /// MDS matrix
    pub mds_matrix: [[Fr; WIDTH]; WIDTH],
}

impl Default for PoseidonParams {
    fn default() -> Self {
        Self::new()
    }
}

impl PoseidonParams {
    pub fn new() -> Self {
        Self {
            full_rounds: poseidon_constants::FULL_ROUNDS,
            partial_rounds: poseidon_constants::PARTIAL_ROUNDS,
            round_constants: poseidon_constants::get_round_constants(),
            mds_matrix: poseidon_constants::get_mds_matrix(),
        }
    }
}

/// Poseidon hasher instance
pub struct Poseidon {
    params: PoseidonParams,
}

impl Default for Poseidon {
    fn default() -> Self {
        Self::new()
    }
}

impl Poseidon {
    /// Create a new Poseidon hasher with default parameters
    pub fn new() -> Self {
        Self {
            params: PoseidonParams::new(),
        }
    }

    /// Initial capacity value for an input of `arity` elements
    pub fn capacity_for(arity: usize) -> Fr {
        Fr::from(arity as u64)
    }

    /// Hash two field elements. Argument order is significant.
    pub fn hash_pair(&self, left: &Fr, right: &Fr) -> Fr {
        let mut state = [Self::capacity_for(2), *left, *right];
        self.permute(&mut state);
        state[0]
    }

    /// Hash a single field element
    pub fn hash_single(&self, input: &Fr) -> Fr {
        let mut state = [Self::capacity_for(1), *input, Fr::from(0u64)];
        self.permute(&mut state);
        state[0]
    }

    /// Hash one or two field elements, dispatching on arity
    pub fn hash(&self, inputs: &[Fr]) -> Result<Fr, PoseidonError> {
        match inputs {
            [] => Err(PoseidonError::EmptyInput),
            [a] => Ok(self.hash_single(a)),
            [a, b] => Ok(self.hash_pair(a, b)),
            _ => Err(PoseidonError::InvalidLength {
                expected: RATE,
                got: inputs.len(),
            }),
        }
    }

    /// Apply the Poseidon permutation to the state
    fn permute(&self, state: &mut [Fr; WIDTH]) {
        let half_full = self.params.full_rounds / 2;
        let mut round_ctr = 0;

        for _ in 0..half_full {
            self.full_round(state, round_ctr);
            round_ctr += WIDTH;
        }

        for _ in 0..self.params.partial_rounds {
            self.partial_round(state, round_ctr);
            round_ctr += WIDTH;
        }

        for _ in 0..half_full {
            self.full_round(state, round_ctr);
            round_ctr += WIDTH;
        }
    }

    /// Full round: S-box on all elements, then MDS
    fn full_round(&self, state: &mut [Fr; WIDTH], round_ctr: usize) {
        self.add_round_constants(state, round_ctr);
        for elem in state.iter_mut() {
            *elem = sbox(*elem);
        }
        self.mds_multiply(state);
    }

    /// Partial round: S-box on first element only, then MDS
    fn partial_round(&self, state: &mut [Fr; WIDTH], round_ctr: usize) {
        self.add_round_constants(state, round_ctr);
        state[0] = sbox(state[0]);
        self.mds_multiply(state);
    }

    fn add_round_constants(&self, state: &mut [Fr; WIDTH], round_ctr: usize) {
        for (i, elem) in state.iter_mut().enumerate() {
            *elem += self.params.round_constants[round_ctr + i];
        }
    }

    fn mds_multiply(&self, state: &mut [Fr; WIDTH]) {
        let mut new_state = [Fr::from(0u64); WIDTH];

        for (i, out) in new_state.iter_mut().enumerate() {
            for (j, elem) in state.iter().enumerate() {
                *out += self.params.mds_matrix[i][j] * elem;
            }
        }

        *state = new_state;
    }
}

/// S-box function: x^5
#[inline]
fn sbox(x: Fr) -> Fr {
    let x2 = x.square();
    let x4 = x2.square();
    x4 * x
}

// ============================================================================
// Public API
// ============================================================================

thread_local! {
    static POSEIDON: Poseidon = Poseidon::new();
}

/// Two-input hash: Merkle nodes and nullifiers
pub fn hash_pair(left: &Fr, right: &Fr) -> Fr {
    POSEIDON.with(|p| p.hash_pair(left, right))
}

/// One-input hash: leaf commitments
pub fn hash_single(input: &Fr) -> Fr {
    POSEIDON.with(|p| p.hash_single(input))
}

/// Hash one or two field elements
pub fn poseidon_hash_fields(inputs: &[Fr]) -> Result<Fr, PoseidonError> {
    POSEIDON.with(|p| p.hash(inputs))
}

/// Poseidon hash over little-endian byte strings of at most 32 bytes each
pub fn poseidon_hash_bytes(inputs: &[Vec<u8>]) -> Result<[u8; 32], PoseidonError> {
    let field_inputs = inputs
        .iter()
        .map(|bytes| {
            fr_from_le_bytes(bytes).ok_or(PoseidonError::InvalidLength {
                expected: 32,
                got: bytes.len(),
            })
        })
        .collect::<Result<Vec<Fr>, _>>()?;

    let hash = poseidon_hash_fields(&field_inputs)?;
    Ok(fr_to_bytes(&hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_pair_deterministic() {
        let a = Fr::from(1u64);
        let b = Fr::from(2u64);

        assert_eq!(hash_pair(&a, &b), hash_pair(&a, &b));
    }

    #[test]
    fn test_hash_pair_different_inputs() {
        let a = Fr::from(1u64);
        let b = Fr::from(2u64);
        let c = Fr::from(3u64);

        assert_ne!(hash_pair(&a, &b), hash_pair(&a, &c));
    }

    #[test]
    fn test_hash_pair_order_matters() {
        let a = Fr::from(7u64);
        let b = Fr::from(42u64);

        assert_ne!(hash_pair(&a, &b), hash_pair(&b, &a));
    }

    #[test]
    fn test_single_and_pair_are_separated() {
        let a = Fr::from(7u64);

        assert_ne!(hash_single(&a), hash_pair(&a, &Fr::from(0u64)));
        assert_ne!(hash_single(&a), hash_pair(&Fr::from(0u64), &a));
    }

    #[test]
    fn test_hash_dispatch() {
        let a = Fr::from(5u64);
        let b = Fr::from(6u64);

        assert_eq!(poseidon_hash_fields(&[a]).unwrap(), hash_single(&a));
        assert_eq!(poseidon_hash_fields(&[a, b]).unwrap(), hash_pair(&a, &b));
        assert!(matches!(
            poseidon_hash_fields(&[]),
            Err(PoseidonError::EmptyInput)
        ));
        assert!(matches!(
            poseidon_hash_fields(&[a, b, a]),
            Err(PoseidonError::InvalidLength { expected: 2, got: 3 })
        ));
    }

    #[test]
    fn test_poseidon_hash_bytes() {
        let inputs = vec![vec![1u8; 32], vec![2u8; 16]];

        let hash = poseidon_hash_bytes(&inputs).unwrap();
        let expected = hash_pair(
            &fr_from_le_bytes(&[1u8; 32]).unwrap(),
            &fr_from_le_bytes(&[2u8; 16]).unwrap(),
        );
        assert_eq!(hash, fr_to_bytes(&expected));

        assert!(poseidon_hash_bytes(&[vec![0u8; 33]]).is_err());
    }

    #[test]
    fn test_permutation_nonzero() {
        let poseidon = Poseidon::new();
        let mut state = [Fr::from(0u64); WIDTH];
        poseidon.permute(&mut state);

        assert_ne!(state[0], Fr::from(0u64));
    }

    #[test]
    fn test_sbox() {
        assert_eq!(sbox(Fr::from(2u64)), Fr::from(32u64));
    }
}
