//! Poseidon Hash Gadget for R1CS circuits
//!
//! Constraint-level mirror of `crypto::poseidon`: same constants, same
//! arity-tagged capacity element, so native and in-circuit hashes agree.

use ark_bn254::Fr;
use ark_r1cs_std::{alloc::AllocVar, fields::fp::FpVar, prelude::*};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use crate::crypto::poseidon::Poseidon;
use crate::crypto::poseidon_constants::{self, FULL_ROUNDS, PARTIAL_ROUNDS, WIDTH};

/// Poseidon hash gadget for circuits
pub struct PoseidonGadget {
    cs: ConstraintSystemRef<Fr>,
    round_constants: Vec<FpVar<Fr>>,
    mds_matrix: Vec<Vec<FpVar<Fr>>>,
}

impl PoseidonGadget {
    /// Allocate the parameters as circuit constants
    pub fn new(cs: ConstraintSystemRef<Fr>) -> Result<Self, SynthesisError> {
        let round_constants = poseidon_constants::get_round_constants()
            .into_iter()
            .map(|c| FpVar::new_constant(cs.clone(), c))
            .collect::<Result<Vec<_>, _>>()?;

        let mds_matrix = poseidon_constants::get_mds_matrix()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| FpVar::new_constant(cs.clone(), *c))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            cs,
            round_constants,
            mds_matrix,
        })
    }

    /// Two-input hash. Argument order is significant.
    #[tracing::instrument(target = "r1cs", skip_all)]
    pub fn hash_pair(&self, left: &FpVar<Fr>, right: &FpVar<Fr>) -> Result<FpVar<Fr>, SynthesisError> {
        let capacity = FpVar::new_constant(self.cs.clone(), Poseidon::capacity_for(2))?;
        let mut state = vec![capacity, left.clone(), right.clone()];

        self.permute(&mut state)?;
        Ok(state[0].clone())
    }

    /// One-input hash
    #[tracing::instrument(target = "r1cs", skip_all)]
    pub fn hash_single(&self, input: &FpVar<Fr>) -> Result<FpVar<Fr>, SynthesisError> {
        let capacity = FpVar::new_constant(self.cs.clone(), Poseidon::capacity_for(1))?;
        let mut state = vec![capacity, input.clone(), FpVar::zero()];

        self.permute(&mut state)?;
        Ok(state[0].clone())
    }

    fn permute(&self, state: &mut [FpVar<Fr>]) -> Result<(), SynthesisError> {
        let mut round_ctr = 0;

        for _ in 0..(FULL_ROUNDS / 2) {
            self.full_round(state, round_ctr)?;
            round_ctr += WIDTH;
        }

        for _ in 0..PARTIAL_ROUNDS {
            self.partial_round(state, round_ctr)?;
            round_ctr += WIDTH;
        }

        for _ in 0..(FULL_ROUNDS / 2) {
            self.full_round(state, round_ctr)?;
            round_ctr += WIDTH;
        }

        Ok(())
    }

    /// Full round: S-box on all elements, then MDS
    fn full_round(&self, state: &mut [FpVar<Fr>], round_ctr: usize) -> Result<(), SynthesisError> {
        self.add_round_constants(state, round_ctr);
        for elem in state.iter_mut() {
            *elem = sbox(elem);
        }
        self.mds_multiply(state);
        Ok(())
    }

    /// Partial round: S-box on first element only, then MDS
    fn partial_round(&self, state: &mut [FpVar<Fr>], round_ctr: usize) -> Result<(), SynthesisError> {
        self.add_round_constants(state, round_ctr);
        state[0] = sbox(&state[0]);
        self.mds_multiply(state);
        Ok(())
    }

    fn add_round_constants(&self, state: &mut [FpVar<Fr>], round_ctr: usize) {
        for (i, elem) in state.iter_mut().enumerate() {
            *elem = &*elem + &self.round_constants[round_ctr + i];
        }
    }

    fn mds_multiply(&self, state: &mut [FpVar<Fr>]) {
        let new_state: Vec<FpVar<Fr>> = self
            .mds_matrix
            .iter()
            .map(|row| {
                row.iter()
                    .zip(state.iter())
                    .fold(FpVar::zero(), |acc, (m, s)| acc + m * s)
            })
            .collect();

        for (elem, value) in state.iter_mut().zip(new_state) {
            *elem = value;
        }
    }
}

/// S-box: x^5
fn sbox(x: &FpVar<Fr>) -> FpVar<Fr> {
    let x2 = x * x;
    let x4 = &x2 * &x2;
    &x4 * x
}
