//! Vote Circuit for Anonymous Ballots
//!
//! This circuit proves that a vote is valid:
//! 1. The vote choice is below the number of options (32-bit unsigned)
//! 2. The nullifier is hash_pair(secret, poll_id)
//! 3. hash_single(secret) is a leaf of the eligible-voter tree
//! 4. The secret is non-zero
//!
//! Public Inputs (in allocation order):
//! - merkle_root: Root of the eligible-voter tree
//! - nullifier: Per-poll voter tag
//! - poll_id: Poll identifier
//! - max_options: Number of options
//!
//! Private Inputs (Witness):
//! - secret: The voter secret
//! - vote_choice: The chosen option
//! - merkle_path / merkle_indices: Authentication path of the leaf

use ark_bn254::Fr;
use ark_r1cs_std::{alloc::AllocVar, eq::EqGadget, fields::fp::FpVar};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use super::gadgets::{enforce_less_than, enforce_nonzero, MerklePathGadget, PoseidonGadget};
use crate::ballot::inputs::{PublicInputs, VoteInputs, VOTE_CHOICE_BITS};
use crate::crypto::merkle::{MerklePath, TREE_DEPTH};

/// Vote circuit over a tree of depth `DEPTH`
#[derive(Clone, Default)]
pub struct VoteCircuit<const DEPTH: usize> {
    // ===== Public Inputs =====
    pub public: Option<PublicInputs>,

    // ===== Private Inputs (Witness) =====
    pub secret: Option<Fr>,
    pub vote_choice: Option<Fr>,
    pub merkle_path: Option<MerklePath<DEPTH>>,
}

/// Vote circuit at the production tree depth
pub type VoterCircuit = VoteCircuit<TREE_DEPTH>;

impl<const DEPTH: usize> VoteCircuit<DEPTH> {
    /// Circuit with no assignment, for parameter generation
    pub fn blank() -> Self {
        Self::default()
    }

    /// Circuit fully assigned from vote inputs
    pub fn new(inputs: &VoteInputs<DEPTH>) -> Self {
        Self {
            public: Some(inputs.public.clone()),
            secret: Some(inputs.secret),
            vote_choice: Some(inputs.vote_choice),
            merkle_path: Some(inputs.path.clone()),
        }
    }
}

impl<const DEPTH: usize> From<&VoteInputs<DEPTH>> for VoteCircuit<DEPTH> {
    fn from(inputs: &VoteInputs<DEPTH>) -> Self {
        Self::new(inputs)
    }
}

impl<const DEPTH: usize> ConstraintSynthesizer<Fr> for VoteCircuit<DEPTH> {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let public = self.public.as_ref();
        let poseidon = PoseidonGadget::new(cs.clone())?;

        // ===== Allocate Public Inputs =====
        let merkle_root_var = FpVar::new_input(cs.clone(), || {
            public.map(|p| p.merkle_root).ok_or(SynthesisError::AssignmentMissing)
        })?;

        let nullifier_var = FpVar::new_input(cs.clone(), || {
            public.map(|p| p.nullifier).ok_or(SynthesisError::AssignmentMissing)
        })?;

        let poll_id_var = FpVar::new_input(cs.clone(), || {
            public.map(|p| p.poll_id).ok_or(SynthesisError::AssignmentMissing)
        })?;

        let max_options_var = FpVar::new_input(cs.clone(), || {
            public.map(|p| p.max_options).ok_or(SynthesisError::AssignmentMissing)
        })?;

        // ===== Allocate Private Inputs (Witnesses) =====
        let secret_var = FpVar::new_witness(cs.clone(), || {
            self.secret.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let vote_choice_var = FpVar::new_witness(cs.clone(), || {
            self.vote_choice.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let path_gadget = MerklePathGadget::<DEPTH>::new_witness(cs.clone(), self.merkle_path.as_ref())?;

        // ===== Constraint 1: vote_choice < max_options =====
        enforce_less_than(&vote_choice_var, &max_options_var, VOTE_CHOICE_BITS)?;

        // ===== Constraint 2: nullifier derivation =====
        let computed_nullifier = poseidon.hash_pair(&secret_var, &poll_id_var)?;
        computed_nullifier.enforce_equal(&nullifier_var)?;

        // ===== Constraint 3: Merkle membership of the leaf =====
        let leaf_var = poseidon.hash_single(&secret_var)?;
        path_gadget.verify(&poseidon, &leaf_var, &merkle_root_var)?;

        // ===== Constraint 4: secret != 0 =====
        enforce_nonzero(cs, &secret_var)?;

        Ok(())
    }
}
