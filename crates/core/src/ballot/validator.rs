//! Native evaluation of the vote predicate
//!
//! A vote is valid iff all of the following hold simultaneously:
//! 1. `0 <= vote_choice < max_options` as `VOTE_CHOICE_BITS`-bit unsigned integers
//! 2. `nullifier == hash_pair(secret, poll_id)`
//! 3. `hash_single(secret)` is a member of the tree with root `merkle_root`
//! 4. `secret != 0`
//!
//! Every check is computed on every call (`DEPTH + 2` hash evaluations), so
//! evaluation cost does not depend on which condition fails.

use ark_bn254::Fr;
use ark_ff::Zero;
use tracing::debug;

use super::inputs::{VoteInputs, VOTE_CHOICE_BITS};
use crate::crypto::field::fr_to_bounded_u64;
use crate::crypto::merkle::MerkleVerifier;
use crate::crypto::nullifier::{derive_nullifier, leaf_commitment};
use crate::error::ConstraintViolation;

/// Outcome of evaluating every check of the predicate
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoteEvaluation {
    violations: Vec<ConstraintViolation>,
}

impl VoteEvaluation {
    /// True iff no check failed
    pub fn holds(&self) -> bool {
        self.violations.is_empty()
    }

    /// Every violated check, in canonical order
    pub fn violations(&self) -> &[ConstraintViolation] {
        &self.violations
    }

    pub fn first_violation(&self) -> Option<ConstraintViolation> {
        self.violations.first().copied()
    }

    pub fn into_result(self) -> Result<(), ConstraintViolation> {
        match self.first_violation() {
            None => Ok(()),
            Some(violation) => Err(violation),
        }
    }
}

/// `vote_choice < max_options`, both read as `VOTE_CHOICE_BITS`-bit unsigned integers.
///
/// A scalar wider than `VOTE_CHOICE_BITS` fails the check.
pub fn vote_choice_in_range(vote_choice: &Fr, max_options: &Fr) -> bool {
    match (
        fr_to_bounded_u64(vote_choice, VOTE_CHOICE_BITS),
        fr_to_bounded_u64(max_options, VOTE_CHOICE_BITS),
    ) {
        (Some(choice), Some(max)) => choice < max,
        _ => false,
    }
}

/// The vote predicate
pub struct VoteValidator;

impl VoteValidator {
    /// Evaluate every check and collect all violations
    pub fn evaluate<const DEPTH: usize>(inputs: &VoteInputs<DEPTH>) -> VoteEvaluation {
        let public = &inputs.public;

        let range_ok = vote_choice_in_range(&inputs.vote_choice, &public.max_options);

        let expected_nullifier = derive_nullifier(&inputs.secret, &public.poll_id);
        let nullifier_ok = expected_nullifier == public.nullifier;

        let leaf = leaf_commitment(&inputs.secret);
        let membership_ok = MerkleVerifier::<DEPTH>::verify_membership(
            &leaf,
            &public.merkle_root,
            &inputs.path.siblings,
            &inputs.path.indices,
        );

        let secret_ok = !inputs.secret.is_zero();

        let violations: Vec<ConstraintViolation> = [range_ok, nullifier_ok, membership_ok, secret_ok]
            .into_iter()
            .zip(ConstraintViolation::ALL)
            .filter_map(|(ok, violation)| (!ok).then_some(violation))
            .collect();

        if !violations.is_empty() {
            let names: Vec<&str> = violations.iter().map(|v| v.as_str()).collect();
            debug!(violations = ?names, "vote predicate rejected");
        }

        VoteEvaluation { violations }
    }

    /// Ok iff the predicate holds; otherwise the first violation in canonical order
    pub fn validate<const DEPTH: usize>(inputs: &VoteInputs<DEPTH>) -> Result<(), ConstraintViolation> {
        Self::evaluate(inputs).into_result()
    }

    pub fn holds<const DEPTH: usize>(inputs: &VoteInputs<DEPTH>) -> bool {
        Self::evaluate(inputs).holds()
    }
}
