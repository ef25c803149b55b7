//! Range and non-zero checks on single field elements

use ark_bn254::Fr;
use ark_ff::{Field, Zero};
use ark_r1cs_std::{alloc::AllocVar, boolean::Boolean, fields::fp::FpVar, prelude::*};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

/// Enforce `value < 2^bits`.
///
/// Decomposes into the canonical little-endian bit representation and
/// requires every bit at position `bits` or above to be zero.
#[tracing::instrument(target = "r1cs", skip(value))]
pub fn enforce_bit_width(value: &FpVar<Fr>, bits: usize) -> Result<(), SynthesisError> {
    let decomposition = value.to_bits_le()?;
    for bit in decomposition.iter().skip(bits) {
        bit.enforce_equal(&Boolean::FALSE)?;
    }
    Ok(())
}

/// Enforce `value < bound` for `bits`-wide unsigned integers.
///
/// Both operands are width-checked, then `bound - value - 1` must fit in
/// `bits` as well. With both operands below `2^bits`, the difference wraps
/// around the modulus exactly when `value >= bound`.
#[tracing::instrument(target = "r1cs", skip(value, bound))]
pub fn enforce_less_than(value: &FpVar<Fr>, bound: &FpVar<Fr>, bits: usize) -> Result<(), SynthesisError> {
    enforce_bit_width(value, bits)?;
    enforce_bit_width(bound, bits)?;

    let gap = bound - value - FpVar::one();
    enforce_bit_width(&gap, bits)
}

/// Enforce `value != 0` by witnessing its inverse.
///
/// For a zero value the witness falls back to zero, which leaves
/// `value * inverse == 1` unsatisfied instead of aborting synthesis.
#[tracing::instrument(target = "r1cs", skip(cs, value))]
pub fn enforce_nonzero(cs: ConstraintSystemRef<Fr>, value: &FpVar<Fr>) -> Result<(), SynthesisError> {
    let inverse = FpVar::new_witness(cs, || {
        Ok(value.value()?.inverse().unwrap_or_else(Fr::zero))
    })?;

    (value * &inverse).enforce_equal(&FpVar::one())
}
