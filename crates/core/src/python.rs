//! Python bindings, built with the `python` feature

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use crate::ballot::{VoteValidator, VoterInputs};
use crate::crypto::{self, fr_from_canonical_bytes, fr_to_bytes, poseidon_hash_bytes};
use crate::error::validation;

fn secret_from_bytes(secret: &[u8]) -> PyResult<ark_bn254::Fr> {
    validation::validate_secret(secret).map_err(|e| PyValueError::new_err(e.to_string()))?;
    scalar_from_bytes(secret, "Secret")
}

fn scalar_from_bytes(bytes: &[u8], name: &str) -> PyResult<ark_bn254::Fr> {
    let array: &[u8; 32] = bytes
        .try_into()
        .map_err(|_| PyValueError::new_err(format!("{} must be 32 bytes", name)))?;
    fr_from_canonical_bytes(array).map_err(|e| PyValueError::new_err(format!("{}: {}", name, e)))
}

/// Leaf commitment for a voter secret
///
/// # Arguments
/// * `secret` - Voter secret (32 bytes, little-endian, non-zero)
///
/// # Returns
/// * Leaf bytes (32 bytes)
#[pyfunction]
fn leaf_commitment(py: Python, secret: &[u8]) -> PyResult<Py<PyBytes>> {
    let secret = secret_from_bytes(secret)?;
    let leaf = crypto::leaf_commitment(&secret);

    Ok(PyBytes::new(py, &fr_to_bytes(&leaf)).into())
}

/// Nullifier of a voter secret in a poll
///
/// # Arguments
/// * `secret` - Voter secret (32 bytes)
/// * `poll_id` - Poll identifier (32 bytes)
///
/// # Returns
/// * Nullifier bytes (32 bytes)
#[pyfunction]
fn derive_nullifier(py: Python, secret: &[u8], poll_id: &[u8]) -> PyResult<Py<PyBytes>> {
    let secret = secret_from_bytes(secret)?;
    let poll_id = scalar_from_bytes(poll_id, "Poll id")?;
    let nullifier = crypto::derive_nullifier(&secret, &poll_id);

    Ok(PyBytes::new(py, &fr_to_bytes(&nullifier)).into())
}

/// Poseidon hash of one or two field elements
///
/// # Arguments
/// * `inputs` - Little-endian field elements
///
/// # Returns
/// * Hash output (32 bytes)
#[pyfunction]
fn poseidon_hash(py: Python, inputs: Vec<Vec<u8>>) -> PyResult<Py<PyBytes>> {
    let hash = poseidon_hash_bytes(&inputs)
        .map_err(|e| PyRuntimeError::new_err(format!("Poseidon hash failed: {}", e)))?;

    Ok(PyBytes::new(py, &hash).into())
}

/// Evaluate the vote predicate on a JSON witness
///
/// # Returns
/// * `None` if the vote is valid, otherwise the first violated check
///   (`range_violation`, `nullifier_mismatch`, `membership_failure`,
///   `degenerate_secret`)
#[pyfunction]
fn evaluate_vote(witness_json: &str) -> PyResult<Option<&'static str>> {
    let inputs = VoterInputs::from_json(witness_json)
        .map_err(|e| PyValueError::new_err(format!("Invalid witness: {}", e)))?;

    Ok(VoteValidator::validate(&inputs).err().map(|v| v.as_str()))
}

/// Python module definition
#[pymodule]
fn _rust_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(leaf_commitment, m)?)?;
    m.add_function(wrap_pyfunction!(derive_nullifier, m)?)?;
    m.add_function(wrap_pyfunction!(poseidon_hash, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_vote, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("TREE_DEPTH", crate::crypto::TREE_DEPTH)?;

    Ok(())
}
