//! End-to-end tests for anonymous votes
//!
//! Voter registration, witness files, native validation, circuit agreement,
//! Groth16 proving and double-vote rejection, driven through the public API.

use anyhow::Result;
use ark_bn254::Fr;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use rand::{rngs::StdRng, SeedableRng};
use tracing_subscriber::{filter::EnvFilter, fmt::Subscriber};

use zkpoll_core::ballot::{NullifierRegistry, PublicInputs, VoteInputs, VoterInputs};
use zkpoll_core::crypto::{leaf_commitment, PoseidonMerkleTree, VoterSecret, VoterTree};
use zkpoll_core::error::{ConstraintViolation, RegistryError, ZkPollError};
use zkpoll_core::proof::{VoteCircuit, VoteProofSystem};
use zkpoll_core::VoteValidator;

fn init_tracing() {
    let _ = Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Register `secret` after a handful of other voters
fn register<const DEPTH: usize>(secret: &Fr) -> Result<(PoseidonMerkleTree<DEPTH>, u64)> {
    let mut tree = PoseidonMerkleTree::<DEPTH>::new();
    let mut rng = StdRng::seed_from_u64(DEPTH as u64);
    for _ in 0..5 {
        tree.insert(VoterSecret::random(&mut rng).leaf())?;
    }
    let index = tree.insert(leaf_commitment(secret))?;
    Ok((tree, index))
}

fn circuit_satisfied<const DEPTH: usize>(inputs: &VoteInputs<DEPTH>) -> bool {
    let cs = ConstraintSystem::<Fr>::new_ref();
    VoteCircuit::new(inputs).generate_constraints(cs.clone()).unwrap();
    cs.is_satisfied().unwrap()
}

#[test]
fn test_poll_vote_depth_20() -> Result<()> {
    init_tracing();

    let secret = Fr::from(7u64);
    let (tree, index) = register::<20>(&secret)?;
    let inputs: VoterInputs = VoteInputs::honest(secret, 1, Fr::from(42u64), 3, &tree, index)?;

    assert_eq!(VoteValidator::validate(&inputs), Ok(()));
    assert!(circuit_satisfied(&inputs));

    let mut out_of_range = inputs.clone();
    out_of_range.vote_choice = Fr::from(5u64);
    assert_eq!(
        VoteValidator::validate(&out_of_range),
        Err(ConstraintViolation::RangeViolation)
    );
    assert!(!circuit_satisfied(&out_of_range));

    let mut foreign_nullifier = inputs.clone();
    foreign_nullifier.public.nullifier = *VoterSecret::new(Fr::from(8u64))?
        .nullifier(&Fr::from(42u64))
        .as_field();
    assert_eq!(
        VoteValidator::validate(&foreign_nullifier),
        Err(ConstraintViolation::NullifierMismatch)
    );
    assert!(!circuit_satisfied(&foreign_nullifier));

    Ok(())
}

#[test]
fn test_witness_file_round_trip() -> Result<()> {
    let secret = Fr::from(7u64);
    let (tree, index) = register::<20>(&secret)?;
    let inputs: VoterInputs = VoteInputs::honest(secret, 2, Fr::from(9u64), 3, &tree, index)?;

    let json = serde_json::to_string_pretty(&inputs.to_witness())?;
    let parsed = VoterInputs::from_json(&json)?;

    assert_eq!(parsed, inputs);
    assert!(VoteValidator::holds(&parsed));
    Ok(())
}

#[test]
fn test_malformed_witness_rejected_before_evaluation() -> Result<()> {
    let secret = Fr::from(7u64);
    let (tree, index) = register::<20>(&secret)?;
    let inputs: VoterInputs = VoteInputs::honest(secret, 1, Fr::from(42u64), 3, &tree, index)?;

    let mut value = serde_json::to_value(inputs.to_witness())?;
    value["merkle_path"]
        .as_array_mut()
        .ok_or_else(|| anyhow::anyhow!("merkle_path is not an array"))?
        .truncate(19);

    let result = VoterInputs::from_json(&value.to_string());
    assert!(matches!(result, Err(ZkPollError::InvalidInput(_))));
    Ok(())
}

#[test]
fn test_prove_verify_and_reject_double_vote() -> Result<()> {
    init_tracing();
    const DEPTH: usize = 8;

    let system = VoteProofSystem::<DEPTH>::setup_with_rng(&mut StdRng::seed_from_u64(1))?;
    let mut registry = NullifierRegistry::new();

    let secret = Fr::from(7u64);
    let (tree, index) = register::<DEPTH>(&secret)?;
    let inputs = VoteInputs::honest(secret, 1, Fr::from(42u64), 3, &tree, index)?;

    let proof = system.prove_vote(&inputs)?;

    // The verifier only sees the proof and the public statement
    let statement = PublicInputs::from_json(&inputs.public.to_json()?)?;
    assert!(system.verify(proof.as_bytes(), &statement)?);
    registry.record_vote(&statement)?;

    // Same voter, same poll, different choice
    let mut second = inputs.clone();
    second.vote_choice = Fr::from(2u64);
    let second_proof = system.prove_vote(&second)?;
    assert!(system.verify(second_proof.as_bytes(), &second.public)?);
    assert!(matches!(
        registry.record_vote(&second.public),
        Err(RegistryError::NullifierAlreadyUsed { .. })
    ));

    // Same voter in another poll is a fresh nullifier
    let other_poll = VoteInputs::honest(secret, 0, Fr::from(43u64), 3, &tree, index)?;
    let other_proof = system.prove_vote(&other_poll)?;
    assert!(system.verify(other_proof.as_bytes(), &other_poll.public)?);
    registry.record_vote(&other_poll.public)?;

    // A proof does not transfer to another poll's statement
    assert!(!system.verify(proof.as_bytes(), &other_poll.public)?);

    assert_eq!(registry.len(), 2);
    Ok(())
}

#[test]
fn test_tree_root_tracks_registrations() -> Result<()> {
    let mut tree = VoterTree::new();
    let first = tree.insert(leaf_commitment(&Fr::from(1u64)))?;
    let old_root = tree.root();

    let secret = Fr::from(2u64);
    let index = tree.insert(leaf_commitment(&secret))?;

    // A path from the current tree does not verify against an older root
    let mut inputs: VoterInputs = VoteInputs::honest(secret, 0, Fr::from(1u64), 2, &tree, index)?;
    assert!(VoteValidator::holds(&inputs));
    assert!(tree.is_known_root(&inputs.public.merkle_root));
    assert!(!tree.is_known_root(&old_root));

    inputs.public.merkle_root = old_root;
    assert_eq!(
        VoteValidator::validate(&inputs),
        Err(ConstraintViolation::MembershipFailure)
    );

    // The earlier voter's fresh path still verifies against the new root
    let earlier: VoterInputs = VoteInputs::honest(Fr::from(1u64), 0, Fr::from(1u64), 2, &tree, first)?;
    assert!(VoteValidator::holds(&earlier));
    Ok(())
}
