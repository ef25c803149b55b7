//! zkSNARK proof generation and verification
//!
//! This module implements Groth16 proof generation and verification for votes.
//!
//! Components:
//! - `gadgets`: R1CS constraint gadgets (Poseidon, Merkle, range checks)
//! - `vote_circuit`: The vote predicate as a constraint system
//! - Proof generation and verification using ark-groth16

pub mod gadgets;
pub mod vote_circuit;

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, ProvingKey, VerifyingKey};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::{CryptoRng, RngCore};
use rand::rngs::OsRng;
use tracing::{debug, info};

use crate::ballot::inputs::{PublicInputs, VoteInputs, NUM_PUBLIC_INPUTS};
use crate::ballot::validator::VoteValidator;
use crate::crypto::merkle::TREE_DEPTH;
use crate::error::ProofError;

pub use vote_circuit::{VoteCircuit, VoterCircuit};

/// Serialized Groth16 proof (128 bytes)
/// Format: compressed A (32) || B (64) || C (32)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializedProof {
    pub bytes: Vec<u8>,
}

impl SerializedProof {
    /// Expected size of a compressed Groth16 proof over BN254
    pub const SIZE: usize = 128;

    /// Create from raw bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ProofError> {
        if bytes.len() != Self::SIZE {
            return Err(ProofError::SerializationError(format!(
                "Expected {} bytes, got {}",
                Self::SIZE,
                bytes.len()
            )));
        }
        Ok(Self { bytes })
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Groth16 proof system for vote circuits of depth `DEPTH`
pub struct VoteProofSystem<const DEPTH: usize> {
    proving_key: ProvingKey<Bn254>,
    verifying_key: VerifyingKey<Bn254>,
    prepared_vk: PreparedVerifyingKey<Bn254>,
}

/// Proof system at the production tree depth
pub type VoterProofSystem = VoteProofSystem<TREE_DEPTH>;

impl<const DEPTH: usize> VoteProofSystem<DEPTH> {
    /// Generate proving and verifying keys for the vote circuit
    ///
    /// WARNING: This uses a random toxic waste and is suitable only for testing.
    /// For production, use a trusted setup ceremony.
    pub fn setup() -> Result<Self, ProofError> {
        Self::setup_with_rng(&mut OsRng)
    }

    /// Setup with caller-supplied randomness
    pub fn setup_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, ProofError> {
        info!(depth = DEPTH, "Running Groth16 setup for vote circuit");

        let circuit = VoteCircuit::<DEPTH>::blank();

        let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(circuit, rng)
            .map_err(|e| ProofError::SetupFailed(e.to_string()))?;

        let prepared_vk = Groth16::<Bn254>::process_vk(&vk)
            .map_err(|e| ProofError::SetupFailed(e.to_string()))?;

        info!("Groth16 setup complete");

        Ok(Self {
            proving_key: pk,
            verifying_key: vk,
            prepared_vk,
        })
    }

    /// Load from serialized keys
    pub fn from_keys(pk_bytes: &[u8], vk_bytes: &[u8]) -> Result<Self, ProofError> {
        let proving_key = ProvingKey::deserialize_compressed(pk_bytes)
            .map_err(|_| ProofError::InvalidProvingKey)?;

        let verifying_key = VerifyingKey::<Bn254>::deserialize_compressed(vk_bytes)
            .map_err(|_| ProofError::InvalidVerifyingKey)?;

        // One IC element per public input, plus the constant term
        if verifying_key.gamma_abc_g1.len() != NUM_PUBLIC_INPUTS + 1 {
            return Err(ProofError::InvalidVerifyingKey);
        }

        let prepared_vk = Groth16::<Bn254>::process_vk(&verifying_key)
            .map_err(|e| ProofError::SetupFailed(e.to_string()))?;

        Ok(Self {
            proving_key,
            verifying_key,
            prepared_vk,
        })
    }

    /// Serialize the proving key
    pub fn serialize_proving_key(&self) -> Result<Vec<u8>, ProofError> {
        let mut bytes = Vec::new();
        self.proving_key
            .serialize_compressed(&mut bytes)
            .map_err(|e| ProofError::SerializationError(e.to_string()))?;
        Ok(bytes)
    }

    /// Serialize the verifying key
    pub fn serialize_verifying_key(&self) -> Result<Vec<u8>, ProofError> {
        let mut bytes = Vec::new();
        self.verifying_key
            .serialize_compressed(&mut bytes)
            .map_err(|e| ProofError::SerializationError(e.to_string()))?;
        Ok(bytes)
    }

    /// Generate a proof for a vote circuit.
    ///
    /// The assignment is checked against the constraints first; an
    /// unsatisfied circuit yields `InvalidWitness` and no proof.
    pub fn prove(&self, circuit: VoteCircuit<DEPTH>) -> Result<SerializedProof, ProofError> {
        self.prove_with_rng(circuit, &mut OsRng)
    }

    pub fn prove_with_rng<R: RngCore + CryptoRng>(
        &self,
        circuit: VoteCircuit<DEPTH>,
        rng: &mut R,
    ) -> Result<SerializedProof, ProofError> {
        let cs = ConstraintSystem::<Fr>::new_ref();
        circuit
            .clone()
            .generate_constraints(cs.clone())
            .map_err(|e| ProofError::InvalidWitness(e.to_string()))?;

        let satisfied = cs
            .is_satisfied()
            .map_err(|e| ProofError::InvalidWitness(e.to_string()))?;
        if !satisfied {
            return Err(ProofError::InvalidWitness(
                "vote circuit is not satisfied".to_string(),
            ));
        }
        debug!(constraints = cs.num_constraints(), "vote circuit satisfied");

        let proof = Groth16::<Bn254>::prove(&self.proving_key, circuit, rng)
            .map_err(|e| ProofError::GenerationFailed(e.to_string()))?;

        let mut bytes = Vec::new();
        proof
            .serialize_compressed(&mut bytes)
            .map_err(|e| ProofError::SerializationError(e.to_string()))?;

        info!("Vote proof generated");
        SerializedProof::from_bytes(bytes)
    }

    /// Check the inputs natively, then prove.
    ///
    /// Unlike [`Self::prove`], a failing vote reports which check it violated.
    pub fn prove_vote(&self, inputs: &VoteInputs<DEPTH>) -> Result<SerializedProof, ProofError> {
        VoteValidator::validate(inputs).map_err(|v| ProofError::InvalidWitness(v.to_string()))?;
        self.prove(VoteCircuit::new(inputs))
    }

    /// Verify a proof against a public statement
    pub fn verify(&self, proof_bytes: &[u8], public: &PublicInputs) -> Result<bool, ProofError> {
        self.verify_fields(proof_bytes, &public.to_field_elements())
    }

    /// Verify a proof against raw public inputs in canonical order
    pub fn verify_fields(&self, proof_bytes: &[u8], public_inputs: &[Fr]) -> Result<bool, ProofError> {
        if public_inputs.len() != NUM_PUBLIC_INPUTS {
            return Err(ProofError::VerificationFailed(format!(
                "expected {} public inputs, got {}",
                NUM_PUBLIC_INPUTS,
                public_inputs.len()
            )));
        }

        let proof_bytes = SerializedProof::from_bytes(proof_bytes.to_vec())?;
        let proof = Proof::deserialize_compressed(proof_bytes.as_bytes())
            .map_err(|e| ProofError::SerializationError(e.to_string()))?;

        let valid = Groth16::<Bn254>::verify_with_processed_vk(&self.prepared_vk, public_inputs, &proof)
            .map_err(|e| ProofError::VerificationFailed(e.to_string()))?;

        debug!(valid, "Vote proof verified");
        Ok(valid)
    }

    /// Get the verifying key
    pub fn verifying_key(&self) -> &VerifyingKey<Bn254> {
        &self.verifying_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::merkle::PoseidonMerkleTree;
    use crate::crypto::nullifier::leaf_commitment;
    use rand::{rngs::StdRng, SeedableRng};
    use std::sync::OnceLock;

    const DEPTH: usize = 4;

    /// Setup is the slow part; share one key pair across tests
    fn proof_system() -> &'static VoteProofSystem<DEPTH> {
        static SYSTEM: OnceLock<VoteProofSystem<DEPTH>> = OnceLock::new();
        SYSTEM.get_or_init(|| {
            VoteProofSystem::setup_with_rng(&mut StdRng::seed_from_u64(0x5eed)).unwrap()
        })
    }

    fn valid_inputs() -> VoteInputs<DEPTH> {
        let secret = Fr::from(7u64);
        let mut tree = PoseidonMerkleTree::<DEPTH>::new();
        tree.insert(leaf_commitment(&Fr::from(3u64))).unwrap();
        let index = tree.insert(leaf_commitment(&secret)).unwrap();

        VoteInputs::honest(secret, 1, Fr::from(42u64), 3, &tree, index).unwrap()
    }

    #[test]
    fn test_prove_and_verify() {
        let system = proof_system();
        let inputs = valid_inputs();

        let proof = system.prove(VoteCircuit::new(&inputs)).unwrap();
        assert_eq!(proof.as_bytes().len(), SerializedProof::SIZE);

        assert!(system.verify(proof.as_bytes(), &inputs.public).unwrap());
    }

    #[test]
    fn test_tampered_public_inputs_rejected() {
        let system = proof_system();
        let inputs = valid_inputs();
        let proof = system.prove_vote(&inputs).unwrap();

        let fields = inputs.public.to_field_elements();
        for i in 0..NUM_PUBLIC_INPUTS {
            let mut tampered = fields;
            tampered[i] += Fr::from(1u64);
            assert!(
                !system.verify_fields(proof.as_bytes(), &tampered).unwrap(),
                "public input {} was not bound",
                i
            );
        }
    }

    #[test]
    fn test_invalid_witness_not_proven() {
        let system = proof_system();
        let mut inputs = valid_inputs();
        inputs.vote_choice = Fr::from(5u64);

        assert!(matches!(
            system.prove(VoteCircuit::new(&inputs)),
            Err(ProofError::InvalidWitness(_))
        ));

        let err = system.prove_vote(&inputs).unwrap_err();
        assert!(err.to_string().contains("number of options"));
    }

    #[test]
    fn test_wrong_public_input_count() {
        let system = proof_system();
        let inputs = valid_inputs();
        let proof = system.prove_vote(&inputs).unwrap();

        let fields = inputs.public.to_field_elements();
        assert!(system.verify_fields(proof.as_bytes(), &fields[..3]).is_err());
    }

    #[test]
    fn test_proof_length_checked_before_decoding() {
        let system = proof_system();
        let inputs = valid_inputs();
        let proof = system.prove_vote(&inputs).unwrap();

        let mut padded = proof.as_bytes().to_vec();
        padded.push(0);
        assert!(matches!(
            system.verify(&padded, &inputs.public),
            Err(ProofError::SerializationError(_))
        ));
        assert!(matches!(
            system.verify(&proof.as_bytes()[..64], &inputs.public),
            Err(ProofError::SerializationError(_))
        ));
    }

    #[test]
    fn test_key_serialization() {
        let system = proof_system();
        let pk = system.serialize_proving_key().unwrap();
        let vk = system.serialize_verifying_key().unwrap();

        let restored = VoteProofSystem::<DEPTH>::from_keys(&pk, &vk).unwrap();

        let inputs = valid_inputs();
        let proof = restored.prove_vote(&inputs).unwrap();
        assert!(system.verify(proof.as_bytes(), &inputs.public).unwrap());

        assert!(matches!(
            VoteProofSystem::<DEPTH>::from_keys(&pk, &vk[..vk.len() - 1]),
            Err(ProofError::InvalidVerifyingKey)
        ));
    }

    #[test]
    fn test_serialized_proof_size() {
        assert!(SerializedProof::from_bytes(vec![0u8; 128]).is_ok());
        assert!(SerializedProof::from_bytes(vec![0u8; 256]).is_err());
    }
}
