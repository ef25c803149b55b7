//! Vote inputs: the private witness and the public statement
//!
//! Public inputs are always laid out as
//! `[merkle_root, nullifier, poll_id, max_options]`; the circuit allocates
//! them in this order and verifiers must supply them in this order.

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};

use crate::crypto::field::{fr_from_hex, fr_to_hex};
use crate::crypto::merkle::{MerklePath, PoseidonMerkleTree, TREE_DEPTH};
use crate::crypto::nullifier::{derive_nullifier, leaf_commitment};
use crate::error::{validation, CryptoError, ZkPollError, ZkPollResult};

/// Bit width used to interpret `vote_choice` and `max_options` as unsigned integers
pub const VOTE_CHOICE_BITS: usize = 32;

/// Number of public inputs of a vote proof
pub const NUM_PUBLIC_INPUTS: usize = 4;

/// Public statement of a vote proof
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicInputs {
    /// Root of the eligible-voter tree
    pub merkle_root: Fr,
    /// hash_pair(secret, poll_id)
    pub nullifier: Fr,
    pub poll_id: Fr,
    /// Exclusive upper bound for the vote choice
    pub max_options: Fr,
}

impl PublicInputs {
    /// Field elements in circuit allocation order
    pub fn to_field_elements(&self) -> [Fr; NUM_PUBLIC_INPUTS] {
        [self.merkle_root, self.nullifier, self.poll_id, self.max_options]
    }

    pub fn from_field_elements(elements: &[Fr]) -> ZkPollResult<Self> {
        match elements {
            [merkle_root, nullifier, poll_id, max_options] => Ok(Self {
                merkle_root: *merkle_root,
                nullifier: *nullifier,
                poll_id: *poll_id,
                max_options: *max_options,
            }),
            _ => Err(ZkPollError::InvalidInput(format!(
                "expected {} public inputs, got {}",
                NUM_PUBLIC_INPUTS,
                elements.len()
            ))),
        }
    }

    pub fn to_json(&self) -> ZkPollResult<String> {
        Ok(serde_json::to_string(&PublicInputsJson::from(self))?)
    }

    pub fn from_json(json: &str) -> ZkPollResult<Self> {
        let raw: PublicInputsJson = serde_json::from_str(json)?;
        raw.try_into()
    }
}

/// JSON form of [`PublicInputs`]; scalars are hex-encoded little-endian bytes
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PublicInputsJson {
    pub merkle_root: String,
    pub nullifier: String,
    pub poll_id: String,
    pub max_options: String,
}

impl From<&PublicInputs> for PublicInputsJson {
    fn from(inputs: &PublicInputs) -> Self {
        Self {
            merkle_root: fr_to_hex(&inputs.merkle_root),
            nullifier: fr_to_hex(&inputs.nullifier),
            poll_id: fr_to_hex(&inputs.poll_id),
            max_options: fr_to_hex(&inputs.max_options),
        }
    }
}

impl TryFrom<PublicInputsJson> for PublicInputs {
    type Error = ZkPollError;

    fn try_from(raw: PublicInputsJson) -> Result<Self, Self::Error> {
        Ok(Self {
            merkle_root: parse_scalar(&raw.merkle_root, "merkle_root")?,
            nullifier: parse_scalar(&raw.nullifier, "nullifier")?,
            poll_id: parse_scalar(&raw.poll_id, "poll_id")?,
            max_options: parse_scalar(&raw.max_options, "max_options")?,
        })
    }
}

/// Complete input to the vote predicate
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteInputs<const DEPTH: usize> {
    /// Voter secret (private)
    pub secret: Fr,
    /// Chosen option (private)
    pub vote_choice: Fr,
    /// Authentication path of hash_single(secret) (private)
    pub path: MerklePath<DEPTH>,
    pub public: PublicInputs,
}

/// Vote inputs at the production tree depth
pub type VoterInputs = VoteInputs<TREE_DEPTH>;

impl<const DEPTH: usize> VoteInputs<DEPTH> {
    /// Inputs an honest voter would produce: the nullifier is derived from the
    /// secret and the path is read from `tree` at `leaf_index`.
    ///
    /// The leaf at `leaf_index` is not required to match the secret, which
    /// lets callers assemble deliberately invalid inputs.
    pub fn honest(
        secret: Fr,
        vote_choice: u64,
        poll_id: Fr,
        max_options: u64,
        tree: &PoseidonMerkleTree<DEPTH>,
        leaf_index: u64,
    ) -> ZkPollResult<Self> {
        let path = tree
            .generate_proof(leaf_index)
            .map_err(CryptoError::from)?;

        Ok(Self {
            secret,
            vote_choice: Fr::from(vote_choice),
            path,
            public: PublicInputs {
                merkle_root: tree.root(),
                nullifier: derive_nullifier(&secret, &poll_id),
                poll_id,
                max_options: Fr::from(max_options),
            },
        })
    }

    /// Leaf commitment of the secret
    pub fn leaf(&self) -> Fr {
        leaf_commitment(&self.secret)
    }

    pub fn public_inputs(&self) -> &PublicInputs {
        &self.public
    }

    pub fn to_witness(&self) -> VoteWitness {
        VoteWitness {
            secret: fr_to_hex(&self.secret),
            vote_choice: fr_to_hex(&self.vote_choice),
            merkle_path: self.path.siblings.iter().map(fr_to_hex).collect(),
            merkle_indices: self.path.indices.iter().map(|&b| b as u64).collect(),
            public: PublicInputsJson::from(&self.public),
        }
    }

    /// Parse and shape-check a JSON witness
    pub fn from_json(json: &str) -> ZkPollResult<Self> {
        let witness: VoteWitness = serde_json::from_str(json)?;
        witness.into_inputs()
    }
}

/// JSON witness file: private inputs plus the public statement
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VoteWitness {
    pub secret: String,
    pub vote_choice: String,
    /// Sibling hashes, leaf to root
    pub merkle_path: Vec<String>,
    /// 0 = left child, 1 = right child
    pub merkle_indices: Vec<u64>,
    #[serde(flatten)]
    pub public: PublicInputsJson,
}

impl VoteWitness {
    /// Convert to typed inputs, rejecting malformed shapes and encodings
    pub fn into_inputs<const DEPTH: usize>(self) -> ZkPollResult<VoteInputs<DEPTH>> {
        validation::validate_merkle_path(self.merkle_path.len(), self.merkle_indices.len(), DEPTH)?;
        let indices = validation::validate_index_flags(&self.merkle_indices)?;

        let siblings = self
            .merkle_path
            .iter()
            .enumerate()
            .map(|(level, s)| parse_scalar(s, &format!("merkle_path[{}]", level)))
            .collect::<ZkPollResult<Vec<Fr>>>()?;

        let path = MerklePath::from_slices(&siblings, &indices).map_err(CryptoError::from)?;

        Ok(VoteInputs {
            secret: parse_scalar(&self.secret, "secret")?,
            vote_choice: parse_scalar(&self.vote_choice, "vote_choice")?,
            path,
            public: self.public.try_into()?,
        })
    }
}

fn parse_scalar(value: &str, name: &str) -> ZkPollResult<Fr> {
    fr_from_hex(value).map_err(|e| ZkPollError::InvalidInput(format!("{}: {}", name, e)))
}
