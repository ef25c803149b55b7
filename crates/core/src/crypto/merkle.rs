//! Poseidon Merkle membership
//!
//! [`MerkleVerifier`] recomputes a root from a leaf and its authentication
//! path with a fixed number of iterations, one per level. The tree depth is a
//! const generic so the walk is over fixed-size arrays and unrolls the same
//! way in native code and in the R1CS gadget.
//!
//! [`PoseidonMerkleTree`] is an in-memory incremental tree used to produce
//! authentic paths for witnesses and tests. It is never persisted.

use ark_bn254::Fr;
use thiserror::Error;
use tracing::debug;

use super::poseidon::hash_pair;

/// Depth of the eligible-voter tree (2^20 = ~1 million voters)
pub const TREE_DEPTH: usize = 20;

/// Path through the eligible-voter tree
pub type VoterPath = MerklePath<TREE_DEPTH>;

/// In-memory eligible-voter tree
pub type VoterTree = PoseidonMerkleTree<TREE_DEPTH>;

#[derive(Error, Debug)]
pub enum MerkleError {
    #[error("Tree is full")]
    TreeFull,
    #[error("Invalid leaf index: {0}")]
    InvalidLeafIndex(u64),
    #[error("Invalid proof length: expected {expected}, got {got}")]
    InvalidProofLength { expected: usize, got: usize },
}

/// Recomputes and checks Merkle roots for trees of depth `DEPTH`
pub struct MerkleVerifier<const DEPTH: usize>;

impl<const DEPTH: usize> MerkleVerifier<DEPTH> {
    /// Walk from `leaf` to the root.
    ///
    /// `indices[i] == false`: the running node is the left child at level `i`,
    /// so the next node is `hash_pair(node, path[i])`. `true` swaps the
    /// arguments.
    pub fn compute_root(leaf: &Fr, path: &[Fr; DEPTH], indices: &[bool; DEPTH]) -> Fr {
        let mut current = *leaf;

        for (sibling, &is_right) in path.iter().zip(indices.iter()) {
            current = if is_right {
                hash_pair(sibling, &current)
            } else {
                hash_pair(&current, sibling)
            };
        }

        current
    }

    /// Whether `leaf` hashes up to `root` along the given path
    pub fn verify_membership(
        leaf: &Fr,
        root: &Fr,
        path: &[Fr; DEPTH],
        indices: &[bool; DEPTH],
    ) -> bool {
        Self::compute_root(leaf, path, indices) == *root
    }
}

/// Zero hashes per level: `zeros[0] = 0`, `zeros[i] = H(zeros[i-1], zeros[i-1])`
pub fn compute_zero_hashes<const DEPTH: usize>() -> Vec<Fr> {
    let mut zeros = Vec::with_capacity(DEPTH + 1);
    zeros.push(Fr::from(0u64));

    for i in 1..=DEPTH {
        let below = zeros[i - 1];
        zeros.push(hash_pair(&below, &below));
    }

    zeros
}

/// Authentication path for a leaf
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerklePath<const DEPTH: usize> {
    /// Sibling hashes from leaf to root
    pub siblings: [Fr; DEPTH],
    /// Path indices (false = left, true = right)
    pub indices: [bool; DEPTH],
    /// The leaf index
    pub leaf_index: u64,
}

impl<const DEPTH: usize> MerklePath<DEPTH> {
    /// Build a path from slices, checking both have exactly `DEPTH` entries.
    ///
    /// The leaf index is reconstructed from the index bits. Levels at 64 and
    /// above do not fit a `u64` index and contribute nothing to it.
    pub fn from_slices(siblings: &[Fr], indices: &[bool]) -> Result<Self, MerkleError> {
        let siblings: [Fr; DEPTH] = siblings.try_into().map_err(|_| MerkleError::InvalidProofLength {
            expected: DEPTH,
            got: siblings.len(),
        })?;
        let indices: [bool; DEPTH] = indices.try_into().map_err(|_| MerkleError::InvalidProofLength {
            expected: DEPTH,
            got: indices.len(),
        })?;

        let leaf_index = indices
            .iter()
            .enumerate()
            .filter(|&(_, &is_right)| is_right)
            .fold(0u64, |acc, (i, _)| acc | 1u64.checked_shl(i as u32).unwrap_or(0));

        Ok(Self {
            siblings,
            indices,
            leaf_index,
        })
    }

    /// Root reached from `leaf` along this path
    pub fn compute_root(&self, leaf: &Fr) -> Fr {
        MerkleVerifier::<DEPTH>::compute_root(leaf, &self.siblings, &self.indices)
    }

    /// Verify the path leads to the expected root
    pub fn verify(&self, leaf: &Fr, expected_root: &Fr) -> bool {
        MerkleVerifier::<DEPTH>::verify_membership(leaf, expected_root, &self.siblings, &self.indices)
    }
}

/// Incremental Merkle tree using Poseidon hash
///
/// Insertions are O(depth) using the "filled subtrees" technique.
#[derive(Clone, Debug)]
pub struct PoseidonMerkleTree<const DEPTH: usize> {
    /// Current number of leaves
    next_index: u64,
    /// Last left-hand node seen at each level
    filled_subtrees: Vec<Fr>,
    current_root: Fr,
    leaves: Vec<Fr>,
    zeros: Vec<Fr>,
}

impl<const DEPTH: usize> Default for PoseidonMerkleTree<DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const DEPTH: usize> PoseidonMerkleTree<DEPTH> {
    /// Create a new empty tree
    pub fn new() -> Self {
        let zeros = compute_zero_hashes::<DEPTH>();
        let filled_subtrees = zeros[..DEPTH].to_vec();
        let current_root = zeros[DEPTH];

        Self {
            next_index: 0,
            filled_subtrees,
            current_root,
            leaves: Vec::new(),
            zeros,
        }
    }

    /// Number of leaf slots, saturating at `u64::MAX` for depths of 64 or more
    pub fn capacity(&self) -> u64 {
        1u64.checked_shl(DEPTH as u32).unwrap_or(u64::MAX)
    }

    /// Insert a new leaf, returning its index
    pub fn insert(&mut self, leaf: Fr) -> Result<u64, MerkleError> {
        if self.next_index >= self.capacity() {
            return Err(MerkleError::TreeFull);
        }

        let leaf_index = self.next_index;
        let mut current = leaf;
        let mut index = leaf_index;

        for level in 0..DEPTH {
            if index % 2 == 0 {
                self.filled_subtrees[level] = current;
                current = hash_pair(&current, &self.zeros[level]);
            } else {
                current = hash_pair(&self.filled_subtrees[level], &current);
            }
            index /= 2;
        }

        self.leaves.push(leaf);
        self.current_root = current;
        self.next_index += 1;

        debug!(leaf_index, "inserted leaf into voter tree");
        Ok(leaf_index)
    }

    /// Get the current root
    pub fn root(&self) -> Fr {
        self.current_root
    }

    /// Authentication path for the leaf at `leaf_index`.
    ///
    /// Only the populated prefix of each level is hashed; missing siblings
    /// are the zero hash of that level.
    pub fn generate_proof(&self, leaf_index: u64) -> Result<MerklePath<DEPTH>, MerkleError> {
        if leaf_index >= self.next_index {
            return Err(MerkleError::InvalidLeafIndex(leaf_index));
        }

        let mut siblings = [Fr::from(0u64); DEPTH];
        let mut indices = [false; DEPTH];
        let mut level_nodes = self.leaves.clone();
        let mut index = leaf_index as usize;

        for level in 0..DEPTH {
            let zero = self.zeros[level];

            indices[level] = index % 2 == 1;
            siblings[level] = level_nodes.get(index ^ 1).copied().unwrap_or(zero);

            level_nodes = level_nodes
                .chunks(2)
                .map(|pair| hash_pair(&pair[0], pair.get(1).unwrap_or(&zero)))
                .collect();
            index /= 2;
        }

        Ok(MerklePath {
            siblings,
            indices,
            leaf_index,
        })
    }

    /// Check if a root matches the current root
    pub fn is_known_root(&self, root: &Fr) -> bool {
        *root == self.current_root
    }

    /// Get the leaf at a given index
    pub fn get_leaf(&self, index: u64) -> Option<Fr> {
        self.leaves.get(index as usize).copied()
    }

    /// Number of leaves in the tree
    pub fn len(&self) -> u64 {
        self.next_index
    }

    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }
}
