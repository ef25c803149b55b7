//! Merkle Path Verification Gadget for R1CS circuits
//!
//! Same walk as `MerkleVerifier`: exactly `DEPTH` hash_pair evaluations,
//! with the child order chosen by `select` on the index bit.

use ark_bn254::Fr;
use ark_r1cs_std::{alloc::AllocVar, boolean::Boolean, fields::fp::FpVar, prelude::*};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use super::poseidon::PoseidonGadget;
use crate::crypto::merkle::MerklePath;

/// Merkle path gadget for circuit-based verification
pub struct MerklePathGadget<const DEPTH: usize> {
    /// Sibling hashes along the path
    pub siblings: Vec<FpVar<Fr>>,
    /// Path indices (false = left, true = right)
    pub indices: Vec<Boolean<Fr>>,
}

impl<const DEPTH: usize> MerklePathGadget<DEPTH> {
    /// Allocate `DEPTH` siblings and index bits as witnesses.
    ///
    /// `path` is `None` during parameter generation; the variables are still
    /// allocated so the constraint shape does not depend on the witness.
    pub fn new_witness(
        cs: ConstraintSystemRef<Fr>,
        path: Option<&MerklePath<DEPTH>>,
    ) -> Result<Self, SynthesisError> {
        let siblings = (0..DEPTH)
            .map(|level| {
                FpVar::new_witness(cs.clone(), || {
                    path.map(|p| p.siblings[level])
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let indices = (0..DEPTH)
            .map(|level| {
                Boolean::new_witness(cs.clone(), || {
                    path.map(|p| p.indices[level])
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { siblings, indices })
    }

    /// Compute the Merkle root from the leaf and path
    #[tracing::instrument(target = "r1cs", skip_all)]
    pub fn compute_root(
        &self,
        poseidon: &PoseidonGadget,
        leaf: &FpVar<Fr>,
    ) -> Result<FpVar<Fr>, SynthesisError> {
        let mut current = leaf.clone();

        for (sibling, is_right) in self.siblings.iter().zip(self.indices.iter()) {
            // If is_right, current is on the right: hash(sibling, current)
            let left = is_right.select(sibling, &current)?;
            let right = is_right.select(&current, sibling)?;

            current = poseidon.hash_pair(&left, &right)?;
        }

        Ok(current)
    }

    /// Enforce that the path leads from `leaf` to `expected_root`
    pub fn verify(
        &self,
        poseidon: &PoseidonGadget,
        leaf: &FpVar<Fr>,
        expected_root: &FpVar<Fr>,
    ) -> Result<(), SynthesisError> {
        let computed_root = self.compute_root(poseidon, leaf)?;
        computed_root.enforce_equal(expected_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::UniformRand;
    use ark_relations::r1cs::ConstraintSystem;
    use rand::rngs::OsRng;

    use crate::crypto::merkle::PoseidonMerkleTree;

    const DEPTH: usize = 8;

    fn sample_tree() -> PoseidonMerkleTree<DEPTH> {
        let mut tree = PoseidonMerkleTree::new();
        for i in 0..5u64 {
            tree.insert(Fr::from(i + 1)).unwrap();
        }
        tree
    }

    /// Allocate leaf, root and path, enforce membership, report satisfiability
    fn check(leaf: Fr, root: Fr, path: &MerklePath<DEPTH>) -> bool {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let poseidon = PoseidonGadget::new(cs.clone()).unwrap();

        let leaf_var = FpVar::new_witness(cs.clone(), || Ok(leaf)).unwrap();
        let root_var = FpVar::new_input(cs.clone(), || Ok(root)).unwrap();
        let path_var = MerklePathGadget::<DEPTH>::new_witness(cs.clone(), Some(path)).unwrap();

        path_var.verify(&poseidon, &leaf_var, &root_var).unwrap();
        cs.is_satisfied().unwrap()
    }

    #[test]
    fn test_merkle_gadget_valid_proof() {
        let tree = sample_tree();

        for index in 0..5 {
            let path = tree.generate_proof(index).unwrap();
            let leaf = tree.get_leaf(index).unwrap();
            assert!(check(leaf, tree.root(), &path), "leaf {}", index);
        }
    }

    #[test]
    fn test_merkle_gadget_matches_native_root() {
        let tree = sample_tree();
        let path = tree.generate_proof(3).unwrap();
        let leaf = tree.get_leaf(3).unwrap();

        let cs = ConstraintSystem::<Fr>::new_ref();
        let poseidon = PoseidonGadget::new(cs.clone()).unwrap();
        let leaf_var = FpVar::new_witness(cs.clone(), || Ok(leaf)).unwrap();
        let path_var = MerklePathGadget::<DEPTH>::new_witness(cs.clone(), Some(&path)).unwrap();

        let root = path_var.compute_root(&poseidon, &leaf_var).unwrap();
        assert_eq!(root.value().unwrap(), path.compute_root(&leaf));
    }

    #[test]
    fn test_merkle_gadget_invalid_leaf() {
        let tree = sample_tree();
        let path = tree.generate_proof(2).unwrap();

        assert!(!check(Fr::from(999u64), tree.root(), &path));
    }

    #[test]
    fn test_merkle_gadget_invalid_root() {
        let tree = sample_tree();
        let path = tree.generate_proof(2).unwrap();
        let leaf = tree.get_leaf(2).unwrap();

        assert!(!check(leaf, Fr::rand(&mut OsRng), &path));
    }

    #[test]
    fn test_merkle_gadget_flipped_index() {
        let tree = sample_tree();
        let mut path = tree.generate_proof(2).unwrap();
        let leaf = tree.get_leaf(2).unwrap();
        path.indices[0] = !path.indices[0];

        assert!(!check(leaf, tree.root(), &path));
    }

    #[test]
    fn test_merkle_gadget_setup_mode() {
        let cs = ConstraintSystem::<Fr>::new_ref();
        cs.set_mode(ark_relations::r1cs::SynthesisMode::Setup);

        let poseidon = PoseidonGadget::new(cs.clone()).unwrap();
        let leaf = FpVar::new_witness(cs.clone(), || Ok(Fr::from(0u64))).unwrap();
        let root = FpVar::new_input(cs.clone(), || Ok(Fr::from(0u64))).unwrap();
        let path = MerklePathGadget::<DEPTH>::new_witness(cs.clone(), None).unwrap();

        path.verify(&poseidon, &leaf, &root).unwrap();
        assert!(cs.num_constraints() > 0);
    }
}
