//! Deterministic domain-separated Merkle tree builder.
//!
//! The table is a `Vec<Vec<SHA256Hash>>` indexed `[level][index]`, level
//! 0 being the leaves. Only nodes reachable from a real assertion are
//! materialized; an unpopulated sibling's hash is computed on demand by
//! [`hash_empty`] rather than stored, so the table never grows past
//! `2n - 1` entries for `n` assertions.

use crate::assertion::{Assertion, Assertions};
use crate::codec::ValidationMode;
use crate::error::ValidationError;
use crate::hashing::{hash_assertion, hash_empty, hash_node, SHA256Hash};

/// The node table for one issued batch.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    issuer_id: Vec<u8>,
    batch_number: u32,
    levels: Vec<Vec<SHA256Hash>>,
}

impl MerkleTree {
    /// Build the tree over `assertions`, in order (order defines leaf
    /// index). Panics if `assertions` is empty — callers that accept
    /// untrusted batches should validate with [`Assertions::validate`]
    /// first, or go through [`MerkleTree::build_validated`].
    pub fn build(issuer_id: &[u8], batch_number: u32, assertions: &[Assertion]) -> Self {
        assert!(!assertions.is_empty(), "a batch must contain at least one assertion");

        let leaves: Vec<SHA256Hash> = assertions
            .iter()
            .enumerate()
            .map(|(i, a)| hash_assertion(issuer_id, batch_number, i as u64, a))
            .collect();

        let mut levels = vec![leaves];
        let mut level: u8 = 0;
        while levels.last().unwrap().len() > 1 {
            let current = levels.last().unwrap();
            let next_level = level + 1;
            let next_len = (current.len() + 1) / 2;
            let mut next = Vec::with_capacity(next_len);
            for i in 0..next_len {
                let left = current[2 * i];
                let right = if 2 * i + 1 < current.len() {
                    current[2 * i + 1]
                } else {
                    hash_empty(issuer_id, batch_number, (2 * i + 1) as u64, level)
                };
                next.push(hash_node(issuer_id, batch_number, i as u64, next_level, &left, &right));
            }
            levels.push(next);
            level = next_level;
        }

        Self {
            issuer_id: issuer_id.to_vec(),
            batch_number,
            levels,
        }
    }

    /// Validate `assertions` per `mode`, then build the tree.
    pub fn build_validated(
        issuer_id: &[u8],
        batch_number: u32,
        assertions: &Assertions,
        mode: ValidationMode,
    ) -> Result<Self, ValidationError> {
        if mode.resolve() {
            assertions.validate()?;
        }
        Ok(Self::build(issuer_id, batch_number, &assertions.0))
    }

    /// The batch's Merkle root.
    pub fn root(&self) -> SHA256Hash {
        *self.levels.last().expect("tree has at least one level").last().unwrap()
    }

    /// The tree's depth `L` — `0` for a single-leaf batch.
    pub fn depth(&self) -> u8 {
        (self.levels.len() - 1) as u8
    }

    /// Number of assertions (leaves) in the batch.
    pub fn len(&self) -> usize {
        self.levels[0].len()
    }

    /// True if the tree holds no assertions — never true for a tree
    /// built by [`MerkleTree::build`], but useful for callers holding
    /// an `Option<MerkleTree>`.
    pub fn is_empty(&self) -> bool {
        self.levels[0].is_empty()
    }

    /// The issuer id this tree was built under.
    pub fn issuer_id(&self) -> &[u8] {
        &self.issuer_id
    }

    /// The batch number this tree was built under.
    pub fn batch_number(&self) -> u32 {
        self.batch_number
    }

    /// Hash at `(level, index)`, computing the lazy empty-subtree hash
    /// if that slot was never materialized.
    pub fn node_at(&self, level: u8, index: u64) -> SHA256Hash {
        let level_idx = level as usize;
        let index_idx = index as usize;
        match self.levels.get(level_idx).and_then(|l| l.get(index_idx)) {
            Some(hash) => *hash,
            None => hash_empty(&self.issuer_id, self.batch_number, index, level),
        }
    }

    /// The inclusion path for leaf `index`: `depth()` sibling hashes,
    /// bottom-up.
    pub fn inclusion_path(&self, index: usize) -> Vec<SHA256Hash> {
        assert!(index < self.len(), "leaf index out of range");
        let depth = self.depth();
        let mut path = Vec::with_capacity(depth as usize);
        for level in 0..depth {
            let idx_at_level = index >> level;
            let sibling = idx_at_level ^ 1;
            path.push(self.node_at(level, sibling as u64));
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::{ClaimList, SubjectInfo, SubjectType};
    use crate::hashing::hash_node;

    fn assertion_with_name(name: &str) -> Assertion {
        use crate::assertion::{Claim, DNSName};
        Assertion {
            subject_type: SubjectType::Tls,
            subject_info: SubjectInfo::new(vec![]),
            claims: ClaimList::new(vec![Claim::Dns(vec![DNSName::new(name.as_bytes().to_vec())])]),
        }
    }

    #[test]
    fn single_leaf_root_is_leaf_hash() {
        let a = assertion_with_name("a.example.com");
        let tree = MerkleTree::build(b"issuer", 0, std::slice::from_ref(&a));
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.root(), hash_assertion(b"issuer", 0, 0, &a));
        assert!(tree.inclusion_path(0).is_empty());
    }

    #[test]
    fn two_leaf_root_matches_expected_shape() {
        let a0 = assertion_with_name("a.example.com");
        let a1 = assertion_with_name("b.example.com");
        let tree = MerkleTree::build(b"issuer", 0, &[a0.clone(), a1.clone()]);
        let leaf0 = hash_assertion(b"issuer", 0, 0, &a0);
        let leaf1 = hash_assertion(b"issuer", 0, 1, &a1);
        let expected_root = hash_node(b"issuer", 0, 0, 1, &leaf0, &leaf1);
        assert_eq!(tree.root(), expected_root);
        assert_eq!(tree.inclusion_path(1), vec![leaf0]);
    }

    #[test]
    fn three_leaf_tree_pads_with_empty_hash() {
        let a0 = assertion_with_name("a.example.com");
        let a1 = assertion_with_name("b.example.com");
        let a2 = assertion_with_name("c.example.com");
        let tree = MerkleTree::build(b"issuer", 0, &[a0.clone(), a1.clone(), a2.clone()]);
        assert_eq!(tree.depth(), 2);

        let leaf0 = hash_assertion(b"issuer", 0, 0, &a0);
        let leaf1 = hash_assertion(b"issuer", 0, 1, &a1);
        let leaf2 = hash_assertion(b"issuer", 0, 2, &a2);
        let empty_3_0 = hash_empty(b"issuer", 0, 3, 0);
        let node_0_1 = hash_node(b"issuer", 0, 0, 1, &leaf0, &leaf1);

        let path = tree.inclusion_path(2);
        assert_eq!(path, vec![empty_3_0, node_0_1]);
    }

    #[test]
    fn determinism_across_rebuilds() {
        let a0 = assertion_with_name("a.example.com");
        let a1 = assertion_with_name("b.example.com");
        let t1 = MerkleTree::build(b"issuer", 5, &[a0.clone(), a1.clone()]);
        let t2 = MerkleTree::build(b"issuer", 5, &[a0, a1]);
        assert_eq!(t1.root(), t2.root());
    }

    #[test]
    #[should_panic]
    fn build_rejects_empty_batch() {
        MerkleTree::build(b"issuer", 0, &[]);
    }
}
