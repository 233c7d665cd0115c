//! Allow-list Merkle proofs.
//!
//! Pairs are sorted before concatenation, so a proof carries no left/right
//! flags. The tree builder below and every off-chain proof generator must use
//! the same rule or proofs silently stop verifying.

use nugget_core::types::{Address, Hash32};

use crate::hash::{keccak256, leaf_for};

/// Keccak-256 of the two nodes in ascending byte order.
pub fn hash_pair(a: &Hash32, b: &Hash32) -> Hash32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(lo.as_bytes());
    buf[32..].copy_from_slice(hi.as_bytes());
    keccak256(&buf)
}

/// Recompute the root from `leaf` and `proof` and compare with `root`.
pub fn verify(proof: &[Hash32], leaf: Hash32, root: Hash32) -> bool {
    proof.iter().fold(leaf, |acc, sibling| hash_pair(&acc, sibling)) == root
}

/// Membership of `address` under `root`.
pub fn verify_address(proof: &[Hash32], address: &Address, root: Hash32) -> bool {
    verify(proof, leaf_for(address), root)
}

// ── MerkleTree ────────────────────────────────────────────────────────────────

/// Off-chain tree builder mirroring `verify`.
///
/// Leaves keep their input order. A node without a sibling is promoted to
/// the next layer unchanged.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    layers: Vec<Vec<Hash32>>,
}

impl MerkleTree {
    pub fn from_leaves(leaves: Vec<Hash32>) -> Self {
        let mut layers = vec![leaves];
        while layers.last().map_or(false, |l| l.len() > 1) {
            let prev = &layers[layers.len() - 1];
            let next: Vec<Hash32> = prev
                .chunks(2)
                .map(|pair| match pair {
                    [a, b] => hash_pair(a, b),
                    _ => pair[0],
                })
                .collect();
            layers.push(next);
        }
        Self { layers }
    }

    pub fn from_addresses(addresses: &[Address]) -> Self {
        Self::from_leaves(addresses.iter().map(leaf_for).collect())
    }

    /// Root hash; `Hash32::ZERO` for an empty tree.
    pub fn root(&self) -> Hash32 {
        self.layers
            .last()
            .and_then(|top| top.first().copied())
            .unwrap_or(Hash32::ZERO)
    }

    pub fn leaf_count(&self) -> usize {
        self.layers.first().map_or(0, Vec::len)
    }

    pub fn leaves(&self) -> &[Hash32] {
        self.layers.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sibling path for the first occurrence of `leaf`, or `None` if absent.
    pub fn proof(&self, leaf: &Hash32) -> Option<Vec<Hash32>> {
        let mut index = self.leaves().iter().position(|l| l == leaf)?;
        let mut proof = Vec::new();
        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling = index ^ 1;
            if let Some(node) = layer.get(sibling) {
                proof.push(*node);
            }
            index /= 2;
        }
        Some(proof)
    }

    pub fn proof_for(&self, address: &Address) -> Option<Vec<Hash32>> {
        self.proof(&leaf_for(address))
    }
}
