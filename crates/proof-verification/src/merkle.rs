// Copyright 2024 Vault Bridge Developers.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use bridge_codec::{UnshieldRequest, BURN_INST_LEN, HASH_LEN};
use bridge_relayer_utils::keccak::{keccak256, keccak256_concat};

/// One level of a Merkle path: the sibling digest and which side it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathNode {
    /// Sibling digest at this level.
    pub sibling: [u8; HASH_LEN],
    /// `true` when the sibling is the left operand of the level hash.
    pub is_left: bool,
}

/// An inclusion proof for one burn instruction under a committed block root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    /// Digest of the burn instruction commitment.
    pub leaf: [u8; HASH_LEN],
    /// Siblings from the leaf level up to the root.
    pub path: Vec<PathNode>,
    /// Expected instruction-tree root.
    pub root: [u8; HASH_LEN],
    /// Block commitment the root belongs to.
    pub block_hash: [u8; HASH_LEN],
}

impl MerkleProof {
    /// Assembles the proof carried by an unshield request.
    ///
    /// Returns `None` when the sibling and side-flag sequences disagree in
    /// length; such a request can never verify.
    pub fn for_burn(request: &UnshieldRequest) -> Option<Self> {
        if request.siblings.len() != request.path_is_left.len() {
            return None;
        }
        let path = request
            .siblings
            .iter()
            .zip(&request.path_is_left)
            .map(|(sibling, is_left)| PathNode {
                sibling: *sibling,
                is_left: *is_left,
            })
            .collect();
        Some(Self {
            leaf: burn_leaf(&request.burn_inst, request.height),
            path,
            root: request.root,
            block_hash: request.block_hash,
        })
    }
}

/// Recomputes the root from the leaf and compares it to the expected one.
///
/// An empty path is valid only for a single-leaf tree, where the leaf is
/// the root.
pub fn verify(proof: &MerkleProof) -> bool {
    let mut acc = proof.leaf;
    for node in &proof.path {
        acc = if node.is_left {
            keccak256_concat(&node.sibling, &acc)
        } else {
            keccak256_concat(&acc, &node.sibling)
        };
    }
    acc == proof.root
}

/// Digest of a burn instruction as committed into the instruction tree:
/// the instruction bytes followed by the issuing height, left-padded to a
/// 32-byte big-endian word.
pub fn burn_leaf(burn_inst: &[u8; BURN_INST_LEN], height: u64) -> [u8; HASH_LEN] {
    let mut buf = [0u8; BURN_INST_LEN + 32];
    buf[..BURN_INST_LEN].copy_from_slice(burn_inst);
    buf[BURN_INST_LEN + 24..].copy_from_slice(&height.to_be_bytes());
    keccak256(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a proof for `leaves[target]` in a tree padded by duplicating
    /// the last node at odd levels, and returns it with the computed root.
    fn build_proof(leaves: &[[u8; 32]], target: usize) -> ([u8; 32], Vec<PathNode>) {
        let mut level: Vec<[u8; 32]> = leaves.to_vec();
        let mut index = target;
        let mut path = Vec::new();
        while level.len() > 1 {
            if level.len() % 2 == 1 {
                level.push(*level.last().unwrap());
            }
            let sibling_index = index ^ 1;
            path.push(PathNode {
                sibling: level[sibling_index],
                is_left: sibling_index < index,
            });
            level = level
                .chunks(2)
                .map(|pair| keccak256_concat(&pair[0], &pair[1]))
                .collect();
            index /= 2;
        }
        (level[0], path)
    }

    #[test]
    fn verifies_every_leaf_of_a_four_leaf_tree() {
        let leaves: Vec<[u8; 32]> =
            (0u8..4).map(|i| keccak256(&[i])).collect();
        for (i, leaf) in leaves.iter().enumerate() {
            let (root, path) = build_proof(&leaves, i);
            let proof = MerkleProof {
                leaf: *leaf,
                path,
                root,
                block_hash: [0; 32],
            };
            assert!(verify(&proof), "leaf {i} failed to verify");
        }
    }

    #[test]
    fn rejects_any_flipped_sibling_byte() {
        let leaves: Vec<[u8; 32]> =
            (0u8..4).map(|i| keccak256(&[i])).collect();
        let (root, path) = build_proof(&leaves, 2);
        for level in 0..path.len() {
            for byte in 0..32 {
                let mut tampered = path.clone();
                tampered[level].sibling[byte] ^= 1;
                let proof = MerkleProof {
                    leaf: leaves[2],
                    path: tampered,
                    root,
                    block_hash: [0; 32],
                };
                assert!(!verify(&proof));
            }
        }
    }

    #[test]
    fn empty_path_requires_leaf_to_equal_root() {
        let leaf = keccak256(b"only");
        let single = MerkleProof {
            leaf,
            path: vec![],
            root: leaf,
            block_hash: [0; 32],
        };
        assert!(verify(&single));
        let mismatched = MerkleProof {
            root: keccak256(b"other"),
            ..single
        };
        assert!(!verify(&mismatched));
    }

    #[test]
    fn burn_leaf_frames_height_as_big_endian_word() {
        let inst = [7u8; BURN_INST_LEN];
        let mut expected = inst.to_vec();
        expected.extend_from_slice(&[0u8; 24]);
        expected.extend_from_slice(&9_000u64.to_be_bytes());
        assert_eq!(burn_leaf(&inst, 9_000), keccak256(&expected));
    }

    #[test]
    fn for_burn_rejects_mismatched_path_lengths() {
        let request = UnshieldRequest {
            burn_inst: [1; BURN_INST_LEN],
            height: 5,
            siblings: vec![[2; 32], [3; 32]],
            path_is_left: vec![true],
            root: [4; 32],
            block_hash: [5; 32],
            signer_indexes: vec![],
            signatures: vec![],
        };
        assert!(MerkleProof::for_burn(&request).is_none());
    }

    #[test]
    fn for_burn_builds_a_verifiable_proof() {
        let burn_inst = [9u8; BURN_INST_LEN];
        let height = 1234u64;
        let leaf = burn_leaf(&burn_inst, height);
        let other = keccak256(b"sibling");
        let leaves = vec![leaf, other];
        let (root, path) = build_proof(&leaves, 0);
        let request = UnshieldRequest {
            burn_inst,
            height,
            siblings: path.iter().map(|n| n.sibling).collect(),
            path_is_left: path.iter().map(|n| n.is_left).collect(),
            root,
            block_hash: keccak256(b"block"),
            signer_indexes: vec![],
            signatures: vec![],
        };
        let proof = MerkleProof::for_burn(&request).unwrap();
        assert_eq!(proof.leaf, leaf);
        assert!(verify(&proof));
    }
}
