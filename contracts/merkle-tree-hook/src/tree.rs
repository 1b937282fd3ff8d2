use error_stack::{bail, ensure, Result};
use hyperlane_ton_api::ExitCode;
use ton_utils::{keccak256, B256};

pub const TREE_DEPTH: usize = 32;
/// 2^32 - 1: the last leaf index must still fit the 32-bit count.
pub const MAX_LEAVES: u32 = u32::MAX;

fn hash_pair(left: &B256, right: &B256) -> B256 {
    keccak256([left.as_slice(), right.as_slice()].concat())
}

/// Roots of empty subtrees: `zeros[0]` is the empty leaf, `zeros[i + 1] = H(zeros[i], zeros[i])`.
pub fn zero_hashes() -> [B256; TREE_DEPTH] {
    let mut zeros = [B256::ZERO; TREE_DEPTH];
    let mut current = B256::ZERO;

    for zero in zeros.iter_mut() {
        *zero = current;
        current = hash_pair(&current, &current);
    }

    zeros
}

/// Append-only keccak merkle tree of depth 32 that keeps one node per level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncrementalMerkleTree {
    branch: [B256; TREE_DEPTH],
    count: u32,
}

impl Default for IncrementalMerkleTree {
    fn default() -> Self {
        Self {
            branch: [B256::ZERO; TREE_DEPTH],
            count: 0,
        }
    }
}

impl IncrementalMerkleTree {
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn branch(&self) -> &[B256; TREE_DEPTH] {
        &self.branch
    }

    /// Appends `leaf` and returns its index.
    pub fn insert(&mut self, leaf: B256) -> Result<u32, ExitCode> {
        ensure!(self.count < MAX_LEAVES, ExitCode::MerkleTreeFull);

        let index = self.count;
        self.count = self.count.saturating_add(1);

        let mut size = self.count;
        let mut node = leaf;
        for branch in self.branch.iter_mut() {
            if size & 1 == 1 {
                *branch = node;
                return Ok(index);
            }

            node = hash_pair(branch, &node);
            size = size.wrapping_shr(1);
        }

        bail!(ExitCode::MerkleTreeFull)
    }

    pub fn root(&self) -> B256 {
        let mut index = self.count;
        let mut current = B256::ZERO;

        for (branch, zero) in self.branch.iter().zip(zero_hashes().iter()) {
            current = if index & 1 == 1 {
                hash_pair(branch, &current)
            } else {
                hash_pair(&current, zero)
            };
            index = index.wrapping_shr(1);
        }

        current
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use assert_ok::assert_ok;
    use rand::Rng;

    use super::*;

    /// Root of `leaves` padded with empty leaves, computed level by level.
    fn naive_root(leaves: &[B256]) -> B256 {
        let zeros = zero_hashes();
        let mut level = leaves.to_vec();

        for zero in zeros.iter() {
            if level.len() % 2 == 1 {
                level.push(*zero);
            }
            if level.is_empty() {
                level.push(*zero);
                level.push(*zero);
            }

            level = level
                .chunks(2)
                .map(|pair| hash_pair(&pair[0], &pair[1]))
                .collect();
        }

        level[0]
    }

    #[test]
    fn empty_tree_root_is_the_depth_32_zero_hash() {
        let tree = IncrementalMerkleTree::default();

        assert_eq!(
            tree.root(),
            assert_ok!(B256::from_str(
                "0x27ae5ba08d7291c96c8cbddcc148bf48a6d68c7974b94356f53754ef6171d757"
            ))
        );
        assert_eq!(tree.root(), naive_root(&[]));
    }

    #[test]
    fn incremental_root_matches_a_full_recomputation() {
        let mut rng = rand::thread_rng();
        let mut tree = IncrementalMerkleTree::default();
        let mut leaves = vec![];

        for expected_index in 0..33u32 {
            let leaf = B256::from(rng.gen::<[u8; 32]>());
            leaves.push(leaf);

            assert_eq!(assert_ok!(tree.insert(leaf)), expected_index);
            assert_eq!(tree.root(), naive_root(&leaves));
        }

        assert_eq!(tree.count(), 33);
    }

    #[test]
    fn full_tree_rejects_inserts() {
        let mut tree = IncrementalMerkleTree {
            count: MAX_LEAVES,
            ..Default::default()
        };
        let root = tree.root();

        let err = tree.insert(B256::repeat_byte(1)).unwrap_err();
        assert_eq!(err.current_context(), &ExitCode::MerkleTreeFull);
        assert_eq!(tree.count(), MAX_LEAVES);
        assert_eq!(tree.root(), root);
    }
}
