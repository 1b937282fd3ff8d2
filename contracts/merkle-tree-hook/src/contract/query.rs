use hyperlane_ton_api::HookType;
use ton_utils::{Address, B256};

use super::MerkleTreeHook;
use crate::tree::TREE_DEPTH;

/// Branch and leaf count, enough to rebuild the tree off-chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeSnapshot {
    pub branch: [B256; TREE_DEPTH],
    pub count: u32,
}

impl MerkleTreeHook {
    pub fn root(&self) -> B256 {
        self.tree.root()
    }

    pub fn count(&self) -> u32 {
        self.tree.count()
    }

    /// Root and index of the most recent leaf, if any.
    pub fn latest_checkpoint(&self) -> Option<(B256, u32)> {
        self.tree
            .count()
            .checked_sub(1)
            .map(|index| (self.tree.root(), index))
    }

    pub fn tree(&self) -> TreeSnapshot {
        TreeSnapshot {
            branch: *self.tree.branch(),
            count: self.tree.count(),
        }
    }

    pub fn hook_type(&self) -> HookType {
        HookType::MerkleTree
    }

    pub fn mailbox(&self) -> Address {
        self.config.mailbox
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    pub fn is_authorized(&self, hook: &Address) -> bool {
        self.authorized_hooks.contains(hook)
    }
}
