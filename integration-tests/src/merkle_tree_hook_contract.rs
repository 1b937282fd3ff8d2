use error_stack::Result;
use hyperlane_ton_api::msg::SetAuthorizedHook;
use merkle_tree_hook::msg::InstantiateMsg;
use merkle_tree_hook::MerkleTreeHook;
use ton_sandbox::{Blockchain, SendResult};
use ton_utils::Address;

use crate::contract::{deploy, Contract, Error};

#[derive(Clone, Copy, Debug)]
pub struct MerkleTreeHookContract {
    pub contract_addr: Address,
}

impl MerkleTreeHookContract {
    pub fn instantiate_contract(
        chain: &mut Blockchain,
        deployer: Address,
        label: &str,
        msg: InstantiateMsg,
    ) -> Result<Self, Error> {
        let contract_addr = deploy(chain, deployer, label, MerkleTreeHook::instantiate(msg))?;

        Ok(MerkleTreeHookContract { contract_addr })
    }

    pub fn authorize_hook(
        &self,
        chain: &mut Blockchain,
        owner: Address,
        hook: Address,
    ) -> Result<SendResult, Error> {
        self.execute(
            chain,
            owner,
            &SetAuthorizedHook {
                hook,
                authorized: true,
            },
        )
    }
}

impl Contract for MerkleTreeHookContract {
    type State = MerkleTreeHook;

    const KIND: &'static str = "merkle tree hook";

    fn contract_address(&self) -> Address {
        self.contract_addr
    }
}
