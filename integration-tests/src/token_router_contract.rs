use error_stack::Result;
use hyperlane_ton_api::msg::{SetRouter, TransferRemote};
use hyperlane_ton_api::{Domain, HookMetadata};
use ton_sandbox::{Blockchain, SendResult};
use ton_utils::{Address, B256, U256};
use token_router::msg::InstantiateMsg;
use token_router::TokenRouter;

use crate::contract::{deploy, Contract, Error};

#[derive(Clone, Copy, Debug)]
pub struct TokenRouterContract {
    pub contract_addr: Address,
}

impl TokenRouterContract {
    pub fn instantiate_contract(
        chain: &mut Blockchain,
        deployer: Address,
        label: &str,
        msg: InstantiateMsg,
    ) -> Result<Self, Error> {
        let contract_addr = deploy(chain, deployer, label, TokenRouter::instantiate(msg))?;

        Ok(TokenRouterContract { contract_addr })
    }

    pub fn enroll_remote_router(
        &self,
        chain: &mut Blockchain,
        owner: Address,
        domain: Domain,
        router: B256,
    ) -> Result<SendResult, Error> {
        self.execute(chain, owner, &SetRouter { domain, router })
    }

    /// Sends `amount` of native value to `recipient` on `destination`. `value` must cover the
    /// amount plus the hook payments.
    pub fn transfer_remote(
        &self,
        chain: &mut Blockchain,
        sender: Address,
        destination: Domain,
        recipient: B256,
        amount: u128,
        hook_metadata: Option<HookMetadata>,
        value: u128,
    ) -> Result<SendResult, Error> {
        let transfer = TransferRemote {
            destination,
            recipient,
            amount: U256::from(amount),
            hook_metadata,
        };

        self.execute_with_value(chain, sender, &transfer, value)
    }
}

impl Contract for TokenRouterContract {
    type State = TokenRouter;

    const KIND: &'static str = "token router";

    fn contract_address(&self) -> Address {
        self.contract_addr
    }
}
