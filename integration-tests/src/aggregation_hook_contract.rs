use aggregation_hook::msg::InstantiateMsg;
use aggregation_hook::AggregationHook;
use error_stack::Result;
use ton_sandbox::Blockchain;
use ton_utils::Address;

use crate::contract::{deploy, Contract, Error};

#[derive(Clone, Copy, Debug)]
pub struct AggregationHookContract {
    pub contract_addr: Address,
}

impl AggregationHookContract {
    pub fn instantiate_contract(
        chain: &mut Blockchain,
        deployer: Address,
        label: &str,
        hooks: Vec<Address>,
    ) -> Result<Self, Error> {
        let hook = AggregationHook::instantiate(InstantiateMsg { hooks });
        let contract_addr = deploy(chain, deployer, label, hook)?;

        Ok(AggregationHookContract { contract_addr })
    }
}

impl Contract for AggregationHookContract {
    type State = AggregationHook;

    const KIND: &'static str = "aggregation hook";

    fn contract_address(&self) -> Address {
        self.contract_addr
    }
}
