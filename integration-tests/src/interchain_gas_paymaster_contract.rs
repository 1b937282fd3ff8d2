use error_stack::Result;
use interchain_gas_paymaster::msg::InstantiateMsg;
use interchain_gas_paymaster::InterchainGasPaymaster;
use ton_sandbox::Blockchain;
use ton_utils::Address;

use crate::contract::{deploy, Contract, Error};

#[derive(Clone, Copy, Debug)]
pub struct InterchainGasPaymasterContract {
    pub contract_addr: Address,
}

impl InterchainGasPaymasterContract {
    pub fn instantiate_contract(
        chain: &mut Blockchain,
        deployer: Address,
        label: &str,
        msg: InstantiateMsg,
    ) -> Result<Self, Error> {
        let contract_addr = deploy(chain, deployer, label, InterchainGasPaymaster::instantiate(msg))?;

        Ok(InterchainGasPaymasterContract { contract_addr })
    }
}

impl Contract for InterchainGasPaymasterContract {
    type State = InterchainGasPaymaster;

    const KIND: &'static str = "interchain gas paymaster";

    fn contract_address(&self) -> Address {
        self.contract_addr
    }
}
