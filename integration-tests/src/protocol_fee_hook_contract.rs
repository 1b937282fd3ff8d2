use error_stack::{Result, ResultExt};
use protocol_fee_hook::msg::InstantiateMsg;
use protocol_fee_hook::ProtocolFeeHook;
use ton_sandbox::Blockchain;
use ton_utils::Address;

use crate::contract::{deploy, Contract, Error};

#[derive(Clone, Copy, Debug)]
pub struct ProtocolFeeHookContract {
    pub contract_addr: Address,
}

impl ProtocolFeeHookContract {
    pub fn instantiate_contract(
        chain: &mut Blockchain,
        deployer: Address,
        label: &str,
        msg: InstantiateMsg,
    ) -> Result<Self, Error> {
        let hook = ProtocolFeeHook::instantiate(msg).change_context(Error::Config)?;
        let contract_addr = deploy(chain, deployer, label, hook)?;

        Ok(ProtocolFeeHookContract { contract_addr })
    }
}

impl Contract for ProtocolFeeHookContract {
    type State = ProtocolFeeHook;

    const KIND: &'static str = "protocol fee hook";

    fn contract_address(&self) -> Address {
        self.contract_addr
    }
}
