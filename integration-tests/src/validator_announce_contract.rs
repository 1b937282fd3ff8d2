use error_stack::Result;
use ton_sandbox::Blockchain;
use ton_utils::Address;
use validator_announce::msg::InstantiateMsg;
use validator_announce::ValidatorAnnounce;

use crate::contract::{deploy, Contract, Error};

#[derive(Clone, Copy, Debug)]
pub struct ValidatorAnnounceContract {
    pub contract_addr: Address,
}

impl ValidatorAnnounceContract {
    pub fn instantiate_contract(
        chain: &mut Blockchain,
        deployer: Address,
        label: &str,
        msg: InstantiateMsg,
    ) -> Result<Self, Error> {
        let contract_addr = deploy(chain, deployer, label, ValidatorAnnounce::instantiate(msg))?;

        Ok(ValidatorAnnounceContract { contract_addr })
    }
}

impl Contract for ValidatorAnnounceContract {
    type State = ValidatorAnnounce;

    const KIND: &'static str = "validator announce";

    fn contract_address(&self) -> Address {
        self.contract_addr
    }
}
