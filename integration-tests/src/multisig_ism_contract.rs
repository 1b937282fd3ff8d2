use std::collections::HashMap;

use error_stack::{Result, ResultExt};
use multisig_ism::msg::InstantiateMsg;
use multisig_ism::{MultisigIsm, ValidatorSet};
use ton_sandbox::Blockchain;
use ton_utils::Address;

use crate::config::DomainValidators;
use crate::contract::{deploy, Contract, Error};

#[derive(Clone, Copy, Debug)]
pub struct MultisigIsmContract {
    pub contract_addr: Address,
}

impl MultisigIsmContract {
    pub fn instantiate_contract(
        chain: &mut Blockchain,
        deployer: Address,
        label: &str,
        owner: Address,
        validator_sets: &[DomainValidators],
    ) -> Result<Self, Error> {
        let validator_sets = validator_sets
            .iter()
            .map(|set| {
                ValidatorSet::new(set.validators.clone(), set.threshold)
                    .map(|validators| (set.domain, validators))
                    .change_context(Error::Config)
                    .attach_printable_lazy(|| format!("validators of domain {}", set.domain))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        let ism = MultisigIsm::instantiate(InstantiateMsg {
            owner,
            validator_sets,
        });
        let contract_addr = deploy(chain, deployer, label, ism)?;

        Ok(MultisigIsmContract { contract_addr })
    }
}

impl Contract for MultisigIsmContract {
    type State = MultisigIsm;

    const KIND: &'static str = "multisig ism";

    fn contract_address(&self) -> Address {
        self.contract_addr
    }
}
