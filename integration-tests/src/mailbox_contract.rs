use error_stack::Result;
use hyperlane_ton_api::msg::{Dispatch, Process};
use hyperlane_ton_api::{Message, MultisigMetadata};
use mailbox::msg::InstantiateMsg;
use mailbox::Mailbox;
use ton_sandbox::{Blockchain, SendResult};
use ton_utils::Address;

use crate::contract::{deploy, Contract, Error};

#[derive(Clone, Copy, Debug)]
pub struct MailboxContract {
    pub contract_addr: Address,
}

impl MailboxContract {
    pub fn instantiate_contract(
        chain: &mut Blockchain,
        deployer: Address,
        label: &str,
        msg: InstantiateMsg,
    ) -> Result<Self, Error> {
        let contract_addr = deploy(chain, deployer, label, Mailbox::instantiate(msg))?;

        Ok(MailboxContract { contract_addr })
    }

    pub fn dispatch(
        &self,
        chain: &mut Blockchain,
        caller: Address,
        dispatch: &Dispatch,
        value: u128,
    ) -> Result<SendResult, Error> {
        self.execute_with_value(chain, caller, dispatch, value)
    }

    pub fn process(
        &self,
        chain: &mut Blockchain,
        relayer: Address,
        message: Message,
        metadata: MultisigMetadata,
        value: u128,
    ) -> Result<SendResult, Error> {
        let process = Process {
            message,
            metadata: Some(metadata),
        };

        self.execute_with_value(chain, relayer, &process, value)
    }
}

impl Contract for MailboxContract {
    type State = Mailbox;

    const KIND: &'static str = "mailbox";

    fn contract_address(&self) -> Address {
        self.contract_addr
    }
}
