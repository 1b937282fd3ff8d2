use error_stack::{report, Result, ResultExt};
use hyperlane_ton_api::msg::Request;
use ton_sandbox::{Blockchain, SendResult};
use ton_utils::{Address, Cell, CellBuilder};

/// Value every contract is deployed with, enough to cover the answers it sends before it
/// collects anything.
pub const DEPLOY_VALUE: u128 = 1_000_000_000;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("failed to encode a message body")]
    Encode,
    #[error("sandbox chain rejected the message")]
    Chain,
    #[error("no {kind} deployed at {address}")]
    NotDeployed { kind: &'static str, address: Address },
    #[error("invalid deployment config")]
    Config,
    #[error("failed to sign")]
    Sign,
    #[error("failed to quote a dispatch")]
    Quote,
    #[error("condition not met after {0} attempts")]
    Timeout(u32),
}

/// A deployed contract, addressed by its typed state.
pub trait Contract {
    type State: ton_sandbox::Contract;

    const KIND: &'static str;

    fn contract_address(&self) -> Address;

    /// Current state of the contract, for its getters.
    fn query<'a>(&self, chain: &'a Blockchain) -> Result<&'a Self::State, Error> {
        let address = self.contract_address();

        chain
            .contract::<Self::State>(&address)
            .ok_or_else(|| {
                report!(Error::NotDeployed {
                    kind: Self::KIND,
                    address,
                })
            })
    }

    fn execute<R: Request>(
        &self,
        chain: &mut Blockchain,
        caller: Address,
        request: &R,
    ) -> Result<SendResult, Error> {
        self.execute_with_value(chain, caller, request, 0)
    }

    fn execute_with_value<R: Request>(
        &self,
        chain: &mut Blockchain,
        caller: Address,
        request: &R,
        value: u128,
    ) -> Result<SendResult, Error> {
        let body = request.to_body(0).change_context(Error::Encode)?;

        self.send_body(chain, caller, body, value)
    }

    fn send_body(
        &self,
        chain: &mut Blockchain,
        caller: Address,
        body: Cell,
        value: u128,
    ) -> Result<SendResult, Error> {
        chain
            .send(caller, self.contract_address(), value, body)
            .change_context(Error::Chain)
            .attach_printable_lazy(|| format!("{} at {}", Self::KIND, self.contract_address()))
    }
}

/// Deploys `state` at the address derived from `label`, funded by `deployer`.
pub fn deploy<S: ton_sandbox::Contract>(
    chain: &mut Blockchain,
    deployer: Address,
    label: &str,
    state: S,
) -> Result<Address, Error> {
    let address = Address::derived(label);
    let body = CellBuilder::new()
        .build()
        .map_err(|err| report!(Error::Encode).attach_printable(err))?;

    chain
        .deploy(deployer, address, DEPLOY_VALUE, Box::new(state), body)
        .change_context(Error::Chain)
        .attach_printable_lazy(|| format!("deploying {label}"))?;

    Ok(address)
}
