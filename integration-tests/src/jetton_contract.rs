use error_stack::{Result, ResultExt};
use hyperlane_ton_api::jetton::{JettonBurn, JettonMint, JettonTransfer};
use hyperlane_ton_api::{CellCodec, WarpTransfer};
use jetton::msg::InstantiateMsg;
use jetton::{wallet_address, JettonMinter, JettonWallet};
use ton_sandbox::{Blockchain, SendResult};
use ton_utils::Address;

use crate::contract::{deploy, Contract, Error};

#[derive(Clone, Copy, Debug)]
pub struct JettonMinterContract {
    pub contract_addr: Address,
}

impl JettonMinterContract {
    pub fn instantiate_contract(
        chain: &mut Blockchain,
        deployer: Address,
        label: &str,
        admin: Address,
    ) -> Result<Self, Error> {
        let minter = JettonMinter::instantiate(InstantiateMsg { admin });
        let contract_addr = deploy(chain, deployer, label, minter)?;

        Ok(JettonMinterContract { contract_addr })
    }

    /// The wallet of `owner`, deployed or not.
    pub fn wallet(&self, owner: Address) -> JettonWalletContract {
        JettonWalletContract {
            contract_addr: wallet_address(&self.contract_addr, &owner),
        }
    }

    pub fn mint(
        &self,
        chain: &mut Blockchain,
        admin: Address,
        to: Address,
        amount: u128,
        value: u128,
    ) -> Result<SendResult, Error> {
        let mint = JettonMint {
            to,
            amount,
            forward_ton_amount: 0,
            response_destination: Some(admin),
        };

        self.execute_with_value(chain, admin, &mint, value)
    }
}

impl Contract for JettonMinterContract {
    type State = JettonMinter;

    const KIND: &'static str = "jetton minter";

    fn contract_address(&self) -> Address {
        self.contract_addr
    }
}

#[derive(Clone, Copy, Debug)]
pub struct JettonWalletContract {
    pub contract_addr: Address,
}

impl JettonWalletContract {
    /// Balance of the wallet, zero while it is not deployed.
    pub fn balance(&self, chain: &Blockchain) -> u128 {
        self.query(chain)
            .map(JettonWallet::balance)
            .unwrap_or_default()
    }

    /// Burns `amount` of the owner's jettons. With a warp transfer attached, the minter relays
    /// the burn to its admin, which bridges the amount to the named recipient.
    pub fn burn(
        &self,
        chain: &mut Blockchain,
        owner: Address,
        amount: u128,
        warp: Option<&WarpTransfer>,
        value: u128,
    ) -> Result<SendResult, Error> {
        let custom_payload = warp
            .map(|warp| warp.to_arc_cell())
            .transpose()
            .change_context(Error::Encode)?;
        let burn = JettonBurn {
            amount,
            response_destination: Some(owner),
            custom_payload,
        };

        self.execute_with_value(chain, owner, &burn, value)
    }

    /// Moves `amount` to the wallet of `destination`. A positive `forward_ton_amount` notifies
    /// `destination` with the warp transfer as forward payload.
    pub fn transfer(
        &self,
        chain: &mut Blockchain,
        owner: Address,
        destination: Address,
        amount: u128,
        forward: Option<(u128, &WarpTransfer)>,
        value: u128,
    ) -> Result<SendResult, Error> {
        let (forward_ton_amount, forward_payload) = match forward {
            Some((ton_amount, warp)) => (
                ton_amount,
                Some(warp.to_arc_cell().change_context(Error::Encode)?),
            ),
            None => (0, None),
        };
        let transfer = JettonTransfer {
            amount,
            destination,
            response_destination: Some(owner),
            custom_payload: None,
            forward_ton_amount,
            forward_payload,
        };

        self.execute_with_value(chain, owner, &transfer, value)
    }
}

impl Contract for JettonWalletContract {
    type State = JettonWallet;

    const KIND: &'static str = "jetton wallet";

    fn contract_address(&self) -> Address {
        self.contract_addr
    }
}
