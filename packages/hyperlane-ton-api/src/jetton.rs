//! Bodies of the fungible-token (jetton) minter and wallet.
//!
//! Amounts use the variable-width coins layout of the token standard. Custom and forward payloads
//! are opaque cells; warp routes put a [`WarpTransfer`](crate::WarpTransfer) in them.

use ton_utils::{
    Address, ArcCell, CellBuilder, CellBuilderExt, CellParser, CellParserExt, TonCellError,
};

use crate::codec::CellCodec;
use crate::msg::{store_payload_cell, Request};
use crate::op::OpCode;

macro_rules! request {
    ($name:ident, $op:expr) => {
        impl Request for $name {
            const OP: OpCode = $op;
        }
    };
}

/// Sent by a wallet owner to move tokens to another owner's wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JettonTransfer {
    pub amount: u128,
    pub destination: Address,
    pub response_destination: Option<Address>,
    pub custom_payload: Option<ArcCell>,
    pub forward_ton_amount: u128,
    pub forward_payload: Option<ArcCell>,
}

impl CellCodec for JettonTransfer {
    const KIND: &'static str = "jetton transfer";

    fn store(&self, builder: &mut CellBuilder) -> Result<(), TonCellError> {
        builder.store_coins_u128(self.amount)?;
        builder.store_account(Some(&self.destination))?;
        builder.store_account(self.response_destination.as_ref())?;
        store_payload_cell(builder, self.custom_payload.as_ref())?;
        builder.store_coins_u128(self.forward_ton_amount)?;
        store_payload_cell(builder, self.forward_payload.as_ref())
    }

    fn load(parser: &mut CellParser) -> Result<Self, TonCellError> {
        Ok(JettonTransfer {
            amount: parser.load_coins_u128()?,
            destination: parser.load_required_account()?,
            response_destination: parser.load_account()?,
            custom_payload: parser.load_optional_ref()?,
            forward_ton_amount: parser.load_coins_u128()?,
            forward_payload: parser.load_optional_ref()?,
        })
    }
}

request!(JettonTransfer, OpCode::JettonTransfer);

/// Wallet-to-wallet leg of a transfer, also used by the minter to credit freshly minted tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JettonInternalTransfer {
    pub amount: u128,
    pub from: Address,
    pub response_address: Option<Address>,
    pub forward_ton_amount: u128,
    pub forward_payload: Option<ArcCell>,
}

impl CellCodec for JettonInternalTransfer {
    const KIND: &'static str = "jetton internal transfer";

    fn store(&self, builder: &mut CellBuilder) -> Result<(), TonCellError> {
        builder.store_coins_u128(self.amount)?;
        builder.store_account(Some(&self.from))?;
        builder.store_account(self.response_address.as_ref())?;
        builder.store_coins_u128(self.forward_ton_amount)?;
        store_payload_cell(builder, self.forward_payload.as_ref())
    }

    fn load(parser: &mut CellParser) -> Result<Self, TonCellError> {
        Ok(JettonInternalTransfer {
            amount: parser.load_coins_u128()?,
            from: parser.load_required_account()?,
            response_address: parser.load_account()?,
            forward_ton_amount: parser.load_coins_u128()?,
            forward_payload: parser.load_optional_ref()?,
        })
    }
}

request!(JettonInternalTransfer, OpCode::JettonInternalTransfer);

/// Tells the receiving owner that tokens arrived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JettonTransferNotification {
    pub amount: u128,
    pub sender: Address,
    pub forward_payload: Option<ArcCell>,
}

impl CellCodec for JettonTransferNotification {
    const KIND: &'static str = "jetton transfer notification";

    fn store(&self, builder: &mut CellBuilder) -> Result<(), TonCellError> {
        builder.store_coins_u128(self.amount)?;
        builder.store_account(Some(&self.sender))?;
        store_payload_cell(builder, self.forward_payload.as_ref())
    }

    fn load(parser: &mut CellParser) -> Result<Self, TonCellError> {
        Ok(JettonTransferNotification {
            amount: parser.load_coins_u128()?,
            sender: parser.load_required_account()?,
            forward_payload: parser.load_optional_ref()?,
        })
    }
}

request!(JettonTransferNotification, OpCode::JettonTransferNotification);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JettonExcesses;

impl CellCodec for JettonExcesses {
    const KIND: &'static str = "jetton excesses";

    fn store(&self, _: &mut CellBuilder) -> Result<(), TonCellError> {
        Ok(())
    }

    fn load(_: &mut CellParser) -> Result<Self, TonCellError> {
        Ok(JettonExcesses)
    }
}

request!(JettonExcesses, OpCode::JettonExcesses);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JettonBurn {
    pub amount: u128,
    pub response_destination: Option<Address>,
    pub custom_payload: Option<ArcCell>,
}

impl CellCodec for JettonBurn {
    const KIND: &'static str = "jetton burn";

    fn store(&self, builder: &mut CellBuilder) -> Result<(), TonCellError> {
        builder.store_coins_u128(self.amount)?;
        builder.store_account(self.response_destination.as_ref())?;
        store_payload_cell(builder, self.custom_payload.as_ref())
    }

    fn load(parser: &mut CellParser) -> Result<Self, TonCellError> {
        Ok(JettonBurn {
            amount: parser.load_coins_u128()?,
            response_destination: parser.load_account()?,
            custom_payload: parser.load_optional_ref()?,
        })
    }
}

request!(JettonBurn, OpCode::JettonBurn);

/// Wallet-to-minter leg of a burn. The minter relays it to its admin when a custom payload is
/// attached, which is how a synthetic warp route learns about outbound transfers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JettonBurnNotification {
    pub amount: u128,
    pub sender: Address,
    pub response_destination: Option<Address>,
    pub custom_payload: Option<ArcCell>,
}

impl CellCodec for JettonBurnNotification {
    const KIND: &'static str = "jetton burn notification";

    fn store(&self, builder: &mut CellBuilder) -> Result<(), TonCellError> {
        builder.store_coins_u128(self.amount)?;
        builder.store_account(Some(&self.sender))?;
        builder.store_account(self.response_destination.as_ref())?;
        store_payload_cell(builder, self.custom_payload.as_ref())
    }

    fn load(parser: &mut CellParser) -> Result<Self, TonCellError> {
        Ok(JettonBurnNotification {
            amount: parser.load_coins_u128()?,
            sender: parser.load_required_account()?,
            response_destination: parser.load_account()?,
            custom_payload: parser.load_optional_ref()?,
        })
    }
}

request!(JettonBurnNotification, OpCode::JettonBurnNotification);

/// Admin-only: credit `amount` new tokens to the wallet of `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JettonMint {
    pub to: Address,
    pub amount: u128,
    pub forward_ton_amount: u128,
    pub response_destination: Option<Address>,
}

impl CellCodec for JettonMint {
    const KIND: &'static str = "jetton mint";

    fn store(&self, builder: &mut CellBuilder) -> Result<(), TonCellError> {
        builder.store_account(Some(&self.to))?;
        builder.store_coins_u128(self.amount)?;
        builder.store_coins_u128(self.forward_ton_amount)?;
        builder.store_account(self.response_destination.as_ref())?;
        Ok(())
    }

    fn load(parser: &mut CellParser) -> Result<Self, TonCellError> {
        Ok(JettonMint {
            to: parser.load_required_account()?,
            amount: parser.load_coins_u128()?,
            forward_ton_amount: parser.load_coins_u128()?,
            response_destination: parser.load_account()?,
        })
    }
}

request!(JettonMint, OpCode::JettonMint);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JettonTopUp;

impl CellCodec for JettonTopUp {
    const KIND: &'static str = "jetton top up";

    fn store(&self, _: &mut CellBuilder) -> Result<(), TonCellError> {
        Ok(())
    }

    fn load(_: &mut CellParser) -> Result<Self, TonCellError> {
        Ok(JettonTopUp)
    }
}

request!(JettonTopUp, OpCode::JettonTopUp);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JettonChangeAdmin {
    pub admin: Address,
}

impl CellCodec for JettonChangeAdmin {
    const KIND: &'static str = "jetton change admin";

    fn store(&self, builder: &mut CellBuilder) -> Result<(), TonCellError> {
        builder.store_account(Some(&self.admin))?;
        Ok(())
    }

    fn load(parser: &mut CellParser) -> Result<Self, TonCellError> {
        Ok(JettonChangeAdmin {
            admin: parser.load_required_account()?,
        })
    }
}

request!(JettonChangeAdmin, OpCode::JettonChangeAdmin);
