use error_stack::{report, ResultExt};
use hyperlane_ton_api::jetton::{JettonBurn, JettonInternalTransfer, JettonTransfer};
use hyperlane_ton_api::msg::load_payload;
use hyperlane_ton_api::{ExitCode, OpCode, Tag};
use hyperlane_ton_std::read_header;
use ton_sandbox::{Context, Contract, ContractError, Response};
use ton_utils::{Address, Cell, FnExt};

mod execute;
mod query;

/// Balance of one holder. Deployed by the minter or by a sibling wallet on first credit.
#[derive(Clone, Debug)]
pub struct JettonWallet {
    owner: Address,
    minter: Address,
    balance: u128,
}

impl JettonWallet {
    pub fn new(owner: Address, minter: Address) -> Self {
        Self {
            owner,
            minter,
            balance: 0,
        }
    }

    fn execute(&mut self, ctx: &Context, body: &Cell) -> error_stack::Result<Response, ExitCode> {
        let mut parser = body.parser();
        let Some(header) = read_header(&mut parser)? else {
            return Ok(Response::new());
        };

        match header.tag {
            Tag::Request(OpCode::JettonTransfer) => {
                let request = load_payload::<JettonTransfer>(&mut parser)?;
                self.transfer(ctx, header.query_id, request)
            }
            Tag::Request(OpCode::JettonInternalTransfer) => {
                let request = load_payload::<JettonInternalTransfer>(&mut parser)?;
                self.internal_transfer(ctx, header.query_id, request)
            }
            Tag::Request(OpCode::JettonBurn) => {
                let request = load_payload::<JettonBurn>(&mut parser)?;
                self.burn(ctx, header.query_id, request)
            }
            Tag::Request(OpCode::JettonExcesses) => Ok(Response::new()),
            tag => Err(report!(ExitCode::UnknownOpcode))
                .attach_printable_lazy(|| format!("unexpected message {tag:?}")),
        }
        .attach_printable_lazy(|| format!("jetton wallet at {}", ctx.address))?
        .then(Ok)
    }
}

impl Contract for JettonWallet {
    fn receive(&mut self, ctx: &Context, body: &Cell) -> Result<Response, ContractError> {
        self.execute(ctx, body).map_err(ContractError::from)
    }

    fn on_bounce(&mut self, ctx: &Context, body: &Cell) -> Result<Response, ContractError> {
        self.bounced(ctx, body).map_err(ContractError::from)
    }
}
