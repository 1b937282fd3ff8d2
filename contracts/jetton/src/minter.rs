use error_stack::{report, ResultExt};
use hyperlane_ton_api::jetton::{JettonBurnNotification, JettonChangeAdmin, JettonMint};
use hyperlane_ton_api::msg::load_payload;
use hyperlane_ton_api::{ExitCode, OpCode, Tag};
use hyperlane_ton_std::read_header;
use ton_sandbox::{Context, Contract, ContractError, Response};
use ton_utils::{Address, Cell, FnExt};

use crate::msg::InstantiateMsg;

mod execute;
mod query;

#[derive(Clone, Debug)]
pub struct JettonMinter {
    admin: Address,
    total_supply: u128,
}

impl JettonMinter {
    pub fn instantiate(msg: InstantiateMsg) -> Self {
        Self {
            admin: msg.admin,
            total_supply: 0,
        }
    }

    fn execute(&mut self, ctx: &Context, body: &Cell) -> error_stack::Result<Response, ExitCode> {
        let mut parser = body.parser();
        let Some(header) = read_header(&mut parser)? else {
            return Ok(Response::new());
        };

        match header.tag {
            Tag::Request(OpCode::JettonMint) => {
                let request = load_payload::<JettonMint>(&mut parser)?;
                self.mint(ctx, header.query_id, request)
            }
            Tag::Request(OpCode::JettonBurnNotification) => {
                let request = load_payload::<JettonBurnNotification>(&mut parser)?;
                self.burn_notification(ctx, header.query_id, request)
            }
            Tag::Request(OpCode::JettonChangeAdmin) => {
                let request = load_payload::<JettonChangeAdmin>(&mut parser)?;
                self.change_admin(ctx, request)
            }
            Tag::Request(OpCode::JettonTopUp) => Ok(Response::new()),
            tag => Err(report!(ExitCode::UnknownOpcode))
                .attach_printable_lazy(|| format!("unexpected message {tag:?}")),
        }
        .attach_printable_lazy(|| format!("jetton minter at {}", ctx.address))?
        .then(Ok)
    }
}

impl Contract for JettonMinter {
    fn receive(&mut self, ctx: &Context, body: &Cell) -> Result<Response, ContractError> {
        self.execute(ctx, body).map_err(ContractError::from)
    }
}
