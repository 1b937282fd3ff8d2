use error_stack::{ensure, report, ResultExt};
use hyperlane_ton_api::msg::{
    load_payload, CollectProtocolFee, PostDispatch, SetBeneficiary, SetProtocolFee,
    TransferOwnership,
};
use hyperlane_ton_api::{ExitCode, OpCode, Tag};
use hyperlane_ton_std::{read_header, Ownership};
use ton_sandbox::{Context, Contract, ContractError, Response};
use ton_utils::{Cell, FnExt};

use crate::msg::InstantiateMsg;
use crate::state::{Config, FeeState};

mod execute;
mod query;

pub use query::HookData;

#[derive(Clone, Debug)]
pub struct ProtocolFeeHook {
    config: Config,
    ownership: Ownership,
    state: FeeState,
}

impl ProtocolFeeHook {
    pub fn instantiate(msg: InstantiateMsg) -> error_stack::Result<Self, ExitCode> {
        ensure!(
            msg.protocol_fee <= msg.max_protocol_fee,
            ExitCode::ExceedsMaxProtocolFee
        );

        Ok(Self {
            config: Config {
                max_protocol_fee: msg.max_protocol_fee,
            },
            ownership: Ownership::new(msg.owner),
            state: FeeState {
                protocol_fee: msg.protocol_fee,
                beneficiary: msg.beneficiary,
                collected: 0,
            },
        })
    }

    fn execute(&mut self, ctx: &Context, body: &Cell) -> error_stack::Result<Response, ExitCode> {
        let mut parser = body.parser();
        let Some(header) = read_header(&mut parser)? else {
            return Ok(Response::new());
        };

        match header.tag {
            Tag::Request(op) if op.is_post_dispatch() => {
                let request = load_payload::<PostDispatch>(&mut parser)?;
                self.post_dispatch(ctx, op, header.query_id, request)
            }
            Tag::Request(OpCode::SetProtocolFee) => {
                let request = load_payload::<SetProtocolFee>(&mut parser)?;
                self.set_protocol_fee(ctx, request.protocol_fee)
            }
            Tag::Request(OpCode::SetBeneficiary) => {
                let request = load_payload::<SetBeneficiary>(&mut parser)?;
                self.set_beneficiary(ctx, request.beneficiary)
            }
            Tag::Request(OpCode::CollectProtocolFee) => {
                load_payload::<CollectProtocolFee>(&mut parser)?;
                self.collect_protocol_fee(ctx)
            }
            Tag::Request(OpCode::TransferOwnership) => {
                let request = load_payload::<TransferOwnership>(&mut parser)?;
                self.ownership
                    .transfer(ctx, request.owner)
                    .map(|transferred| Response::new().add_event(transferred))
            }
            tag => Err(report!(ExitCode::UnknownOpcode))
                .attach_printable_lazy(|| format!("unexpected message {tag:?}")),
        }
        .attach_printable_lazy(|| format!("protocol fee hook at {}", ctx.address))?
        .then(Ok)
    }
}

impl Contract for ProtocolFeeHook {
    fn receive(&mut self, ctx: &Context, body: &Cell) -> Result<Response, ContractError> {
        self.execute(ctx, body).map_err(ContractError::from)
    }
}
