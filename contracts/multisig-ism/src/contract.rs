use std::collections::HashMap;

use error_stack::{report, ResultExt};
use hyperlane_ton_api::msg::{load_payload, SetValidatorsAndThreshold, TransferOwnership, Verify};
use hyperlane_ton_api::{Domain, ExitCode, OpCode, Tag};
use hyperlane_ton_std::{read_header, Ownership};
use ton_sandbox::{Context, Contract, ContractError, Response};
use ton_utils::{Cell, FnExt};

use crate::msg::InstantiateMsg;
use crate::state::ValidatorSet;

mod execute;
mod query;

#[derive(Clone, Debug)]
pub struct MultisigIsm {
    ownership: Ownership,
    validator_sets: HashMap<Domain, ValidatorSet>,
}

impl MultisigIsm {
    pub fn instantiate(msg: InstantiateMsg) -> Self {
        Self {
            ownership: Ownership::new(msg.owner),
            validator_sets: msg.validator_sets,
        }
    }

    fn execute(&mut self, ctx: &Context, body: &Cell) -> error_stack::Result<Response, ExitCode> {
        let mut parser = body.parser();
        let Some(header) = read_header(&mut parser)? else {
            return Ok(Response::new());
        };

        match header.tag {
            Tag::Request(OpCode::Verify) => {
                let request = load_payload::<Verify>(&mut parser)?;
                self.verify_request(ctx, header.query_id, request)
            }
            Tag::Request(OpCode::SetValidatorsAndThreshold) => {
                let request = load_payload::<SetValidatorsAndThreshold>(&mut parser)?;
                self.set_validators_and_threshold(ctx, request)
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
        .attach_printable_lazy(|| format!("multisig ism at {}", ctx.address))?
        .then(Ok)
    }
}

impl Contract for MultisigIsm {
    fn receive(&mut self, ctx: &Context, body: &Cell) -> Result<Response, ContractError> {
        self.execute(ctx, body).map_err(ContractError::from)
    }
}
