use std::collections::HashSet;

use error_stack::{report, ResultExt};
use hyperlane_ton_api::msg::{load_payload, PostDispatch, SetAuthorizedHook, TransferOwnership};
use hyperlane_ton_api::{ExitCode, OpCode, Tag};
use hyperlane_ton_std::{read_header, Ownership};
use ton_sandbox::{Context, Contract, ContractError, Response};
use ton_utils::{Address, Cell, FnExt};

use crate::msg::InstantiateMsg;
use crate::state::Config;
use crate::tree::IncrementalMerkleTree;

mod execute;
mod query;

pub use query::TreeSnapshot;

#[derive(Clone, Debug)]
pub struct MerkleTreeHook {
    config: Config,
    ownership: Ownership,
    authorized_hooks: HashSet<Address>,
    tree: IncrementalMerkleTree,
}

impl MerkleTreeHook {
    pub fn instantiate(msg: InstantiateMsg) -> Self {
        Self {
            config: Config {
                mailbox: msg.mailbox,
            },
            ownership: Ownership::new(msg.owner),
            authorized_hooks: HashSet::new(),
            tree: IncrementalMerkleTree::default(),
        }
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
            Tag::Request(OpCode::SetAuthorizedHook) => {
                let request = load_payload::<SetAuthorizedHook>(&mut parser)?;
                self.set_authorized_hook(ctx, request)
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
        .attach_printable_lazy(|| format!("merkle tree hook at {}", ctx.address))?
        .then(Ok)
    }
}

impl Contract for MerkleTreeHook {
    fn receive(&mut self, ctx: &Context, body: &Cell) -> Result<Response, ContractError> {
        self.execute(ctx, body).map_err(ContractError::from)
    }
}
