use std::collections::{HashMap, HashSet, VecDeque};

use error_stack::{report, ResultExt};
use hyperlane_ton_api::msg::{
    load_payload, Answer, Bounced, Dispatch, IsmAddress, Process, SetDefaultHook, SetDefaultIsm,
    SetRequiredHook, TransferOwnership,
};
use hyperlane_ton_api::{ExitCode, OpCode, Tag};
use hyperlane_ton_std::{read_header, Ownership};
use ton_sandbox::{Context, Contract, ContractError, Response};
use ton_utils::{Address, Cell, FnExt, B256};

use crate::msg::InstantiateMsg;
use crate::state::{Config, PendingDelivery, PendingDispatch, PendingProcess};

mod dispatch;
mod execute;
mod process;
mod query;

#[derive(Clone, Debug)]
pub struct Mailbox {
    config: Config,
    ownership: Ownership,
    /// Nonce the next committed dispatch gets.
    nonce: u32,
    latest_dispatched_id: B256,
    default_ism: Address,
    default_hook: Address,
    required_hook: Address,
    delivered: HashSet<B256>,
    /// The front entry is the one in flight, the others wait their turn.
    dispatches: VecDeque<PendingDispatch>,
    processes: HashMap<u64, PendingProcess>,
    deliveries: HashMap<u64, PendingDelivery>,
    next_query_id: u64,
}

impl Mailbox {
    pub fn instantiate(msg: InstantiateMsg) -> Self {
        Self {
            config: Config {
                version: msg.version,
                local_domain: msg.local_domain,
            },
            ownership: Ownership::new(msg.owner),
            nonce: msg.initial_nonce,
            latest_dispatched_id: B256::ZERO,
            default_ism: msg.default_ism,
            default_hook: msg.default_hook,
            required_hook: msg.required_hook,
            delivered: HashSet::new(),
            dispatches: VecDeque::new(),
            processes: HashMap::new(),
            deliveries: HashMap::new(),
            next_query_id: 0,
        }
    }

    /// Query id of an outgoing call, unique for the lifetime of the mailbox.
    fn allocate_query_id(&mut self) -> u64 {
        let query_id = self.next_query_id;
        self.next_query_id = self.next_query_id.wrapping_add(1);
        query_id
    }

    fn execute(&mut self, ctx: &Context, body: &Cell) -> error_stack::Result<Response, ExitCode> {
        let mut parser = body.parser();
        let Some(header) = read_header(&mut parser)? else {
            return Ok(Response::new());
        };

        match header.tag {
            Tag::Request(OpCode::Dispatch) => {
                let request = load_payload::<Dispatch>(&mut parser)?;
                self.dispatch(ctx, header.query_id, request)
            }
            Tag::Answer(op @ (OpCode::PostDispatchRequired | OpCode::PostDispatchDefault)) => {
                let result = Answer::<()>::load_result(&mut parser)
                    .change_context(ExitCode::CellUnderflow)?;
                self.hook_answered(ctx, op, header.query_id, result)
            }
            Tag::Request(OpCode::Process) => {
                let request = load_payload::<Process>(&mut parser)?;
                self.process(ctx, header.query_id, request)
            }
            Tag::Answer(OpCode::GetIsm) => {
                let result = Answer::<IsmAddress>::load_result(&mut parser)
                    .change_context(ExitCode::CellUnderflow)?;
                self.ism_answered(ctx, header.query_id, result)
            }
            Tag::Answer(OpCode::Verify) => {
                let result = Answer::<()>::load_result(&mut parser)
                    .change_context(ExitCode::CellUnderflow)?;
                self.verify_answered(ctx, header.query_id, result)
            }
            Tag::Answer(OpCode::Handle) => {
                let result = Answer::<()>::load_result(&mut parser)
                    .change_context(ExitCode::CellUnderflow)?;
                self.handle_answered(ctx, header.query_id, result)
            }
            Tag::Request(OpCode::SetDefaultIsm) => {
                let request = load_payload::<SetDefaultIsm>(&mut parser)?;
                self.set_default_ism(ctx, request)
            }
            Tag::Request(OpCode::SetDefaultHook) => {
                let request = load_payload::<SetDefaultHook>(&mut parser)?;
                self.set_default_hook(ctx, request)
            }
            Tag::Request(OpCode::SetRequiredHook) => {
                let request = load_payload::<SetRequiredHook>(&mut parser)?;
                self.set_required_hook(ctx, request)
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
        .attach_printable_lazy(|| format!("mailbox at {}", ctx.address))?
        .then(Ok)
    }

    fn bounce(&mut self, ctx: &Context, body: &Cell) -> error_stack::Result<Response, ExitCode> {
        let bounced = Bounced::from_body(body).change_context(ExitCode::CellUnderflow)?;
        let query_id = bounced.query_id;

        match bounced.tag {
            Tag::Request(op @ (OpCode::PostDispatchRequired | OpCode::PostDispatchDefault)) => {
                self.hook_answered(ctx, op, query_id, Err(ExitCode::CallBounced))
            }
            Tag::Request(OpCode::GetIsm) => {
                self.ism_answered(ctx, query_id, Err(ExitCode::CallBounced))
            }
            Tag::Request(OpCode::Verify) => {
                self.verify_answered(ctx, query_id, Err(ExitCode::CallBounced))
            }
            Tag::Request(OpCode::Handle) => {
                self.handle_answered(ctx, query_id, Err(ExitCode::CallBounced))
            }
            _ => Ok(Response::new()),
        }
    }
}

impl Contract for Mailbox {
    fn receive(&mut self, ctx: &Context, body: &Cell) -> Result<Response, ContractError> {
        self.execute(ctx, body).map_err(ContractError::from)
    }

    fn on_bounce(&mut self, ctx: &Context, body: &Cell) -> Result<Response, ContractError> {
        self.bounce(ctx, body).map_err(ContractError::from)
    }
}
