use std::collections::{HashMap, HashSet};

use error_stack::{report, ResultExt};
use hyperlane_ton_api::msg::{load_payload, Announce};
use hyperlane_ton_api::{ExitCode, OpCode, Tag};
use hyperlane_ton_std::read_header;
use ton_sandbox::{Context, Contract, ContractError, Response};
use ton_utils::{Cell, FnExt, B256};

use crate::msg::InstantiateMsg;
use crate::state::Config;

mod execute;
mod query;

#[derive(Clone, Debug)]
pub struct ValidatorAnnounce {
    config: Config,
    /// Validators in the order of their first announcement.
    validators: Vec<B256>,
    storage_locations: HashMap<B256, Vec<String>>,
    replay_protection: HashSet<B256>,
}

impl ValidatorAnnounce {
    pub fn instantiate(msg: InstantiateMsg) -> Self {
        Self {
            config: Config {
                mailbox: msg.mailbox,
                local_domain: msg.local_domain,
            },
            validators: vec![],
            storage_locations: HashMap::new(),
            replay_protection: HashSet::new(),
        }
    }

    fn execute(&mut self, ctx: &Context, body: &Cell) -> error_stack::Result<Response, ExitCode> {
        let mut parser = body.parser();
        let Some(header) = read_header(&mut parser)? else {
            return Ok(Response::new());
        };

        match header.tag {
            Tag::Request(OpCode::Announce) => {
                let request = load_payload::<Announce>(&mut parser)?;
                self.announce(ctx, header.query_id, request)
            }
            tag => Err(report!(ExitCode::UnknownOpcode))
                .attach_printable_lazy(|| format!("unexpected message {tag:?}")),
        }
        .attach_printable_lazy(|| format!("validator announce at {}", ctx.address))?
        .then(Ok)
    }
}

impl Contract for ValidatorAnnounce {
    fn receive(&mut self, ctx: &Context, body: &Cell) -> Result<Response, ContractError> {
        self.execute(ctx, body).map_err(ContractError::from)
    }
}
