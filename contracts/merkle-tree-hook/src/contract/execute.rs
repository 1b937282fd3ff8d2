use error_stack::{ensure, Result};
use hyperlane_ton_api::msg::{Answer, PostDispatch, SetAuthorizedHook};
use hyperlane_ton_api::{ExitCode, OpCode};
use hyperlane_ton_std::answer;
use ton_sandbox::{Context, Response, SendValue};
use tracing::info;

use super::MerkleTreeHook;
use crate::events::Event;

impl MerkleTreeHook {
    /// Commits the message id as the next leaf and returns the inbound value with the answer.
    pub(super) fn post_dispatch(
        &mut self,
        ctx: &Context,
        op: OpCode,
        query_id: u64,
        request: PostDispatch,
    ) -> Result<Response, ExitCode> {
        ensure!(
            ctx.sender == self.config.mailbox || self.authorized_hooks.contains(&ctx.sender),
            ExitCode::UnauthorizedSender
        );

        let message_id = request.message.id();
        let index = self.tree.insert(message_id)?;
        info!(hook = %ctx.address, %message_id, index, "message inserted into tree");

        let reply = answer(
            ctx.sender,
            &Answer::ok(op, query_id, ()),
            SendValue::RemainingInbound,
        )?;

        Ok(Response::new()
            .add_event(Event::InsertedIntoTree { message_id, index })
            .add_message(reply))
    }

    pub(super) fn set_authorized_hook(
        &mut self,
        ctx: &Context,
        request: SetAuthorizedHook,
    ) -> Result<Response, ExitCode> {
        self.ownership.ensure_owner(ctx)?;

        let SetAuthorizedHook { hook, authorized } = request;
        let event = if authorized {
            self.authorized_hooks.insert(hook);
            Event::HookAuthorized { hook }
        } else {
            self.authorized_hooks.remove(&hook);
            Event::HookUnauthorized { hook }
        };

        Ok(Response::new().add_event(event))
    }
}
