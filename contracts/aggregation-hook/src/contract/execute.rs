use error_stack::{ensure, report, Result, ResultExt};
use hyperlane_ton_api::msg::{Answer, PostDispatch};
use hyperlane_ton_api::{ExitCode, OpCode};
use hyperlane_ton_std::{answer, send};
use ton_sandbox::{Context, Response, SendValue};
use tracing::{info, warn};

use super::AggregationHook;
use crate::events::Event;
use crate::fan_out::{FanOut, Input};
use crate::state::PendingRequest;

impl AggregationHook {
    /// Opens a new fan-out for the caller. The inbound value travels from sub-hook to sub-hook and
    /// whatever is left returns to the caller with the answer.
    pub(super) fn post_dispatch(
        &mut self,
        ctx: &Context,
        op: OpCode,
        query_id: u64,
        request: PostDispatch,
    ) -> Result<Response, ExitCode> {
        let request_id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);

        self.requests.insert(
            request_id,
            PendingRequest {
                caller: ctx.sender,
                caller_op: op,
                caller_query_id: query_id,
                request,
                state: FanOut::Idle,
            },
        );

        self.advance(ctx, request_id, Input::Start)
    }

    /// A sub-hook answered or bounced the call for `request_id`.
    pub(super) fn hook_answered(
        &mut self,
        ctx: &Context,
        request_id: u64,
        result: std::result::Result<(), ExitCode>,
    ) -> Result<Response, ExitCode> {
        let state = self
            .requests
            .get(&request_id)
            .map(|pending| pending.state)
            .ok_or_else(|| report!(ExitCode::UnauthorizedSender))
            .attach_printable_lazy(|| format!("no pending request {request_id}"))?;

        let awaited = match state {
            FanOut::AwaitingHook(index) => self.hooks.get(index),
            _ => None,
        };
        ensure!(awaited == Some(&ctx.sender), ExitCode::UnauthorizedSender);

        let input = match result {
            Ok(()) => Input::HookSucceeded,
            Err(code) => {
                warn!(hook = %ctx.sender, request_id, %code, "sub-hook failed");
                Input::HookFailed(code)
            }
        };

        self.advance(ctx, request_id, input)
    }

    fn advance(
        &mut self,
        ctx: &Context,
        request_id: u64,
        input: Input,
    ) -> Result<Response, ExitCode> {
        let hooks = self.hooks.len();
        let pending = self
            .requests
            .get_mut(&request_id)
            .ok_or_else(|| report!(ExitCode::UnauthorizedSender))?;

        let state = pending
            .state
            .next(hooks, input)
            .ok_or_else(|| report!(ExitCode::UnknownSubOp))
            .attach_printable_lazy(|| format!("{input:?} in state {:?}", pending.state))?;
        pending.state = state;

        let response = match state {
            FanOut::AwaitingHook(index) => {
                let hook = self
                    .hooks
                    .get(index)
                    .copied()
                    .ok_or_else(|| report!(ExitCode::UnknownSubOp))?;

                Response::new().add_message(send(
                    hook,
                    OpCode::PostDispatch,
                    request_id,
                    &pending.request,
                    SendValue::RemainingInbound,
                )?)
            }
            FanOut::Done => {
                info!(hook = %ctx.address, request_id, "all sub-hooks succeeded");

                Response::new().add_message(answer(
                    pending.caller,
                    &Answer::ok(pending.caller_op, pending.caller_query_id, ()),
                    SendValue::RemainingInbound,
                )?)
            }
            FanOut::Failed(code) => Response::new()
                .add_message(answer(
                    pending.caller,
                    &Answer::<()>::failed(pending.caller_op, pending.caller_query_id, code),
                    SendValue::RemainingInbound,
                )?)
                .add_event(Event::SubHookFailed {
                    request_id,
                    hook: ctx.sender,
                    exit_code: code,
                }),
            FanOut::Idle => return Err(report!(ExitCode::UnknownSubOp)),
        };

        if state.is_terminal() {
            self.requests.remove(&request_id);
        }

        Ok(response)
    }
}
