use error_stack::{report, Result, ResultExt};
use hyperlane_ton_api::msg::{Answer, Dispatch, Dispatched, PostDispatch};
use hyperlane_ton_api::{CellCodec, ExitCode, Message, OpCode};
use hyperlane_ton_std::{answer, send};
use ton_sandbox::{Context, OutMessage, Response, SendValue};
use ton_utils::cell_to_boc_hex;
use tracing::{debug, info, warn};

use super::Mailbox;
use crate::events::Event;
use crate::state::{DispatchStage, HookStep, PendingDispatch};

impl Mailbox {
    /// Queues a dispatch. Dispatches run one at a time, so a nonce is only handed out once every
    /// hook of the previous dispatch has answered.
    pub(super) fn dispatch(
        &mut self,
        ctx: &Context,
        query_id: u64,
        request: Dispatch,
    ) -> Result<Response, ExitCode> {
        self.dispatches.push_back(PendingDispatch {
            caller: ctx.sender,
            caller_query_id: query_id,
            value: ctx.value,
            request,
            stage: DispatchStage::Queued,
        });

        if self.dispatches.len() > 1 {
            debug!(
                mailbox = %ctx.address,
                caller = %ctx.sender,
                queued = self.dispatches.len(),
                "dispatch queued"
            );
            return Ok(Response::new());
        }

        Ok(Response::new().add_messages(self.start_next_dispatch()?))
    }

    /// A hook answered, or bounced, the call of the dispatch in flight.
    pub(super) fn hook_answered(
        &mut self,
        ctx: &Context,
        op: OpCode,
        query_id: u64,
        result: std::result::Result<(), ExitCode>,
    ) -> Result<Response, ExitCode> {
        let (step, message) = match self.dispatches.front().map(|pending| &pending.stage) {
            Some(DispatchStage::AwaitingHook {
                step,
                hook,
                query_id: awaited,
                message,
            }) if step.op() == op && *awaited == query_id && *hook == ctx.sender => {
                (*step, message.clone())
            }
            stage => {
                return Err(report!(ExitCode::UnauthorizedSender)).attach_printable_lazy(|| {
                    format!("unexpected {op} answer {query_id} from {}, dispatch stage {stage:?}", ctx.sender)
                })
            }
        };

        match (result, step) {
            (Err(code), _) => {
                warn!(mailbox = %ctx.address, hook = %ctx.sender, %code, "dispatch hook failed");
                self.finish_dispatch(ctx, Err(code))
            }
            (Ok(()), HookStep::Required) => Ok(Response::new().add_message(self.call_hook(
                HookStep::Default,
                message,
                SendValue::Amount(ctx.value),
            )?)),
            (Ok(()), HookStep::Default) => self.finish_dispatch(ctx, Ok(message)),
        }
    }

    /// Starts the queued dispatch at the front, if there is one.
    fn start_next_dispatch(&mut self) -> Result<Option<OutMessage>, ExitCode> {
        let Some(pending) = self.dispatches.front() else {
            return Ok(None);
        };

        let message = Message {
            version: self.config.version,
            nonce: self.nonce,
            origin: self.config.local_domain,
            sender: pending.caller.hash,
            destination: pending.request.destination,
            recipient: pending.request.recipient,
            body: pending.request.body.clone(),
        };
        let value = SendValue::Amount(pending.value);

        self.call_hook(HookStep::Required, message, value).map(Some)
    }

    fn call_hook(
        &mut self,
        step: HookStep,
        message: Message,
        value: SendValue,
    ) -> Result<OutMessage, ExitCode> {
        let hook = match step {
            HookStep::Required => self.required_hook,
            HookStep::Default => self.default_hook,
        };
        let query_id = self.allocate_query_id();

        let pending = self
            .dispatches
            .front_mut()
            .ok_or_else(|| report!(ExitCode::UnknownSubOp))
            .attach_printable("no dispatch in flight")?;
        let request = PostDispatch {
            message: message.clone(),
            hook_metadata: pending.request.hook_metadata.clone(),
        };
        pending.stage = DispatchStage::AwaitingHook {
            step,
            hook,
            query_id,
            message,
        };

        send(hook, step.op(), query_id, &request, value)
    }

    /// Answers the caller of the dispatch in flight and starts the next one. The nonce and the
    /// latest dispatched id only change when every hook succeeded.
    fn finish_dispatch(
        &mut self,
        ctx: &Context,
        outcome: std::result::Result<Message, ExitCode>,
    ) -> Result<Response, ExitCode> {
        let pending = self
            .dispatches
            .pop_front()
            .ok_or_else(|| report!(ExitCode::UnknownSubOp))
            .attach_printable("no dispatch in flight")?;
        let returned = SendValue::Amount(ctx.value);

        let response = match outcome {
            Ok(message) => {
                let message_id = message.id();
                let encoded = message
                    .to_cell()
                    .change_context(ExitCode::CellOverflow)
                    .and_then(|cell| {
                        cell_to_boc_hex(&cell)
                            .map_err(|err| report!(ExitCode::CellOverflow).attach_printable(err))
                    })?;

                self.nonce = message
                    .nonce
                    .checked_add(1)
                    .ok_or_else(|| report!(ExitCode::CellOverflow))
                    .attach_printable("nonce space exhausted")?;
                self.latest_dispatched_id = message_id;

                info!(
                    mailbox = %ctx.address,
                    nonce = message.nonce,
                    %message_id,
                    destination = message.destination,
                    "dispatch committed"
                );

                let dispatched = Dispatched {
                    nonce: message.nonce,
                    message_id,
                };
                Response::new()
                    .add_message(answer(
                        pending.caller,
                        &Answer::ok(OpCode::Dispatch, pending.caller_query_id, dispatched),
                        returned,
                    )?)
                    .add_event(Event::Dispatch {
                        sender: pending.caller,
                        destination: message.destination,
                        recipient: message.recipient,
                        message: encoded,
                    })
                    .add_event(Event::DispatchId { message_id })
            }
            Err(code) => Response::new().add_message(answer(
                pending.caller,
                &Answer::<Dispatched>::failed(OpCode::Dispatch, pending.caller_query_id, code),
                returned,
            )?),
        };

        Ok(response.add_messages(self.start_next_dispatch()?))
    }
}
