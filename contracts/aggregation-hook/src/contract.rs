use std::collections::HashMap;

use error_stack::{report, ResultExt};
use hyperlane_ton_api::msg::{load_payload, Answer, Bounced, PostDispatch};
use hyperlane_ton_api::{ExitCode, OpCode, Tag};
use hyperlane_ton_std::read_header;
use ton_sandbox::{Context, Contract, ContractError, Response};
use ton_utils::{Address, Cell, FnExt};

use crate::msg::InstantiateMsg;
use crate::state::PendingRequest;

mod execute;
mod query;

#[derive(Clone, Debug)]
pub struct AggregationHook {
    hooks: Vec<Address>,
    requests: HashMap<u64, PendingRequest>,
    next_request_id: u64,
}

impl AggregationHook {
    pub fn instantiate(msg: InstantiateMsg) -> Self {
        Self {
            hooks: msg.hooks,
            requests: HashMap::new(),
            next_request_id: 0,
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
            Tag::Answer(OpCode::PostDispatch) => {
                let result = Answer::<()>::load_result(&mut parser)
                    .change_context(ExitCode::CellUnderflow)?;
                self.hook_answered(ctx, header.query_id, result)
            }
            tag => Err(report!(ExitCode::UnknownOpcode))
                .attach_printable_lazy(|| format!("unexpected message {tag:?}")),
        }
        .attach_printable_lazy(|| format!("aggregation hook at {}", ctx.address))?
        .then(Ok)
    }

    fn bounce(&mut self, ctx: &Context, body: &Cell) -> error_stack::Result<Response, ExitCode> {
        let bounced = Bounced::from_body(body).change_context(ExitCode::CellUnderflow)?;

        match bounced.tag {
            Tag::Request(OpCode::PostDispatch) => {
                self.hook_answered(ctx, bounced.query_id, Err(ExitCode::CallBounced))
            }
            _ => Ok(Response::new()),
        }
    }
}

impl Contract for AggregationHook {
    fn receive(&mut self, ctx: &Context, body: &Cell) -> Result<Response, ContractError> {
        self.execute(ctx, body).map_err(ContractError::from)
    }

    fn on_bounce(&mut self, ctx: &Context, body: &Cell) -> Result<Response, ContractError> {
        self.bounce(ctx, body).map_err(ContractError::from)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_ok::assert_ok;
    use hyperlane_ton_api::msg::{encode_body, Header, Request};
    use hyperlane_ton_api::{Message, MAILBOX_VERSION};
    use ton_sandbox::{bounce_body, OutMessage, SendValue};
    use ton_utils::{buffer_to_cell, B256};

    use super::*;
    use crate::fan_out::FanOut;

    fn caller() -> Address {
        Address::derived("mailbox")
    }

    fn sub_hooks() -> Vec<Address> {
        vec![
            Address::derived("protocol-fee-hook"),
            Address::derived("merkle-tree-hook"),
        ]
    }

    fn ctx(sender: Address) -> Context {
        Context {
            address: Address::derived("aggregation-hook"),
            sender,
            value: 1_000,
            balance: 1_000,
            lt: 1,
        }
    }

    fn post() -> PostDispatch {
        PostDispatch {
            message: Message {
                version: MAILBOX_VERSION,
                nonce: 2,
                origin: 0,
                sender: B256::ZERO,
                destination: 0,
                recipient: B256::ZERO,
                body: Arc::new(buffer_to_cell(&123u32.to_be_bytes()).unwrap()),
            },
            hook_metadata: None,
        }
    }

    fn header(message: &OutMessage) -> Header {
        Header::load(&mut message.body.parser()).unwrap()
    }

    fn hook_answer(query_id: u64, result: std::result::Result<(), ExitCode>) -> Cell {
        Answer {
            op: OpCode::PostDispatch,
            query_id,
            result,
        }
        .to_body()
        .unwrap()
    }

    #[test_log::test]
    fn sub_hooks_are_called_one_after_another() {
        let hooks = sub_hooks();
        let mut hook = AggregationHook::instantiate(InstantiateMsg {
            hooks: hooks.clone(),
        });

        let body = encode_body(OpCode::PostDispatchRequired, 9, &post()).unwrap();
        let response = assert_ok!(hook.receive(&ctx(caller()), &body));
        assert_eq!(response.messages.len(), 1);
        let first = &response.messages[0];
        assert_eq!(first.to, hooks[0]);
        assert_eq!(first.value, SendValue::RemainingInbound);
        assert_eq!(header(first).tag, Tag::Request(OpCode::PostDispatch));
        let request_id = header(first).query_id;
        assert_eq!(hook.request_state(request_id), Some(FanOut::AwaitingHook(0)));

        let response = assert_ok!(hook.receive(&ctx(hooks[0]), &hook_answer(request_id, Ok(()))));
        assert_eq!(response.messages.len(), 1);
        assert_eq!(response.messages[0].to, hooks[1]);
        assert_eq!(hook.request_state(request_id), Some(FanOut::AwaitingHook(1)));

        let response = assert_ok!(hook.receive(&ctx(hooks[1]), &hook_answer(request_id, Ok(()))));
        let reply = &response.messages[0];
        assert_eq!(reply.to, caller());
        assert_eq!(
            assert_ok!(Answer::<()>::from_body(&reply.body)),
            Answer::ok(OpCode::PostDispatchRequired, 9, ())
        );
        assert_eq!(hook.pending_requests(), 0);
    }

    #[test]
    fn failing_sub_hook_stops_the_fan_out() {
        let hooks = sub_hooks();
        let mut hook = AggregationHook::instantiate(InstantiateMsg {
            hooks: hooks.clone(),
        });
        assert_ok!(hook.receive(&ctx(caller()), &post().to_body(4).unwrap()));

        let response = assert_ok!(hook.receive(
            &ctx(hooks[0]),
            &hook_answer(0, Err(ExitCode::InsufficientProtocolFee))
        ));

        assert_eq!(response.messages.len(), 1);
        let reply = &response.messages[0];
        assert_eq!(reply.to, caller());
        assert_eq!(
            assert_ok!(Answer::<()>::from_body(&reply.body)).result,
            Err(ExitCode::InsufficientProtocolFee)
        );
        assert_eq!(response.events[0].ty, "sub_hook_failed");
        assert_eq!(hook.pending_requests(), 0);

        let err = hook
            .receive(&ctx(hooks[1]), &hook_answer(0, Ok(())))
            .unwrap_err();
        assert_eq!(err.exit_code, i32::from(ExitCode::UnauthorizedSender));
    }

    #[test]
    fn answers_from_the_wrong_hook_are_rejected() {
        let hooks = sub_hooks();
        let mut hook = AggregationHook::instantiate(InstantiateMsg {
            hooks: hooks.clone(),
        });
        assert_ok!(hook.receive(&ctx(caller()), &post().to_body(0).unwrap()));

        let err = hook
            .receive(&ctx(hooks[1]), &hook_answer(0, Ok(())))
            .unwrap_err();

        assert_eq!(err.exit_code, i32::from(ExitCode::UnauthorizedSender));
        assert_eq!(hook.request_state(0), Some(FanOut::AwaitingHook(0)));
    }

    #[test]
    fn bounced_sub_hook_call_fails_the_request() {
        let hooks = sub_hooks();
        let mut hook = AggregationHook::instantiate(InstantiateMsg {
            hooks: hooks.clone(),
        });
        let response = assert_ok!(hook.receive(&ctx(caller()), &post().to_body(0).unwrap()));
        let bounced = bounce_body(&response.messages[0].body).unwrap();

        let response = assert_ok!(hook.on_bounce(&ctx(hooks[0]), &bounced));

        assert_eq!(
            assert_ok!(Answer::<()>::from_body(&response.messages[0].body)).result,
            Err(ExitCode::CallBounced)
        );
        assert_eq!(hook.pending_requests(), 0);
    }

    #[test]
    fn without_sub_hooks_the_caller_is_answered_at_once() {
        let mut hook = AggregationHook::instantiate(InstantiateMsg { hooks: vec![] });

        let response = assert_ok!(hook.receive(&ctx(caller()), &post().to_body(1).unwrap()));

        assert_eq!(response.messages[0].to, caller());
        assert!(assert_ok!(Answer::<()>::from_body(&response.messages[0].body)).is_ok());
    }
}
