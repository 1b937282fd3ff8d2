use std::collections::HashMap;

use error_stack::{report, ResultExt};
use hyperlane_ton_api::jetton::{JettonBurnNotification, JettonTransferNotification};
use hyperlane_ton_api::msg::{
    load_payload, Answer, Bounced, Dispatched, Handle, SetIsm, SetRouter, TransferOwnership,
    TransferRemote,
};
use hyperlane_ton_api::{Domain, ExitCode, OpCode, Tag};
use hyperlane_ton_std::{read_header, Ownership};
use ton_sandbox::{Context, Contract, ContractError, Response};
use ton_utils::{Address, Cell, FnExt, B256};
use tracing::debug;

use crate::msg::InstantiateMsg;
use crate::state::{Config, PendingCredit, PendingTransfer};

mod execute;
mod query;
mod settlement;

#[derive(Clone, Debug)]
pub struct TokenRouter {
    config: Config,
    ownership: Ownership,
    ism: Option<Address>,
    routers: HashMap<Domain, B256>,
    next_query_id: u64,
    /// Outbound transfers by the query id of their DISPATCH.
    transfers: HashMap<u64, PendingTransfer>,
    /// Inbound jetton credits by the query id of their mint or release.
    credits: HashMap<u64, PendingCredit>,
}

impl TokenRouter {
    pub fn instantiate(msg: InstantiateMsg) -> Self {
        Self {
            config: Config {
                mailbox: msg.mailbox,
                token: msg.token,
                amount_encoding: msg.amount_encoding,
            },
            ownership: Ownership::new(msg.owner),
            ism: msg.ism,
            routers: msg.routers,
            next_query_id: 0,
            transfers: HashMap::new(),
            credits: HashMap::new(),
        }
    }

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
            Tag::Request(OpCode::GetIsm) => self.get_ism(ctx, header.query_id),
            Tag::Request(OpCode::Handle) => {
                let request = load_payload::<Handle>(&mut parser)?;
                self.handle(ctx, header.query_id, request)
            }
            Tag::Request(OpCode::TransferRemote) => {
                let request = load_payload::<TransferRemote>(&mut parser)?;
                self.transfer_remote(ctx, request)
            }
            Tag::Request(OpCode::JettonBurnNotification) => {
                let request = load_payload::<JettonBurnNotification>(&mut parser)?;
                self.burn_notification(ctx, request)
            }
            Tag::Request(OpCode::JettonTransferNotification) => {
                let request = load_payload::<JettonTransferNotification>(&mut parser)?;
                self.transfer_notification(ctx, request)
            }
            Tag::Request(OpCode::SetIsm) => {
                let request = load_payload::<SetIsm>(&mut parser)?;
                self.set_ism(ctx, request)
            }
            Tag::Request(OpCode::SetRouter) => {
                let request = load_payload::<SetRouter>(&mut parser)?;
                self.set_router(ctx, request)
            }
            Tag::Request(OpCode::TransferOwnership) => {
                let request = load_payload::<TransferOwnership>(&mut parser)?;
                self.ownership
                    .transfer(ctx, request.owner)
                    .map(|transferred| Response::new().add_event(transferred))
            }
            Tag::Answer(OpCode::Dispatch) => {
                let result = Answer::<Dispatched>::load_result(&mut parser)
                    .change_context(ExitCode::CellUnderflow)?;
                self.dispatch_answered(ctx, header.query_id, result)
            }
            Tag::Request(OpCode::JettonExcesses) => self.excesses(ctx, header.query_id),
            tag => Err(report!(ExitCode::UnknownOpcode))
                .attach_printable_lazy(|| format!("unexpected message {tag:?}")),
        }
        .attach_printable_lazy(|| format!("token router at {}", ctx.address))?
        .then(Ok)
    }

    fn bounce(&mut self, ctx: &Context, body: &Cell) -> error_stack::Result<Response, ExitCode> {
        let bounced = Bounced::from_body(body).change_context(ExitCode::CellUnderflow)?;

        match bounced.tag {
            Tag::Request(OpCode::Dispatch) => {
                self.dispatch_answered(ctx, bounced.query_id, Err(ExitCode::CallBounced))
            }
            Tag::Request(OpCode::JettonMint | OpCode::JettonTransfer) => {
                self.credit_bounced(ctx, bounced.query_id)
            }
            tag => {
                debug!(router = %ctx.address, ?tag, "ignoring bounce");
                Ok(Response::new())
            }
        }
    }
}

impl Contract for TokenRouter {
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
    use hyperlane_ton_api::jetton::{JettonExcesses, JettonMint, JettonTransfer};
    use hyperlane_ton_api::msg::{Dispatch, GetIsm, IsmAddress, Request};
    use hyperlane_ton_api::{
        AmountEncoding, CellCodec, HookMetadata, TokenTransferPayload, WarpTransfer,
    };
    use jetton::wallet_address;
    use ton_sandbox::{bounce_body, OutMessage, SendValue};
    use ton_utils::U256;

    use super::*;
    use crate::Token;

    const ORIGIN: Domain = 4321;

    fn owner() -> Address {
        Address::derived("owner")
    }

    fn mailbox() -> Address {
        Address::derived("mailbox")
    }

    fn minter() -> Address {
        Address::derived("minter")
    }

    fn escrow() -> Address {
        Address::derived("escrow-wallet")
    }

    fn holder() -> Address {
        Address::derived("holder")
    }

    fn recipient() -> Address {
        Address::from_hash(B256::repeat_byte(7))
    }

    fn remote_router() -> B256 {
        B256::repeat_byte(0xaa)
    }

    fn ctx(sender: Address, value: u128) -> Context {
        Context {
            address: Address::derived("token-router"),
            sender,
            value,
            balance: value,
            lt: 1,
        }
    }

    fn router(token: Token) -> TokenRouter {
        TokenRouter::instantiate(InstantiateMsg {
            owner: owner(),
            mailbox: mailbox(),
            token,
            amount_encoding: AmountEncoding::Uint256,
            ism: None,
            routers: HashMap::from([(ORIGIN, remote_router())]),
        })
    }

    fn collateral() -> Token {
        Token::Collateral {
            minter: minter(),
            wallet: escrow(),
        }
    }

    fn handle(sender: B256, amount: u64) -> Cell {
        let payload = TokenTransferPayload {
            recipient: B256::repeat_byte(7),
            amount: U256::from(amount),
        };

        Handle {
            origin: ORIGIN,
            sender,
            body: Arc::new(payload.to_cell(AmountEncoding::Uint256).unwrap()),
        }
        .to_body(11)
        .unwrap()
    }

    fn query_id(message: &OutMessage) -> u64 {
        let mut parser = message.body.parser();
        read_header(&mut parser).unwrap().unwrap().query_id
    }

    fn failed_dispatch(query_id: u64) -> Cell {
        Answer::<Dispatched>::failed(OpCode::Dispatch, query_id, ExitCode::InsufficientGasPayment)
            .to_body()
            .unwrap()
    }

    /// Dispatches a transfer of `amount` through a route of `token` and returns the DISPATCH.
    fn dispatch(router: &mut TokenRouter, amount: u128) -> OutMessage {
        let transfer = WarpTransfer {
            destination: ORIGIN,
            recipient: B256::repeat_byte(4),
            hook_metadata: None,
        };

        let mut response = match router.token() {
            Token::Native => {
                let request = TransferRemote {
                    destination: ORIGIN,
                    recipient: transfer.recipient,
                    amount: U256::from(amount),
                    hook_metadata: None,
                };
                assert_ok!(router.receive(&ctx(holder(), amount + 100), &request.to_body(0).unwrap()))
            }
            Token::Synthetic { minter } => {
                let notification = JettonBurnNotification {
                    amount,
                    sender: holder(),
                    response_destination: None,
                    custom_payload: Some(transfer.to_arc_cell().unwrap()),
                };
                assert_ok!(router.receive(&ctx(minter, 100), &notification.to_body(0).unwrap()))
            }
            Token::Collateral { wallet, .. } => {
                let notification = JettonTransferNotification {
                    amount,
                    sender: holder(),
                    forward_payload: Some(transfer.to_arc_cell().unwrap()),
                };
                assert_ok!(router.receive(&ctx(wallet, 100), &notification.to_body(0).unwrap()))
            }
        };

        assert_eq!(router.pending_transfers(), 1);
        response.messages.remove(0)
    }

    #[test_log::test]
    fn synthetic_handle_is_answered_once_the_recipient_wallet_confirms_the_mint() {
        let mut router = router(Token::Synthetic { minter: minter() });

        let response = assert_ok!(router.receive(&ctx(mailbox(), 50), &handle(remote_router(), 1_000)));

        assert_eq!(response.messages.len(), 1);
        let mint = &response.messages[0];
        assert_eq!(mint.to, minter());
        assert_eq!(mint.value, SendValue::RemainingInbound);
        let (credit_query_id, mint) = assert_ok!(JettonMint::from_body(&mint.body));
        assert_eq!(mint.to, recipient());
        assert_eq!(mint.amount, 1_000);
        assert_eq!(mint.response_destination, Some(ctx(mailbox(), 0).address));
        assert_eq!(router.pending_credits(), 1);

        let excesses = JettonExcesses.to_body(credit_query_id).unwrap();
        let wallet = wallet_address(&minter(), &recipient());
        let response = assert_ok!(router.receive(&ctx(wallet, 40), &excesses));

        let reply = &response.messages[0];
        assert_eq!(reply.to, mailbox());
        let answer = assert_ok!(Answer::<()>::from_body(&reply.body));
        assert_eq!(answer, Answer::ok(OpCode::Handle, 11, ()));
        assert_eq!(response.messages[1].to, recipient());
        assert_eq!(response.messages[1].value, SendValue::RemainingInbound);
        assert_eq!(response.events[0].attribute("amount"), Some("1000"));
        assert_eq!(router.pending_credits(), 0);
    }

    #[test]
    fn excesses_from_another_wallet_do_not_confirm_a_credit() {
        let mut router = router(Token::Synthetic { minter: minter() });
        let response = assert_ok!(router.receive(&ctx(mailbox(), 50), &handle(remote_router(), 1)));
        let excesses = JettonExcesses.to_body(query_id(&response.messages[0])).unwrap();

        let response = assert_ok!(router.receive(&ctx(Address::derived("stranger"), 40), &excesses));

        assert!(response.messages.is_empty());
        assert_eq!(router.pending_credits(), 1);
    }

    #[test]
    fn jetton_credits_need_value_for_the_confirmation() {
        let mut router = router(Token::Synthetic { minter: minter() });

        let err = router
            .receive(&ctx(mailbox(), 0), &handle(remote_router(), 1))
            .unwrap_err();

        assert_eq!(err.exit_code, i32::from(ExitCode::NotEnoughTon));
    }

    #[test]
    fn bounced_collateral_release_fails_the_handle() {
        let mut router = router(collateral());

        let response = assert_ok!(router.receive(&ctx(mailbox(), 50), &handle(remote_router(), 5)));
        let release = &response.messages[0];
        assert_eq!(release.to, escrow());
        let (_, transfer) = assert_ok!(JettonTransfer::from_body(&release.body));
        assert_eq!(transfer.amount, 5);
        assert_eq!(transfer.destination, recipient());

        let bounced = bounce_body(&release.body).unwrap();
        let response = assert_ok!(router.on_bounce(&ctx(escrow(), 50), &bounced));

        let reply = &response.messages[0];
        assert_eq!(reply.to, mailbox());
        assert_eq!(reply.value, SendValue::RemainingInbound);
        let answer = assert_ok!(Answer::<()>::from_body(&reply.body));
        assert_eq!(
            answer,
            Answer::failed(OpCode::Handle, 11, ExitCode::CallBounced)
        );
        assert_eq!(router.pending_credits(), 0);
    }

    #[test]
    fn native_handle_pays_out_of_the_router_balance() {
        let mut router = router(Token::Native);

        let response = assert_ok!(router.receive(&ctx(mailbox(), 50), &handle(remote_router(), 300)));

        let payout = &response.messages[0];
        assert_eq!(payout.to, recipient());
        assert_eq!(payout.value, SendValue::Amount(300));
        assert!(!payout.bounce);
        let answer = assert_ok!(Answer::<()>::from_body(&response.messages[1].body));
        assert_eq!(answer, Answer::ok(OpCode::Handle, 11, ()));
        assert_eq!(router.pending_credits(), 0);
    }

    #[test]
    fn handle_requires_the_mailbox_and_an_enrolled_router() {
        let mut router = router(Token::Synthetic { minter: minter() });

        let err = router
            .receive(&ctx(Address::derived("relayer"), 50), &handle(remote_router(), 1))
            .unwrap_err();
        assert_eq!(err.exit_code, i32::from(ExitCode::UnauthorizedSender));

        let err = router
            .receive(&ctx(mailbox(), 50), &handle(B256::repeat_byte(0xbb), 1))
            .unwrap_err();
        assert_eq!(err.exit_code, i32::from(ExitCode::WrongValidator));
    }

    #[test]
    fn native_transfer_remote_locks_the_amount_and_dispatches_the_rest() {
        let mut router = router(Token::Native);
        let request = TransferRemote {
            destination: ORIGIN,
            recipient: B256::repeat_byte(3),
            amount: U256::from(400u64),
            hook_metadata: Some(HookMetadata::default()),
        };

        let err = router
            .receive(&ctx(owner(), 399), &request.to_body(0).unwrap())
            .unwrap_err();
        assert_eq!(err.exit_code, i32::from(ExitCode::MsgValueTooLow));

        let response = assert_ok!(router.receive(&ctx(owner(), 1_000), &request.to_body(2).unwrap()));

        let message = &response.messages[0];
        assert_eq!(message.to, mailbox());
        assert_eq!(message.value, SendValue::Amount(600));
        let (_, dispatch) = assert_ok!(Dispatch::from_body(&message.body));
        assert_eq!(dispatch.destination, ORIGIN);
        assert_eq!(dispatch.recipient, remote_router());
        assert_eq!(
            assert_ok!(TokenTransferPayload::from_cell(&dispatch.body, AmountEncoding::Uint256)),
            TokenTransferPayload {
                recipient: B256::repeat_byte(3),
                amount: U256::from(400u64),
            }
        );
        assert_eq!(router.pending_transfers(), 1);
    }

    #[test]
    fn committed_dispatch_returns_the_unspent_value_to_the_sender() {
        let mut router = router(Token::Native);
        let dispatch = dispatch(&mut router, 400);
        let dispatched = Answer::ok(
            OpCode::Dispatch,
            query_id(&dispatch),
            Dispatched {
                nonce: 0,
                message_id: B256::repeat_byte(1),
            },
        )
        .to_body()
        .unwrap();

        let response = assert_ok!(router.receive(&ctx(mailbox(), 30), &dispatched));

        assert_eq!(response.messages[0].to, holder());
        assert_eq!(response.messages[0].value, SendValue::RemainingInbound);
        assert_eq!(router.pending_transfers(), 0);
    }

    #[test]
    fn failed_native_dispatch_unlocks_the_amount() {
        let mut router = router(Token::Native);
        let dispatch = dispatch(&mut router, 400);

        let err = router
            .receive(&ctx(Address::derived("stranger"), 0), &failed_dispatch(query_id(&dispatch)))
            .unwrap_err();
        assert_eq!(err.exit_code, i32::from(ExitCode::UnauthorizedSender));

        let response = assert_ok!(router.receive(&ctx(mailbox(), 100), &failed_dispatch(query_id(&dispatch))));

        let refund = &response.messages[0];
        assert_eq!(refund.to, holder());
        assert_eq!(refund.value, SendValue::Amount(500));
        assert_eq!(response.events[0].ty, "transfer_refunded");
        assert_eq!(router.pending_transfers(), 0);

        // answered once
        let err = router
            .receive(&ctx(mailbox(), 100), &failed_dispatch(query_id(&dispatch)))
            .unwrap_err();
        assert_eq!(err.exit_code, i32::from(ExitCode::UnauthorizedSender));
    }

    #[test]
    fn failed_burn_dispatch_mints_the_tokens_back() {
        let mut router = router(Token::Synthetic { minter: minter() });
        let dispatch = dispatch(&mut router, 10);

        let bounced = bounce_body(&dispatch.body).unwrap();
        let response = assert_ok!(router.on_bounce(&ctx(mailbox(), 100), &bounced));

        let remint = &response.messages[0];
        assert_eq!(remint.to, minter());
        let (_, mint) = assert_ok!(JettonMint::from_body(&remint.body));
        assert_eq!(mint.to, holder());
        assert_eq!(mint.amount, 10);
        assert_eq!(router.pending_transfers(), 0);
    }

    #[test]
    fn failed_deposit_dispatch_returns_the_escrowed_jettons() {
        let mut router = router(collateral());
        let dispatch = dispatch(&mut router, 25);

        let response = assert_ok!(router.receive(&ctx(mailbox(), 100), &failed_dispatch(query_id(&dispatch))));

        let release = &response.messages[0];
        assert_eq!(release.to, escrow());
        assert_eq!(release.value, SendValue::RemainingInbound);
        let (_, transfer) = assert_ok!(JettonTransfer::from_body(&release.body));
        assert_eq!(transfer.destination, holder());
        assert_eq!(transfer.amount, 25);
    }

    #[test]
    fn burn_notification_from_the_minter_dispatches_the_burnt_amount() {
        let mut router = router(Token::Synthetic { minter: minter() });
        let transfer = |destination| WarpTransfer {
            destination,
            recipient: B256::repeat_byte(4),
            hook_metadata: None,
        };
        let notification = |destination| JettonBurnNotification {
            amount: 10,
            sender: holder(),
            response_destination: None,
            custom_payload: Some(transfer(destination).to_arc_cell().unwrap()),
        };

        let err = router
            .receive(&ctx(Address::derived("stranger"), 10), &notification(ORIGIN).to_body(0).unwrap())
            .unwrap_err();
        assert_eq!(err.exit_code, i32::from(ExitCode::UnauthorizedSender));

        let err = router
            .receive(&ctx(minter(), 10), &notification(999).to_body(0).unwrap())
            .unwrap_err();
        assert_eq!(err.exit_code, i32::from(ExitCode::WrongDestDomain));

        let response = assert_ok!(router.receive(&ctx(minter(), 10), &notification(ORIGIN).to_body(0).unwrap()));
        let (_, dispatch) = assert_ok!(Dispatch::from_body(&response.messages[0].body));
        let payload = assert_ok!(TokenTransferPayload::from_cell(&dispatch.body, AmountEncoding::Uint256));
        assert_eq!(payload.amount, U256::from(10u64));
        assert_eq!(payload.recipient, B256::repeat_byte(4));
    }

    #[test]
    fn transfer_remote_is_native_only() {
        let mut router = router(Token::Synthetic { minter: minter() });
        let request = TransferRemote {
            destination: ORIGIN,
            recipient: B256::repeat_byte(3),
            amount: U256::from(1u64),
            hook_metadata: None,
        };

        let err = router
            .receive(&ctx(owner(), 10), &request.to_body(0).unwrap())
            .unwrap_err();
        assert_eq!(err.exit_code, i32::from(ExitCode::UnknownOpcode));
    }

    #[test]
    fn owner_configures_routers_and_the_ism() {
        let mut router = router(Token::Native);
        let ism = Address::derived("custom-ism");
        let set_router = SetRouter {
            domain: 5,
            router: B256::repeat_byte(5),
        }
        .to_body(0)
        .unwrap();

        let err = router
            .receive(&ctx(Address::derived("stranger"), 0), &set_router)
            .unwrap_err();
        assert_eq!(err.exit_code, i32::from(ExitCode::UnauthorizedSender));

        let response = assert_ok!(router.receive(&ctx(owner(), 0), &set_router));
        assert_eq!(response.events[0].ty, "router_set");
        assert_eq!(router.router(5), Some(B256::repeat_byte(5)));
        assert_eq!(router.routers().len(), 2);

        assert_ok!(router.receive(&ctx(owner(), 0), &SetIsm { ism: Some(ism) }.to_body(0).unwrap()));
        let response = assert_ok!(router.receive(&ctx(mailbox(), 10), &GetIsm.to_body(8).unwrap()));
        let answer = assert_ok!(Answer::<IsmAddress>::from_body(&response.messages[0].body));
        assert_eq!(answer, Answer::ok(OpCode::GetIsm, 8, IsmAddress { ism: Some(ism) }));
    }
}
