use std::sync::Arc;

use error_stack::{ensure, report, Result, ResultExt};
use hyperlane_ton_api::jetton::{
    JettonBurnNotification, JettonMint, JettonTransfer, JettonTransferNotification,
};
use hyperlane_ton_api::msg::{
    Answer, Dispatch, Handle, IsmAddress, SetIsm, SetRouter, TransferRemote,
};
use hyperlane_ton_api::{
    CellCodec, Domain, ExitCode, OpCode, TokenTransferPayload, WarpTransfer,
};
use hyperlane_ton_std::{answer, ensure_sender, request, transfer};
use jetton::wallet_address;
use ton_sandbox::{Context, Response, SendValue};
use ton_utils::{Address, Cell, U256};
use tracing::{debug, info};

use super::TokenRouter;
use crate::events::Event;
use crate::state::{PendingCredit, PendingTransfer, Token};

/// Transfer instructions a jetton holder attached to a burn or an escrow deposit.
fn warp_transfer(payload: Option<&Cell>) -> Result<WarpTransfer, ExitCode> {
    let cell = payload
        .ok_or_else(|| report!(ExitCode::CellUnderflow))
        .attach_printable("missing warp transfer payload")?;

    WarpTransfer::from_cell(cell).change_context(ExitCode::CellUnderflow)
}

impl TokenRouter {
    pub(super) fn get_ism(&self, ctx: &Context, query_id: u64) -> Result<Response, ExitCode> {
        let reply = answer(
            ctx.sender,
            &Answer::ok(OpCode::GetIsm, query_id, IsmAddress { ism: self.ism }),
            SendValue::RemainingInbound,
        )?;

        Ok(Response::new().add_message(reply))
    }

    /// Credits the recipient of a verified transfer from an enrolled remote router. Native value
    /// is paid at once. Jetton credits are only answered once the recipient's wallet confirms
    /// them, so a credit that bounces fails the HANDLE and the message stays deliverable.
    pub(super) fn handle(
        &mut self,
        ctx: &Context,
        query_id: u64,
        handle: Handle,
    ) -> Result<Response, ExitCode> {
        ensure_sender(ctx, &self.config.mailbox)?;
        ensure!(
            self.routers.get(&handle.origin) == Some(&handle.sender),
            ExitCode::WrongValidator
        );

        let payload = TokenTransferPayload::from_cell(&handle.body, self.config.amount_encoding)
            .change_context(ExitCode::CellUnderflow)?;
        let amount = u128::try_from(payload.amount)
            .map_err(|_| report!(ExitCode::CellOverflow))
            .attach_printable_lazy(|| format!("amount {} does not fit into coins", payload.amount))?;
        let recipient = Address::from_hash(payload.recipient);

        let credit_query_id = self.allocate_query_id();
        let (minter, message) = match self.config.token {
            Token::Native => {
                return self.pay_out(ctx, query_id, handle.origin, recipient, amount);
            }
            Token::Synthetic { minter } => {
                let mint = JettonMint {
                    to: recipient,
                    amount,
                    forward_ton_amount: 0,
                    response_destination: Some(ctx.address),
                };
                (
                    minter,
                    request(minter, credit_query_id, &mint, SendValue::RemainingInbound)?,
                )
            }
            Token::Collateral { minter, wallet } => {
                let release = JettonTransfer {
                    amount,
                    destination: recipient,
                    response_destination: Some(ctx.address),
                    custom_payload: None,
                    forward_ton_amount: 0,
                    forward_payload: None,
                };
                (
                    minter,
                    request(wallet, credit_query_id, &release, SendValue::RemainingInbound)?,
                )
            }
        };
        // the recipient's wallet only reports an excess it actually has
        ensure!(ctx.value > 0, ExitCode::NotEnoughTon);

        self.credits.insert(
            credit_query_id,
            PendingCredit {
                mailbox_query_id: query_id,
                origin: handle.origin,
                source: message.to,
                wallet: wallet_address(&minter, &recipient),
                recipient,
                amount,
            },
        );
        debug!(router = %ctx.address, %recipient, amount, "crediting inbound transfer");

        Ok(Response::new().add_message(message))
    }

    fn pay_out(
        &self,
        ctx: &Context,
        query_id: u64,
        origin: Domain,
        recipient: Address,
        amount: u128,
    ) -> Result<Response, ExitCode> {
        info!(
            router = %ctx.address,
            origin,
            %recipient,
            amount,
            "received transfer remote"
        );

        Ok(Response::new()
            .add_message(transfer(recipient, SendValue::Amount(amount))?)
            .add_message(answer(
                ctx.sender,
                &Answer::ok(OpCode::Handle, query_id, ()),
                SendValue::RemainingInbound,
            )?)
            .add_event(Event::ReceivedTransferRemote {
                origin,
                recipient,
                amount: U256::from(amount),
            }))
    }

    /// Locks native value and dispatches it. What is attached beyond the amount pays the hooks.
    pub(super) fn transfer_remote(
        &mut self,
        ctx: &Context,
        request: TransferRemote,
    ) -> Result<Response, ExitCode> {
        ensure!(
            self.config.token == Token::Native,
            ExitCode::UnknownOpcode
        );

        let amount = u128::try_from(request.amount).map_err(|_| report!(ExitCode::MsgValueTooLow))?;
        let remaining = ctx
            .value
            .checked_sub(amount)
            .ok_or_else(|| report!(ExitCode::MsgValueTooLow))
            .attach_printable_lazy(|| format!("attached {} for an amount of {amount}", ctx.value))?;

        self.dispatch(
            ctx,
            ctx.sender,
            WarpTransfer {
                destination: request.destination,
                recipient: request.recipient,
                hook_metadata: request.hook_metadata,
            },
            amount,
            SendValue::Amount(remaining),
        )
    }

    /// Tokens burnt by a holder of the synthetic jetton, relayed by its minter.
    pub(super) fn burn_notification(
        &mut self,
        ctx: &Context,
        notification: JettonBurnNotification,
    ) -> Result<Response, ExitCode> {
        let Token::Synthetic { minter } = self.config.token else {
            return Err(report!(ExitCode::UnknownOpcode))
                .attach_printable("burn notifications need the synthetic standard");
        };
        ensure_sender(ctx, &minter)?;

        let transfer = warp_transfer(notification.custom_payload.as_deref())?;
        self.dispatch(
            ctx,
            notification.sender,
            transfer,
            notification.amount,
            SendValue::RemainingInbound,
        )
    }

    /// Tokens deposited into the escrow wallet of the collateral route.
    pub(super) fn transfer_notification(
        &mut self,
        ctx: &Context,
        notification: JettonTransferNotification,
    ) -> Result<Response, ExitCode> {
        let Token::Collateral { wallet, .. } = self.config.token else {
            return Err(report!(ExitCode::UnknownOpcode))
                .attach_printable("transfer notifications need the collateral standard");
        };
        ensure_sender(ctx, &wallet)?;

        let transfer = warp_transfer(notification.forward_payload.as_deref())?;
        self.dispatch(
            ctx,
            notification.sender,
            transfer,
            notification.amount,
            SendValue::RemainingInbound,
        )
    }

    pub(super) fn set_ism(&mut self, ctx: &Context, request: SetIsm) -> Result<Response, ExitCode> {
        self.ownership.ensure_owner(ctx)?;
        self.ism = request.ism;

        Ok(Response::new().add_event(Event::IsmSet { ism: request.ism }))
    }

    pub(super) fn set_router(
        &mut self,
        ctx: &Context,
        request: SetRouter,
    ) -> Result<Response, ExitCode> {
        self.ownership.ensure_owner(ctx)?;
        self.routers.insert(request.domain, request.router);
        info!(router = %ctx.address, domain = request.domain, remote = %request.router, "router set");

        Ok(Response::new().add_event(Event::RouterSet {
            domain: request.domain,
            router: request.router,
        }))
    }

    /// Dispatches `amount` on behalf of `sender`, who gets it back if the mailbox fails the
    /// dispatch.
    fn dispatch(
        &mut self,
        ctx: &Context,
        sender: Address,
        transfer: WarpTransfer,
        amount: u128,
        value: SendValue,
    ) -> Result<Response, ExitCode> {
        let router = self
            .router(transfer.destination)
            .ok_or_else(|| report!(ExitCode::WrongDestDomain))
            .attach_printable_lazy(|| {
                format!("no router enrolled for domain {}", transfer.destination)
            })?;

        let body = TokenTransferPayload {
            recipient: transfer.recipient,
            amount: U256::from(amount),
        }
        .to_cell(self.config.amount_encoding)
        .change_context(ExitCode::CellOverflow)?;
        let dispatch = Dispatch {
            destination: transfer.destination,
            recipient: router,
            body: Arc::new(body),
            hook_metadata: transfer.hook_metadata,
        };
        let query_id = self.allocate_query_id();
        let message = request(self.config.mailbox, query_id, &dispatch, value)?;
        self.transfers
            .insert(query_id, PendingTransfer { sender, amount });

        info!(
            router = %ctx.address,
            destination = transfer.destination,
            recipient = %transfer.recipient,
            amount,
            "sent transfer remote"
        );

        Ok(Response::new()
            .add_message(message)
            .add_event(Event::SentTransferRemote {
                destination: transfer.destination,
                recipient: transfer.recipient,
                amount: U256::from(amount),
            }))
    }
}
