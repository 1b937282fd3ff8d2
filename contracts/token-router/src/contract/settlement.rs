use error_stack::{report, Result, ResultExt};
use hyperlane_ton_api::jetton::{JettonMint, JettonTransfer};
use hyperlane_ton_api::msg::{Answer, Dispatched};
use hyperlane_ton_api::{ExitCode, OpCode};
use hyperlane_ton_std::{answer, ensure_sender, request, transfer};
use ton_sandbox::{Context, Response, SendValue};
use ton_utils::U256;
use tracing::{debug, info, warn};

use super::TokenRouter;
use crate::events::Event;
use crate::state::{PendingTransfer, Token};

impl TokenRouter {
    /// The mailbox answered, or bounced, the DISPATCH of an outbound transfer. A committed
    /// dispatch returns the unspent hook value to the sender, a failed one everything the sender
    /// gave up.
    pub(super) fn dispatch_answered(
        &mut self,
        ctx: &Context,
        query_id: u64,
        result: std::result::Result<Dispatched, ExitCode>,
    ) -> Result<Response, ExitCode> {
        ensure_sender(ctx, &self.config.mailbox)?;
        let pending = self
            .transfers
            .remove(&query_id)
            .ok_or_else(|| report!(ExitCode::UnauthorizedSender))
            .attach_printable_lazy(|| format!("no transfer awaits dispatch {query_id}"))?;

        match result {
            Ok(dispatched) => {
                debug!(
                    router = %ctx.address,
                    nonce = dispatched.nonce,
                    message_id = %dispatched.message_id,
                    "transfer dispatched"
                );

                let change = (ctx.value > 0)
                    .then(|| transfer(pending.sender, SendValue::RemainingInbound))
                    .transpose()?;
                Ok(Response::new().add_messages(change))
            }
            Err(reason) => self.refund(ctx, query_id, pending, reason),
        }
    }

    /// Unlocks native value, re-mints burnt jettons or releases an escrowed deposit.
    fn refund(
        &self,
        ctx: &Context,
        query_id: u64,
        pending: PendingTransfer,
        reason: ExitCode,
    ) -> Result<Response, ExitCode> {
        let PendingTransfer { sender, amount } = pending;
        warn!(router = %ctx.address, %sender, amount, %reason, "dispatch failed, refunding");

        let message = match self.config.token {
            Token::Native => {
                let value = amount
                    .checked_add(ctx.value)
                    .ok_or_else(|| report!(ExitCode::CellOverflow))?;
                transfer(sender, SendValue::Amount(value))?
            }
            Token::Synthetic { minter } => {
                let mint = JettonMint {
                    to: sender,
                    amount,
                    forward_ton_amount: 0,
                    response_destination: Some(sender),
                };
                request(minter, query_id, &mint, SendValue::RemainingInbound)?
            }
            Token::Collateral { wallet, .. } => {
                let release = JettonTransfer {
                    amount,
                    destination: sender,
                    response_destination: Some(sender),
                    custom_payload: None,
                    forward_ton_amount: 0,
                    forward_payload: None,
                };
                request(wallet, query_id, &release, SendValue::RemainingInbound)?
            }
        };

        Ok(Response::new()
            .add_message(message)
            .add_event(Event::TransferRefunded {
                sender,
                amount,
                reason,
            }))
    }

    /// The recipient's jetton wallet returned the excess of a credit, so the jettons arrived and
    /// the HANDLE succeeded. Any other excess is kept as a top-up.
    pub(super) fn excesses(&mut self, ctx: &Context, query_id: u64) -> Result<Response, ExitCode> {
        let Some(credit) = self
            .credits
            .get(&query_id)
            .copied()
            .filter(|credit| credit.wallet == ctx.sender)
        else {
            debug!(router = %ctx.address, from = %ctx.sender, query_id, "excesses received");
            return Ok(Response::new());
        };
        self.credits.remove(&query_id);

        info!(
            router = %ctx.address,
            origin = credit.origin,
            recipient = %credit.recipient,
            amount = credit.amount,
            "received transfer remote"
        );

        Ok(Response::new()
            .add_message(answer(
                self.config.mailbox,
                &Answer::ok(OpCode::Handle, credit.mailbox_query_id, ()),
                SendValue::Amount(0),
            )?)
            .add_message(transfer(credit.recipient, SendValue::RemainingInbound)?)
            .add_event(Event::ReceivedTransferRemote {
                origin: credit.origin,
                recipient: credit.recipient,
                amount: U256::from(credit.amount),
            }))
    }

    /// A mint or release for an inbound transfer bounced. Failing the HANDLE lets the mailbox
    /// accept the message again.
    pub(super) fn credit_bounced(
        &mut self,
        ctx: &Context,
        query_id: u64,
    ) -> Result<Response, ExitCode> {
        let Some(credit) = self
            .credits
            .get(&query_id)
            .copied()
            .filter(|credit| credit.source == ctx.sender)
        else {
            warn!(router = %ctx.address, from = %ctx.sender, query_id, "refund bounced");
            return Ok(Response::new());
        };
        self.credits.remove(&query_id);

        warn!(
            router = %ctx.address,
            origin = credit.origin,
            recipient = %credit.recipient,
            amount = credit.amount,
            "credit bounced, failing delivery"
        );

        Ok(Response::new().add_message(answer(
            self.config.mailbox,
            &Answer::<()>::failed(OpCode::Handle, credit.mailbox_query_id, ExitCode::CallBounced),
            SendValue::RemainingInbound,
        )?))
    }
}
