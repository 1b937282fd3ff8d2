use error_stack::{ensure, report, Result, ResultExt};
use hyperlane_ton_api::jetton::{
    JettonBurn, JettonBurnNotification, JettonExcesses, JettonInternalTransfer, JettonTransfer,
    JettonTransferNotification,
};
use hyperlane_ton_api::msg::{Bounced, Header};
use hyperlane_ton_api::{ExitCode, OpCode, Tag};
use hyperlane_ton_std::{ensure_sender, request};
use ton_sandbox::{Context, Response, SendValue};
use ton_utils::{Cell, CellParserExt};
use tracing::{debug, warn};

use super::JettonWallet;
use crate::wallet_address;

impl JettonWallet {
    pub(super) fn transfer(
        &mut self,
        ctx: &Context,
        query_id: u64,
        transfer: JettonTransfer,
    ) -> Result<Response, ExitCode> {
        ensure_sender(ctx, &self.owner)?;
        ensure!(
            ctx.value > transfer.forward_ton_amount,
            ExitCode::NotEnoughTon
        );
        self.debit(transfer.amount)?;

        let internal = JettonInternalTransfer {
            amount: transfer.amount,
            from: self.owner,
            response_address: transfer.response_destination,
            forward_ton_amount: transfer.forward_ton_amount,
            forward_payload: transfer.forward_payload,
        };
        let message = request(
            wallet_address(&self.minter, &transfer.destination),
            query_id,
            &internal,
            SendValue::RemainingInbound,
        )?
        .with_init(Box::new(JettonWallet::new(
            transfer.destination,
            self.minter,
        )));

        Ok(Response::new().add_message(message))
    }

    /// Credit from the minter or from the wallet of `from`. Forwards `forward_ton_amount` to the
    /// owner with a notification and whatever value is left to the response address.
    pub(super) fn internal_transfer(
        &mut self,
        ctx: &Context,
        query_id: u64,
        transfer: JettonInternalTransfer,
    ) -> Result<Response, ExitCode> {
        ensure!(
            ctx.sender == self.minter || ctx.sender == wallet_address(&self.minter, &transfer.from),
            ExitCode::UnauthorizedSender
        );
        let remaining = ctx
            .value
            .checked_sub(transfer.forward_ton_amount)
            .ok_or_else(|| report!(ExitCode::NotEnoughTon))?;

        self.balance = self
            .balance
            .checked_add(transfer.amount)
            .ok_or_else(|| report!(ExitCode::CellOverflow))?;
        debug!(wallet = %ctx.address, owner = %self.owner, amount = transfer.amount, "jettons received");

        let notification = (transfer.forward_ton_amount > 0)
            .then(|| {
                request(
                    self.owner,
                    query_id,
                    &JettonTransferNotification {
                        amount: transfer.amount,
                        sender: transfer.from,
                        forward_payload: transfer.forward_payload.clone(),
                    },
                    SendValue::Amount(transfer.forward_ton_amount),
                )
            })
            .transpose()?;

        let excesses = transfer
            .response_address
            .filter(|_| remaining > 0)
            .map(|to| request(to, query_id, &JettonExcesses, SendValue::Amount(remaining)))
            .transpose()?
            .map(|excesses| excesses.non_bounceable());

        Ok(Response::new()
            .add_messages(notification)
            .add_messages(excesses))
    }

    pub(super) fn burn(
        &mut self,
        ctx: &Context,
        query_id: u64,
        burn: JettonBurn,
    ) -> Result<Response, ExitCode> {
        ensure_sender(ctx, &self.owner)?;
        self.debit(burn.amount)?;

        let notification = JettonBurnNotification {
            amount: burn.amount,
            sender: self.owner,
            response_destination: burn.response_destination,
            custom_payload: burn.custom_payload,
        };

        Ok(Response::new().add_message(request(
            self.minter,
            query_id,
            &notification,
            SendValue::RemainingInbound,
        )?))
    }

    /// Restores the balance of an outgoing transfer or burn that bounced.
    pub(super) fn bounced(&mut self, ctx: &Context, body: &Cell) -> Result<Response, ExitCode> {
        let bounced = Bounced::from_body(body).change_context(ExitCode::CellUnderflow)?;

        match bounced.tag {
            Tag::Request(OpCode::JettonInternalTransfer | OpCode::JettonBurnNotification) => {
                let mut parser = body.parser();
                parser
                    .load_u32(32)
                    .map_err(|err| report!(ExitCode::CellUnderflow).attach_printable(err))?;
                Header::load(&mut parser).change_context(ExitCode::CellUnderflow)?;
                let amount = parser
                    .load_coins_u128()
                    .map_err(|err| report!(ExitCode::CellUnderflow).attach_printable(err))?;

                self.balance = self
                    .balance
                    .checked_add(amount)
                    .ok_or_else(|| report!(ExitCode::CellOverflow))?;
                warn!(wallet = %ctx.address, amount, "outgoing jettons bounced, balance restored");
            }
            tag => debug!(wallet = %ctx.address, ?tag, "ignoring bounce"),
        }

        Ok(Response::new())
    }

    fn debit(&mut self, amount: u128) -> Result<(), ExitCode> {
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or_else(|| report!(ExitCode::BalanceError))
            .attach_printable_lazy(|| format!("balance {} below {amount}", self.balance))?;

        Ok(())
    }
}
