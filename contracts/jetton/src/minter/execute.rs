use error_stack::{report, Result};
use hyperlane_ton_api::jetton::{
    JettonBurnNotification, JettonChangeAdmin, JettonExcesses, JettonInternalTransfer, JettonMint,
};
use hyperlane_ton_api::{ExitCode, OpCode};
use hyperlane_ton_std::{ensure_sender, request, send};
use ton_sandbox::{Context, Response, SendValue};
use tracing::info;

use super::JettonMinter;
use crate::events::Event;
use crate::wallet::JettonWallet;
use crate::wallet_address;

impl JettonMinter {
    pub(super) fn mint(
        &mut self,
        ctx: &Context,
        query_id: u64,
        mint: JettonMint,
    ) -> Result<Response, ExitCode> {
        ensure_sender(ctx, &self.admin)?;

        // coins cannot hold more than 120 bits, so this never overflows in practice
        self.total_supply = self
            .total_supply
            .checked_add(mint.amount)
            .ok_or_else(|| report!(ExitCode::CellOverflow))?;

        let transfer = JettonInternalTransfer {
            amount: mint.amount,
            from: ctx.address,
            response_address: mint.response_destination,
            forward_ton_amount: mint.forward_ton_amount,
            forward_payload: None,
        };
        let wallet = wallet_address(&ctx.address, &mint.to);
        let message = request(wallet, query_id, &transfer, SendValue::RemainingInbound)?
            .with_init(Box::new(JettonWallet::new(mint.to, ctx.address)));

        Ok(Response::new()
            .add_message(message)
            .add_event(Event::Minted {
                to: mint.to,
                amount: mint.amount,
            }))
    }

    /// A holder's wallet reporting burnt tokens. With a custom payload the notification is
    /// relayed to the admin, otherwise the remaining value returns to the response destination.
    pub(super) fn burn_notification(
        &mut self,
        ctx: &Context,
        query_id: u64,
        notification: JettonBurnNotification,
    ) -> Result<Response, ExitCode> {
        ensure_sender(ctx, &wallet_address(&ctx.address, &notification.sender))?;

        self.total_supply = self
            .total_supply
            .checked_sub(notification.amount)
            .ok_or_else(|| report!(ExitCode::BalanceError))?;

        let event = Event::Burned {
            owner: notification.sender,
            amount: notification.amount,
        };

        let message = if notification.custom_payload.is_some() {
            Some(send(
                self.admin,
                OpCode::JettonBurnNotification,
                query_id,
                &notification,
                SendValue::RemainingInbound,
            )?)
        } else {
            notification
                .response_destination
                .map(|to| request(to, query_id, &JettonExcesses, SendValue::RemainingInbound))
                .transpose()?
                .map(|excesses| excesses.non_bounceable())
        };

        Ok(Response::new()
            .add_messages(message)
            .add_event(event))
    }

    pub(super) fn change_admin(
        &mut self,
        ctx: &Context,
        change: JettonChangeAdmin,
    ) -> Result<Response, ExitCode> {
        ensure_sender(ctx, &self.admin)?;

        let previous = std::mem::replace(&mut self.admin, change.admin);
        info!(minter = %ctx.address, %previous, admin = %change.admin, "jetton admin changed");

        Ok(Response::new().add_event(Event::AdminChanged {
            previous,
            admin: change.admin,
        }))
    }
}
