use error_stack::{ensure, report, Result, ResultExt};
use hyperlane_ton_api::msg::{Answer, PostDispatch};
use hyperlane_ton_api::{ExitCode, OpCode};
use hyperlane_ton_std::{answer, transfer};
use ton_sandbox::{Context, Response, SendValue};
use ton_utils::Address;
use tracing::info;

use super::ProtocolFeeHook;
use crate::events::Event;

impl ProtocolFeeHook {
    /// Keeps the fee and hands the rest of the inbound value back with the answer.
    pub(super) fn post_dispatch(
        &mut self,
        ctx: &Context,
        op: OpCode,
        query_id: u64,
        request: PostDispatch,
    ) -> Result<Response, ExitCode> {
        let fee = self.state.protocol_fee;
        let change = ctx
            .value
            .checked_sub(fee)
            .ok_or_else(|| report!(ExitCode::InsufficientProtocolFee))
            .attach_printable_lazy(|| format!("attached {} but the fee is {fee}", ctx.value))?;

        self.state.collected = self.state.collected.saturating_add(fee);

        let reply = answer(
            ctx.sender,
            &Answer::ok(op, query_id, ()),
            SendValue::Amount(change),
        )?;

        Ok(Response::new()
            .add_event(Event::ProtocolFeePaid {
                message_id: request.message.id(),
                payer: ctx.sender,
                fee,
            })
            .add_message(reply))
    }

    pub(super) fn set_protocol_fee(
        &mut self,
        ctx: &Context,
        protocol_fee: u128,
    ) -> Result<Response, ExitCode> {
        self.ownership.ensure_owner(ctx)?;
        ensure!(
            protocol_fee <= self.config.max_protocol_fee,
            ExitCode::ExceedsMaxProtocolFee
        );

        self.state.protocol_fee = protocol_fee;
        info!(hook = %ctx.address, protocol_fee, "protocol fee set");

        Ok(Response::new().add_event(Event::ProtocolFeeSet { protocol_fee }))
    }

    pub(super) fn set_beneficiary(
        &mut self,
        ctx: &Context,
        beneficiary: Address,
    ) -> Result<Response, ExitCode> {
        self.ownership.ensure_owner(ctx)?;

        self.state.beneficiary = beneficiary;

        Ok(Response::new().add_event(Event::BeneficiarySet { beneficiary }))
    }

    /// Sends every fee kept since the last collection to the beneficiary.
    pub(super) fn collect_protocol_fee(&mut self, ctx: &Context) -> Result<Response, ExitCode> {
        self.ownership.ensure_owner(ctx)?;

        let amount = std::mem::take(&mut self.state.collected);
        let beneficiary = self.state.beneficiary;
        if amount == 0 {
            return Ok(Response::new());
        }

        info!(hook = %ctx.address, %beneficiary, amount, "protocol fees collected");

        Ok(Response::new()
            .add_message(transfer(beneficiary, SendValue::Amount(amount))?)
            .add_event(Event::ProtocolFeeCollected {
                beneficiary,
                amount,
            }))
    }
}
