use error_stack::{report, Result, ResultExt};
use hyperlane_ton_api::msg::{Answer, PostDispatch, SetDestGasConfig};
use hyperlane_ton_api::{ExitCode, OpCode};
use hyperlane_ton_std::{answer, ensure_sender, transfer};
use ton_sandbox::{Context, Response, SendValue};
use ton_utils::Address;
use tracing::info;

use super::query::gas_limit;
use super::InterchainGasPaymaster;
use crate::events::Event;

impl InterchainGasPaymaster {
    /// Charges the quote for the message's destination. The excess goes to the refund address
    /// when the metadata names one, otherwise it rides back on the answer.
    pub(super) fn post_dispatch(
        &mut self,
        ctx: &Context,
        op: OpCode,
        query_id: u64,
        request: PostDispatch,
    ) -> Result<Response, ExitCode> {
        let metadata = request.metadata_or_default();
        let gas_amount = gas_limit(&metadata)?;
        let destination = request.message.destination;
        let payment = self.quote_gas_payment(destination, gas_amount)?;

        let excess = ctx
            .value
            .checked_sub(payment)
            .ok_or_else(|| report!(ExitCode::InsufficientGasPayment))
            .attach_printable_lazy(|| {
                format!("attached {} but the quote is {payment}", ctx.value)
            })?;

        self.collected = self.collected.saturating_add(payment);

        let message_id = request.message.id();
        info!(paymaster = %ctx.address, %message_id, destination, payment, "gas paid");

        let (refund, answer_value) = match metadata.refund_address {
            Some(refund_address) if excess > 0 => (
                Some(transfer(refund_address, SendValue::Amount(excess))?),
                0,
            ),
            _ => (None, excess),
        };

        let reply = answer(
            ctx.sender,
            &Answer::ok(op, query_id, ()),
            SendValue::Amount(answer_value),
        )?;

        Ok(Response::new()
            .add_event(Event::GasPayment {
                message_id,
                destination,
                payment,
                gas_amount,
            })
            .add_messages(refund)
            .add_message(reply))
    }

    pub(super) fn set_dest_gas_config(
        &mut self,
        ctx: &Context,
        request: SetDestGasConfig,
    ) -> Result<Response, ExitCode> {
        self.ownership.ensure_owner(ctx)?;

        let SetDestGasConfig { domain, config } = request;
        self.gas_configs.insert(domain, config);

        Ok(Response::new().add_event(Event::GasConfigSet { domain, config }))
    }

    pub(super) fn set_beneficiary(
        &mut self,
        ctx: &Context,
        beneficiary: Address,
    ) -> Result<Response, ExitCode> {
        self.ownership.ensure_owner(ctx)?;

        self.beneficiary = beneficiary;

        Ok(Response::new().add_event(Event::BeneficiarySet { beneficiary }))
    }

    /// Pays out every collected payment to the beneficiary, who must be the caller.
    pub(super) fn claim(&mut self, ctx: &Context) -> Result<Response, ExitCode> {
        ensure_sender(ctx, &self.beneficiary)?;

        let amount = std::mem::take(&mut self.collected);
        let beneficiary = self.beneficiary;
        if amount == 0 {
            return Ok(Response::new());
        }

        info!(paymaster = %ctx.address, %beneficiary, amount, "gas payments claimed");

        Ok(Response::new()
            .add_message(transfer(beneficiary, SendValue::Amount(amount))?)
            .add_event(Event::Claimed {
                beneficiary,
                amount,
            }))
    }
}
