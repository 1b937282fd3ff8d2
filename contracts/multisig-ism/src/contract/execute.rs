use error_stack::Result;
use hyperlane_ton_api::msg::{Answer, SetValidatorsAndThreshold, Verify};
use hyperlane_ton_api::{ExitCode, OpCode};
use hyperlane_ton_std::answer;
use ton_sandbox::{Context, Response, SendValue};
use tracing::{info, warn};

use super::MultisigIsm;
use crate::events::Event;
use crate::state::ValidatorSet;

impl MultisigIsm {
    /// Always answers, so the caller can unwind: a rejected proof is a failed answer, not an
    /// aborted transaction.
    pub(super) fn verify_request(
        &self,
        ctx: &Context,
        query_id: u64,
        request: Verify,
    ) -> Result<Response, ExitCode> {
        let message_id = request.message.id();
        let result = self
            .verify(&request.message, &request.metadata)
            .map_err(|report| {
                warn!(ism = %ctx.address, %message_id, reason = ?report, "verification failed");
                *report.current_context()
            });

        let reply = answer(
            ctx.sender,
            &Answer {
                op: OpCode::Verify,
                query_id,
                result,
            },
            SendValue::RemainingInbound,
        )?;

        Ok(Response::new().add_message(reply))
    }

    pub(super) fn set_validators_and_threshold(
        &mut self,
        ctx: &Context,
        request: SetValidatorsAndThreshold,
    ) -> Result<Response, ExitCode> {
        self.ownership.ensure_owner(ctx)?;

        let SetValidatorsAndThreshold {
            domain,
            threshold,
            validators,
        } = request;
        let set = ValidatorSet::new(validators.clone(), threshold)?;
        self.validator_sets.insert(domain, set);
        info!(
            ism = %ctx.address,
            domain,
            threshold,
            validators = validators.len(),
            "validator set updated"
        );

        Ok(Response::new().add_event(Event::ValidatorsAndThresholdSet {
            domain,
            threshold,
            validators,
        }))
    }
}
