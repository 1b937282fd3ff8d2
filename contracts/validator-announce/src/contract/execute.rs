use error_stack::{ensure, report, Result, ResultExt};
use hyperlane_ton_api::checkpoint::announcement_digest;
use hyperlane_ton_api::msg::{Announce, Answer};
use hyperlane_ton_api::{ExitCode, OpCode};
use hyperlane_ton_std::answer;
use ton_sandbox::{Context, Response, SendValue};
use tracing::info;

use super::ValidatorAnnounce;
use crate::events::Event;
use crate::state::replay_id;

impl ValidatorAnnounce {
    /// Records where `validator` publishes its signatures, once per location, if the validator
    /// itself signed the announcement.
    pub(super) fn announce(
        &mut self,
        ctx: &Context,
        query_id: u64,
        request: Announce,
    ) -> Result<Response, ExitCode> {
        let Announce {
            validator,
            storage_location,
            signature,
        } = request;

        let replay_id = replay_id(&validator, &storage_location);
        ensure!(
            !self.replay_protection.contains(&replay_id),
            ExitCode::StorageLocationReplay
        );

        let digest = announcement_digest(
            self.config.local_domain,
            &self.config.mailbox,
            &storage_location,
        );
        let signer = signature
            .recover(&digest)
            .map_err(|err| report!(ExitCode::from(err)).attach_printable(err))?;
        ensure!(signer == validator, ExitCode::WrongValidator);

        self.replay_protection.insert(replay_id);
        if !self.storage_locations.contains_key(&validator) {
            self.validators.push(validator);
        }
        self.storage_locations
            .entry(validator)
            .or_default()
            .push(storage_location.clone());
        info!(announce = %ctx.address, %validator, storage_location, "validator announced");

        let reply = answer(
            ctx.sender,
            &Answer::ok(OpCode::Announce, query_id, ()),
            SendValue::RemainingInbound,
        )?;

        Ok(Response::new()
            .add_message(reply)
            .add_event(Event::ValidatorAnnouncement {
                validator,
                storage_location,
            }))
    }
}
