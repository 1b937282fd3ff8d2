use error_stack::{ensure, report, Result, ResultExt};
use hyperlane_ton_api::msg::{Answer, GetIsm, Handle, IsmAddress, Process, Processed, Verify};
use hyperlane_ton_api::{ExitCode, OpCode};
use hyperlane_ton_std::{answer, request};
use ton_sandbox::{Context, Response, SendValue};
use ton_utils::Address;
use tracing::{info, warn};

use super::Mailbox;
use crate::events::Event;
use crate::state::{PendingDelivery, PendingProcess, ProcessStage};

impl Mailbox {
    /// Accepts a relayed message and asks its recipient which ISM verifies it. Version,
    /// destination and replay are checked up front, so a rejected submission aborts and its value
    /// bounces back to the relayer.
    pub(super) fn process(
        &mut self,
        ctx: &Context,
        query_id: u64,
        process: Process,
    ) -> Result<Response, ExitCode> {
        let message = process.message;
        ensure!(
            message.version == self.config.version,
            ExitCode::WrongMailboxVersion
        );
        ensure!(
            message.destination == self.config.local_domain,
            ExitCode::WrongDestDomain
        );

        let message_id = message.id();
        ensure!(
            !self.delivered.contains(&message_id),
            ExitCode::MessageDelivered
        );

        let recipient = Address::from_hash(message.recipient);
        let outgoing_query_id = self.allocate_query_id();
        self.processes.insert(
            outgoing_query_id,
            PendingProcess {
                relayer: ctx.sender,
                relayer_query_id: query_id,
                message,
                message_id,
                metadata: process.metadata,
                stage: ProcessStage::AwaitingIsm { recipient },
            },
        );

        Ok(Response::new().add_message(request(
            recipient,
            outgoing_query_id,
            &GetIsm,
            SendValue::RemainingInbound,
        )?))
    }

    /// The recipient named its ISM. `None` falls back to the default ISM.
    pub(super) fn ism_answered(
        &mut self,
        ctx: &Context,
        query_id: u64,
        result: std::result::Result<IsmAddress, ExitCode>,
    ) -> Result<Response, ExitCode> {
        self.ensure_process_stage(
            ctx,
            query_id,
            ProcessStage::AwaitingIsm {
                recipient: ctx.sender,
            },
        )?;

        let ism = match result {
            Ok(IsmAddress { ism }) => ism.unwrap_or(self.default_ism),
            Err(code) => return self.fail_process(ctx, query_id, code),
        };

        let pending = self
            .processes
            .get_mut(&query_id)
            .ok_or_else(|| report!(ExitCode::UnauthorizedSender))?;
        pending.stage = ProcessStage::AwaitingVerification { ism };
        let verify = Verify {
            message: pending.message.clone(),
            metadata: pending.metadata.clone().unwrap_or_default(),
        };

        Ok(Response::new().add_message(request(
            ism,
            query_id,
            &verify,
            SendValue::RemainingInbound,
        )?))
    }

    /// The ISM answered. Only now is the message marked delivered and handed to its recipient.
    pub(super) fn verify_answered(
        &mut self,
        ctx: &Context,
        query_id: u64,
        result: std::result::Result<(), ExitCode>,
    ) -> Result<Response, ExitCode> {
        self.ensure_process_stage(
            ctx,
            query_id,
            ProcessStage::AwaitingVerification { ism: ctx.sender },
        )?;

        if let Err(code) = result {
            return self.fail_process(ctx, query_id, code);
        }

        let pending = self
            .processes
            .remove(&query_id)
            .ok_or_else(|| report!(ExitCode::UnauthorizedSender))?;
        // another submission of the same message may have been delivered meanwhile
        if !self.delivered.insert(pending.message_id) {
            return self.reply_failed(ctx, pending, ExitCode::MessageDelivered);
        }

        let message = &pending.message;
        let recipient = Address::from_hash(message.recipient);
        self.deliveries.insert(
            query_id,
            PendingDelivery {
                recipient,
                message_id: pending.message_id,
            },
        );

        let handle = Handle {
            origin: message.origin,
            sender: message.sender,
            body: message.body.clone(),
        };
        let processed = Processed {
            message_id: pending.message_id,
        };

        info!(
            mailbox = %ctx.address,
            message_id = %pending.message_id,
            origin = message.origin,
            %recipient,
            "message delivered"
        );

        Ok(Response::new()
            .add_message(request(
                recipient,
                query_id,
                &handle,
                SendValue::RemainingInbound,
            )?)
            .add_message(answer(
                pending.relayer,
                &Answer::ok(OpCode::Process, pending.relayer_query_id, processed),
                SendValue::Amount(0),
            )?)
            .add_event(Event::Process {
                origin: message.origin,
                sender: message.sender,
                recipient: message.recipient,
            })
            .add_event(Event::ProcessId {
                message_id: pending.message_id,
            }))
    }

    /// The recipient answered or bounced HANDLE. A failed delivery is no longer considered
    /// delivered, so the message can be processed again.
    pub(super) fn handle_answered(
        &mut self,
        ctx: &Context,
        query_id: u64,
        result: std::result::Result<(), ExitCode>,
    ) -> Result<Response, ExitCode> {
        let delivery = self
            .deliveries
            .get(&query_id)
            .copied()
            .filter(|delivery| delivery.recipient == ctx.sender)
            .ok_or_else(|| report!(ExitCode::UnauthorizedSender))
            .attach_printable_lazy(|| format!("no delivery {query_id} to {}", ctx.sender))?;
        self.deliveries.remove(&query_id);

        if let Err(code) = result {
            self.delivered.remove(&delivery.message_id);
            warn!(
                mailbox = %ctx.address,
                message_id = %delivery.message_id,
                recipient = %delivery.recipient,
                %code,
                "delivery failed, message can be processed again"
            );
        }

        Ok(Response::new())
    }

    fn ensure_process_stage(
        &self,
        ctx: &Context,
        query_id: u64,
        expected: ProcessStage,
    ) -> Result<(), ExitCode> {
        let stage = self.processes.get(&query_id).map(|pending| pending.stage);
        if stage == Some(expected) {
            return Ok(());
        }

        Err(report!(ExitCode::UnauthorizedSender)).attach_printable_lazy(|| {
            format!(
                "unexpected answer {query_id} from {}, process stage {stage:?}",
                ctx.sender
            )
        })
    }

    fn fail_process(
        &mut self,
        ctx: &Context,
        query_id: u64,
        code: ExitCode,
    ) -> Result<Response, ExitCode> {
        let pending = self
            .processes
            .remove(&query_id)
            .ok_or_else(|| report!(ExitCode::UnauthorizedSender))?;

        self.reply_failed(ctx, pending, code)
    }

    fn reply_failed(
        &self,
        ctx: &Context,
        pending: PendingProcess,
        code: ExitCode,
    ) -> Result<Response, ExitCode> {
        warn!(
            mailbox = %ctx.address,
            message_id = %pending.message_id,
            %code,
            "process failed"
        );

        Ok(Response::new().add_message(answer(
            pending.relayer,
            &Answer::<Processed>::failed(OpCode::Process, pending.relayer_query_id, code),
            SendValue::RemainingInbound,
        )?))
    }
}
