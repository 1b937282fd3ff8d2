use error_stack::Result;
use hyperlane_ton_api::msg::{SetDefaultHook, SetDefaultIsm, SetRequiredHook};
use hyperlane_ton_api::ExitCode;
use ton_sandbox::{Context, Response};
use tracing::info;

use super::Mailbox;
use crate::events::Event;

impl Mailbox {
    pub(super) fn set_default_ism(
        &mut self,
        ctx: &Context,
        request: SetDefaultIsm,
    ) -> Result<Response, ExitCode> {
        self.ownership.ensure_owner(ctx)?;
        self.default_ism = request.ism;
        info!(mailbox = %ctx.address, ism = %request.ism, "default ism set");

        Ok(Response::new().add_event(Event::DefaultIsmSet { ism: request.ism }))
    }

    /// Takes effect for dispatches that have not reached their default hook yet.
    pub(super) fn set_default_hook(
        &mut self,
        ctx: &Context,
        request: SetDefaultHook,
    ) -> Result<Response, ExitCode> {
        self.ownership.ensure_owner(ctx)?;
        self.default_hook = request.hook;
        info!(mailbox = %ctx.address, hook = %request.hook, "default hook set");

        Ok(Response::new().add_event(Event::DefaultHookSet { hook: request.hook }))
    }

    pub(super) fn set_required_hook(
        &mut self,
        ctx: &Context,
        request: SetRequiredHook,
    ) -> Result<Response, ExitCode> {
        self.ownership.ensure_owner(ctx)?;
        self.required_hook = request.hook;
        info!(mailbox = %ctx.address, hook = %request.hook, "required hook set");

        Ok(Response::new().add_event(Event::RequiredHookSet { hook: request.hook }))
    }
}
