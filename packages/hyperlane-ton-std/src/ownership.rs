use error_stack::{ensure, Result};
use hyperlane_ton_api::ExitCode;
use ton_sandbox::{Context, Event};
use ton_utils::Address;
use tracing::info;

/// Single owner gating the administrative entry points of a contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ownership {
    owner: Address,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OwnershipTransferred {
    pub previous: Address,
    pub owner: Address,
}

impl From<OwnershipTransferred> for Event {
    fn from(other: OwnershipTransferred) -> Self {
        Event::new("ownership_transferred")
            .add_attribute("previous_owner", other.previous)
            .add_attribute("owner", other.owner)
    }
}

impl Ownership {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn ensure_owner(&self, ctx: &Context) -> Result<(), ExitCode> {
        ensure!(ctx.sender == self.owner, ExitCode::UnauthorizedSender);
        Ok(())
    }

    pub fn transfer(
        &mut self,
        ctx: &Context,
        owner: Address,
    ) -> Result<OwnershipTransferred, ExitCode> {
        self.ensure_owner(ctx)?;

        let previous = std::mem::replace(&mut self.owner, owner);
        info!(contract = %ctx.address, %previous, %owner, "ownership transferred");

        Ok(OwnershipTransferred { previous, owner })
    }
}
