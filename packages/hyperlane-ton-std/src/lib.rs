//! Plumbing shared by the contracts: reading inbound bodies, building outbound messages and
//! owner checks.

mod outbound;
mod ownership;

use error_stack::{ensure, Result, ResultExt};
use hyperlane_ton_api::msg::Header;
use hyperlane_ton_api::ExitCode;
use ton_sandbox::Context;
use ton_utils::{Address, CellParser};

pub use outbound::{answer, request, send, transfer};
pub use ownership::{OwnershipTransferred, Ownership};

/// Reads `op:32 query_id:64`. An empty body is a plain top-up and yields `None`; any other body
/// too short for a header aborts like every other underflow.
pub fn read_header(parser: &mut CellParser) -> Result<Option<Header>, ExitCode> {
    if parser.remaining_bits() == 0 {
        return Ok(None);
    }

    Header::load(parser)
        .map(Some)
        .change_context(ExitCode::CellUnderflow)
}

pub fn ensure_sender(ctx: &Context, expected: &Address) -> Result<(), ExitCode> {
    ensure!(&ctx.sender == expected, ExitCode::UnauthorizedSender);
    Ok(())
}
