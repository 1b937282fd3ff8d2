use error_stack::{Result, ResultExt};
use hyperlane_ton_api::msg::{encode_body, Answer, Request};
use hyperlane_ton_api::{CellCodec, ExitCode, OpCode};
use ton_sandbox::{OutMessage, SendValue};
use ton_utils::{Address, CellBuilder};

/// A request to `to`, carrying `value`.
pub fn request<R: Request>(
    to: Address,
    query_id: u64,
    request: &R,
    value: SendValue,
) -> Result<OutMessage, ExitCode> {
    let body = request
        .to_body(query_id)
        .change_context(ExitCode::CellOverflow)?;

    Ok(OutMessage::new(to, value, body))
}

/// A payload sent under an explicit op, for payloads shared by several entry points.
pub fn send<T: CellCodec>(
    to: Address,
    op: OpCode,
    query_id: u64,
    payload: &T,
    value: SendValue,
) -> Result<OutMessage, ExitCode> {
    let body = encode_body(op, query_id, payload).change_context(ExitCode::CellOverflow)?;

    Ok(OutMessage::new(to, value, body))
}

/// A reply to `to`. Replies never bounce, so a vanished caller cannot make the replying
/// transaction fail retroactively.
pub fn answer<T: CellCodec>(
    to: Address,
    answer: &Answer<T>,
    value: SendValue,
) -> Result<OutMessage, ExitCode> {
    let body = answer.to_body().change_context(ExitCode::CellOverflow)?;

    Ok(OutMessage::new(to, value, body).non_bounceable())
}

/// A plain value transfer with an empty body.
pub fn transfer(to: Address, value: SendValue) -> Result<OutMessage, ExitCode> {
    let body = CellBuilder::new()
        .build()
        .change_context(ExitCode::CellOverflow)?;

    Ok(OutMessage::new(to, value, body).non_bounceable())
}
