use hyperlane_ton_api::msg::PostDispatch;
use hyperlane_ton_api::OpCode;
use ton_utils::Address;

use crate::fan_out::FanOut;

/// One post-dispatch being fanned out, keyed by the query id the sub-hooks answer with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingRequest {
    pub caller: Address,
    pub caller_op: OpCode,
    pub caller_query_id: u64,
    pub request: PostDispatch,
    pub state: FanOut,
}
