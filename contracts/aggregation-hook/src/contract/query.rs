use hyperlane_ton_api::HookType;
use ton_utils::Address;

use super::AggregationHook;
use crate::fan_out::FanOut;

impl AggregationHook {
    pub fn hooks(&self) -> &[Address] {
        &self.hooks
    }

    /// State of a fan-out that has not finished yet.
    pub fn request_state(&self, request_id: u64) -> Option<FanOut> {
        self.requests.get(&request_id).map(|pending| pending.state)
    }

    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    pub fn hook_type(&self) -> HookType {
        HookType::Aggregation
    }
}
