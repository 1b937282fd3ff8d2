use hyperlane_ton_api::HookType;
use ton_utils::Address;

use super::ProtocolFeeHook;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HookData {
    pub max_protocol_fee: u128,
    pub protocol_fee: u128,
    pub beneficiary: Address,
    pub hook_type: HookType,
}

impl ProtocolFeeHook {
    pub fn hook_data(&self) -> HookData {
        HookData {
            max_protocol_fee: self.config.max_protocol_fee,
            protocol_fee: self.state.protocol_fee,
            beneficiary: self.state.beneficiary,
            hook_type: HookType::ProtocolFee,
        }
    }

    pub fn protocol_fee(&self) -> u128 {
        self.state.protocol_fee
    }

    pub fn max_protocol_fee(&self) -> u128 {
        self.config.max_protocol_fee
    }

    pub fn beneficiary(&self) -> Address {
        self.state.beneficiary
    }

    pub fn collected(&self) -> u128 {
        self.state.collected
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }
}
