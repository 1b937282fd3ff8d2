use ton_utils::Address;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstantiateMsg {
    pub owner: Address,
    pub beneficiary: Address,
    pub protocol_fee: u128,
    pub max_protocol_fee: u128,
}
