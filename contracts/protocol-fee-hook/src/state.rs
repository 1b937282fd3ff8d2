use ton_utils::Address;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Upper bound the owner cannot raise the fee past.
    pub max_protocol_fee: u128,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeState {
    pub protocol_fee: u128,
    pub beneficiary: Address,
    /// Fees kept since the last collection.
    pub collected: u128,
}
