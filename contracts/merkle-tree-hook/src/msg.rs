use ton_utils::Address;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstantiateMsg {
    pub owner: Address,
    /// The only account besides authorized hooks allowed to post dispatches.
    pub mailbox: Address,
}
