use ton_utils::Address;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstantiateMsg {
    /// Sub-hooks in the order they are invoked.
    pub hooks: Vec<Address>,
}
