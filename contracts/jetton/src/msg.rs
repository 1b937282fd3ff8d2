use ton_utils::Address;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstantiateMsg {
    /// Only the admin may mint. Burns with a custom payload are relayed to it.
    pub admin: Address,
}
