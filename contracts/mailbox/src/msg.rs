use hyperlane_ton_api::Domain;
use ton_utils::Address;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstantiateMsg {
    pub owner: Address,
    pub version: u8,
    pub local_domain: Domain,
    /// Nonce of the first dispatched message.
    pub initial_nonce: u32,
    pub default_ism: Address,
    pub default_hook: Address,
    pub required_hook: Address,
}
