use hyperlane_ton_api::Domain;
use ton_utils::Address;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstantiateMsg {
    /// Mailbox the announcements are bound to.
    pub mailbox: Address,
    pub local_domain: Domain,
}
