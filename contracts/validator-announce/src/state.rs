use hyperlane_ton_api::Domain;
use ton_utils::{keccak256, Address, B256};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub mailbox: Address,
    pub local_domain: Domain,
}

/// Identifies one (validator, storage location) announcement.
pub fn replay_id(validator: &B256, storage_location: &str) -> B256 {
    keccak256([validator.as_slice(), storage_location.as_bytes()].concat())
}
