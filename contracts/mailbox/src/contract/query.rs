use hyperlane_ton_api::Domain;
use ton_utils::{Address, B256};

use super::Mailbox;

impl Mailbox {
    pub fn local_domain(&self) -> Domain {
        self.config.local_domain
    }

    pub fn version(&self) -> u8 {
        self.config.version
    }

    /// Nonce the next committed dispatch will carry.
    pub fn nonce(&self) -> u32 {
        self.nonce
    }

    pub fn latest_dispatched_id(&self) -> B256 {
        self.latest_dispatched_id
    }

    pub fn default_ism(&self) -> Address {
        self.default_ism
    }

    pub fn default_hook(&self) -> Address {
        self.default_hook
    }

    pub fn required_hook(&self) -> Address {
        self.required_hook
    }

    pub fn is_delivered(&self, message_id: &B256) -> bool {
        self.delivered.contains(message_id)
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    /// Dispatches in flight or waiting behind the one in flight.
    pub fn pending_dispatches(&self) -> usize {
        self.dispatches.len()
    }

    /// Processed messages waiting for their ISM.
    pub fn pending_processes(&self) -> usize {
        self.processes.len()
    }
}
