use hyperlane_ton_api::Domain;
use ton_utils::{Address, B256};

use super::ValidatorAnnounce;

impl ValidatorAnnounce {
    pub fn announced_validators(&self) -> &[B256] {
        &self.validators
    }

    /// Storage locations of each requested validator, empty for validators that never announced.
    pub fn announced_storage_locations(&self, validators: &[B256]) -> Vec<Vec<String>> {
        validators
            .iter()
            .map(|validator| {
                self.storage_locations
                    .get(validator)
                    .cloned()
                    .unwrap_or_default()
            })
            .collect()
    }

    pub fn mailbox(&self) -> Address {
        self.config.mailbox
    }

    pub fn local_domain(&self) -> Domain {
        self.config.local_domain
    }
}
