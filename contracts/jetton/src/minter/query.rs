use ton_utils::Address;

use super::JettonMinter;

impl JettonMinter {
    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }
}
