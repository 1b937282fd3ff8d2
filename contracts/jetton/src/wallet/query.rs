use ton_utils::Address;

use super::JettonWallet;

impl JettonWallet {
    pub fn balance(&self) -> u128 {
        self.balance
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn minter(&self) -> Address {
        self.minter
    }
}
