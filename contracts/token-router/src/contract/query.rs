use std::collections::HashMap;

use hyperlane_ton_api::{AmountEncoding, Domain, TokenStandard};
use ton_utils::{Address, B256};

use super::TokenRouter;
use crate::state::Token;

impl TokenRouter {
    /// Remote routers enrolled per domain.
    pub fn routers(&self) -> &HashMap<Domain, B256> {
        &self.routers
    }

    pub fn router(&self, domain: Domain) -> Option<B256> {
        self.routers.get(&domain).copied()
    }

    pub fn ism(&self) -> Option<Address> {
        self.ism
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    pub fn mailbox(&self) -> Address {
        self.config.mailbox
    }

    pub fn token(&self) -> Token {
        self.config.token
    }

    pub fn standard(&self) -> TokenStandard {
        self.config.token.standard()
    }

    pub fn amount_encoding(&self) -> AmountEncoding {
        self.config.amount_encoding
    }

    /// Outbound transfers whose dispatch has not been answered yet.
    pub fn pending_transfers(&self) -> usize {
        self.transfers.len()
    }

    /// Inbound jetton credits not yet confirmed by the recipient's wallet.
    pub fn pending_credits(&self) -> usize {
        self.credits.len()
    }
}
