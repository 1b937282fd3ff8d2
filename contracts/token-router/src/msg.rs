use std::collections::HashMap;

use hyperlane_ton_api::{AmountEncoding, Domain};
use ton_utils::{Address, B256};

use crate::state::Token;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstantiateMsg {
    pub owner: Address,
    pub mailbox: Address,
    pub token: Token,
    pub amount_encoding: AmountEncoding,
    /// `None` defers verification to the mailbox default.
    pub ism: Option<Address>,
    pub routers: HashMap<Domain, B256>,
}
