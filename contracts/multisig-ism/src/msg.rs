use std::collections::HashMap;

use hyperlane_ton_api::Domain;
use ton_utils::Address;

use crate::state::ValidatorSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstantiateMsg {
    pub owner: Address,
    pub validator_sets: HashMap<Domain, ValidatorSet>,
}
