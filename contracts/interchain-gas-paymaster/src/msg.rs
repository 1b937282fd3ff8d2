use std::collections::HashMap;

use hyperlane_ton_api::{Domain, GasConfig};
use ton_utils::Address;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstantiateMsg {
    pub owner: Address,
    pub beneficiary: Address,
    pub gas_configs: HashMap<Domain, GasConfig>,
}
