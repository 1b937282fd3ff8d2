//! Deploys the hyperlane contracts onto a sandbox chain and drives them the way a deployer, a
//! relayer and token holders would.

pub mod aggregation_hook_contract;
pub mod config;
pub mod contract;
pub mod interchain_gas_paymaster_contract;
pub mod jetton_contract;
pub mod mailbox_contract;
pub mod merkle_tree_hook_contract;
pub mod multisig_ism_contract;
pub mod protocol;
pub mod protocol_fee_hook_contract;
pub mod token_router_contract;
pub mod validator;
pub mod validator_announce_contract;

pub use contract::{Contract, Error};
