//! A deterministic, in-process TON chain: accounts with balances and code, internal messages
//! processed breadth-first, bounces and state rollback on failure.

mod blockchain;
mod contract;
mod flow;

pub use blockchain::{
    bounce_body, Blockchain, Error, Transaction, DEFAULT_TRANSACTION_LIMIT,
    EXIT_CODE_NOT_ENOUGH_BALANCE, EXIT_CODE_UNINITIALIZED,
};
pub use contract::{
    Context, Contract, ContractBase, ContractError, Event, OutMessage, Response, SendValue,
};
pub use flow::{FlowError, SendResult, TxPattern};
