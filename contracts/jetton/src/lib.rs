//! Fungible token contracts in the style of the TON token standard: a minter that owns the supply
//! and one wallet per holder, each at an address derived from the minter and the holder.

pub mod events;
pub mod minter;
pub mod msg;
mod state;
pub mod wallet;

pub use minter::JettonMinter;
pub use state::wallet_address;
pub use wallet::JettonWallet;
