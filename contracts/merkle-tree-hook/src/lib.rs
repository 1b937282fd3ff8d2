pub mod contract;
pub mod events;
pub mod msg;
mod state;
pub mod tree;

pub use contract::MerkleTreeHook;
pub use state::Config;
