pub mod contract;
pub mod events;
pub mod msg;
pub mod state;

pub use contract::MultisigIsm;
pub use state::ValidatorSet;
