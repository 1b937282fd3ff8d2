pub mod contract;
pub mod events;
pub mod msg;
mod state;

pub use contract::{HookData, ProtocolFeeHook};
pub use state::Config;
