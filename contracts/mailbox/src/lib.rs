pub mod contract;
pub mod events;
pub mod msg;
mod state;

pub use contract::Mailbox;
pub use state::Config;
