pub mod contract;
pub mod events;
pub mod msg;
mod state;

pub use contract::ValidatorAnnounce;
pub use state::Config;
