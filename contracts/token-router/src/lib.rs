pub mod contract;
pub mod events;
pub mod msg;
mod state;

pub use contract::TokenRouter;
pub use state::{Config, Token};
