pub mod contract;
pub mod events;
pub mod msg;
mod state;

pub use contract::InterchainGasPaymaster;
pub use state::{DEFAULT_GAS_LIMIT, FALLBACK_DOMAIN, TOKEN_EXCHANGE_RATE_SCALE};
