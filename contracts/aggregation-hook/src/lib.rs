pub mod contract;
pub mod events;
pub mod fan_out;
pub mod msg;
mod state;

pub use contract::AggregationHook;
pub use fan_out::{FanOut, Input};
