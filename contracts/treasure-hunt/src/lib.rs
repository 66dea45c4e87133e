pub mod commitment;
pub mod contract;
mod error;
pub mod msg;
pub mod phase;
pub mod state;

pub use crate::error::ContractError;
