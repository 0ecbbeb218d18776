//! Core SDK types: error taxonomy and state callbacks

pub mod error;
pub mod state;

pub use error::{SdkError, SdkResult};
pub use state::{state_fn, State, StateFn};
