//! Error types and result alias for hashictl operations

mod builders;
mod display;
mod types;

pub use types::{Error, Result};
