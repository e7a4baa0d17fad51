//! Core types and errors shared by the hashictl crates.

pub mod constants;
pub mod errors;

pub use errors::{Error, Result};
