//! Remote secret hierarchy access for hashictl
//!
//! Reconstructs the compiled model from a live remote store: a bounded
//! worker-pool crawler discovers leaf paths by recursive listing, and a
//! flat reader pool fetches their values. Both use the same wait-group
//! and timeout discipline; a stalled pool is a fatal error, never a
//! partial result.

pub mod client;
pub mod crawler;
pub mod options;
pub mod reader;
pub mod waitgroup;

pub use client::SecretStore;
pub use crawler::{crawl, RemoteSecret};
pub use options::RemoteOptions;
pub use reader::read_secrets;
pub use waitgroup::WaitGroup;
