//! Typed records produced by the stanza parser and their collections.
//!
//! Cross-references are by key (environment and application names), never
//! by pointer; equality of a reference is value equality of its keys.

mod application;
mod auth;
mod consul;
mod environment;
mod mount;
mod policy;
mod secret;

pub use application::{Application, Applications};
pub use auth::{AuthBackend, AuthBackends};
pub use consul::{ConsulCheck, ConsulKv, ConsulKvs, ConsulService, ConsulServices};
pub use environment::{Environment, Environments};
pub use mount::{Mount, Mounts, NamedData};
pub use policy::{expand_policy_level, PathCapabilities, Policies, Policy};
pub use secret::{Secret, SecretList};
