//! Configuration compiler for hashictl
//!
//! This crate turns a tree of stanza-based configuration files into an
//! in-memory model. Files are macro-expanded by the template renderer,
//! parsed into a typed stanza tree, and merged into a deduplicated
//! [`Config`] accumulator.

pub mod context;
pub mod document;
pub mod loader;
pub mod model;
pub mod parser;
pub mod renderer;
pub mod scanner;
pub mod variables;

pub use context::CompileContext;
pub use document::{Attribute, Document, Literal, Stanza};
pub use loader::ConfigLoader;
pub use parser::Config;
pub use renderer::Renderer;
pub use scanner::Scanner;
