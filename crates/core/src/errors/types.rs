//! Core error type definitions

use std::path::PathBuf;

/// Result type alias for hashictl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for hashictl operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Stanza grammar parsing errors
    Parse { file: String, message: String },

    /// An unrecognized key inside a stanza body
    UnexpectedKey { key: String, context: String },

    /// A literal value of the wrong type inside a stanza body
    UnexpectedType {
        field: String,
        expected: &'static str,
        found: String,
    },

    /// Template rendering errors
    Template { file: String, message: String },

    /// A `lookup` on a template variable that was never defined
    MissingVariable { variable: String },

    /// Template expansion exceeded the configured depth limit
    RenderRecursion { file: String, depth: usize },

    /// A second definition of a mount/auth backend tried to change
    /// immutable parts of the first definition
    ImmutableBackend {
        kind: &'static str,
        name: String,
        message: String,
    },

    /// Configuration errors
    Configuration { message: String },

    /// File system operations
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Remote store failures (a failed List or Read call)
    Remote { operation: String, message: String },

    /// Operation timeout errors
    Timeout {
        operation: String,
        duration: std::time::Duration,
    },

    /// An error wrapped with the file it originated from
    File {
        file: String,
        #[source]
        source: Box<Error>,
    },

    /// Several independent errors collected from one pass
    Multiple { errors: Vec<Error> },
}
