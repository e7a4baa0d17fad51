//! Builder methods for creating errors with context

use super::types::Error;
use std::path::PathBuf;

// Helper methods for creating errors with context
impl Error {
    /// Create a stanza parse error with context
    #[must_use]
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create an unexpected-key error for an unrecognized stanza key
    #[must_use]
    pub fn unexpected_key(key: impl Into<String>, context: impl Into<String>) -> Self {
        Error::UnexpectedKey {
            key: key.into(),
            context: context.into(),
        }
    }

    /// Create an unexpected-type error for a mistyped literal
    #[must_use]
    pub fn unexpected_type(
        field: impl Into<String>,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        Error::UnexpectedType {
            field: field.into(),
            expected,
            found: found.into(),
        }
    }

    /// Create a template rendering error
    #[must_use]
    pub fn template(file: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Template {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a missing template variable error
    #[must_use]
    pub fn missing_variable(variable: impl Into<String>) -> Self {
        Error::MissingVariable {
            variable: variable.into(),
        }
    }

    /// Create a recursion-limit error for runaway template expansion
    #[must_use]
    pub fn render_recursion(file: impl Into<String>, depth: usize) -> Self {
        Error::RenderRecursion {
            file: file.into(),
            depth,
        }
    }

    /// Create an immutable-backend error for a mount/auth re-definition
    #[must_use]
    pub fn immutable_backend(
        kind: &'static str,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::ImmutableBackend {
            kind,
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create a JSON error
    #[must_use]
    pub fn json(message: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Json {
            message: message.into(),
            source,
        }
    }

    /// Create a remote store error
    #[must_use]
    pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Remote {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    #[must_use]
    pub fn timeout(operation: impl Into<String>, duration: std::time::Duration) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Wrap an error with the file it originated from
    #[must_use]
    pub fn in_file(file: impl Into<String>, source: Error) -> Self {
        Error::File {
            file: file.into(),
            source: Box::new(source),
        }
    }

    /// Collapse a list of errors into a single error value.
    ///
    /// Returns `None` for an empty list, the error itself for a single
    /// entry, and `Error::Multiple` otherwise.
    pub fn aggregate(mut errors: Vec<Error>) -> Option<Error> {
        match errors.len() {
            0 => None,
            1 => Some(errors.remove(0)),
            _ => Some(Error::Multiple { errors }),
        }
    }

    /// Turn a list of errors into a `Result`, `Ok` when the list is empty
    pub fn aggregate_result(errors: Vec<Error>) -> super::Result<()> {
        match Error::aggregate(errors) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
