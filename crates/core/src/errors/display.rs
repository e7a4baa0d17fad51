//! Display implementations for error types

use super::types::Error;
use std::fmt;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse { file, message } => {
                write!(f, "failed to parse '{file}': {message}")
            }
            Error::UnexpectedKey { key, context } => {
                write!(f, "invalid key '{key}' in {context}")
            }
            Error::UnexpectedType {
                field,
                expected,
                found,
            } => {
                write!(f, "unexpected type for '{field}': want {expected}, got {found}")
            }
            Error::Template { file, message } => {
                write!(f, "failed to render template '{file}': {message}")
            }
            Error::MissingVariable { variable } => {
                write!(f, "missing template variable '{variable}'")
            }
            Error::RenderRecursion { file, depth } => {
                write!(
                    f,
                    "recursive template rendering found in '{file}' (depth {depth}), aborting"
                )
            }
            Error::ImmutableBackend {
                kind,
                name,
                message,
            } => {
                write!(f, "you are modifying an existing {kind} '{name}': {message}")
            }
            Error::Configuration { message } => {
                write!(f, "configuration error: {message}")
            }
            Error::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "file system {} operation failed for '{}': {}",
                    operation,
                    path.display(),
                    source
                )
            }
            Error::Json { message, .. } => {
                write!(f, "JSON error: {message}")
            }
            Error::Remote { operation, message } => {
                write!(f, "remote {operation} failed: {message}")
            }
            Error::Timeout {
                operation,
                duration,
            } => {
                write!(f, "timeout reached ({duration:?}) waiting for {operation}")
            }
            Error::File { file, source } => {
                write!(f, "[{file}] {source}")
            }
            Error::Multiple { errors } => {
                writeln!(f, "{} errors occurred:", errors.len())?;
                for err in errors {
                    writeln!(f, "  * {err}")?;
                }
                Ok(())
            }
        }
    }
}
