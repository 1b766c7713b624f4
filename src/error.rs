//! Error definitions for document loading, configuration, and output.

use thiserror::Error;

#[derive(Debug, Error)]
/// Top-level error type returned by public APIs.
///
/// Schema synthesis itself never fails; these errors only cover inputs that
/// cannot be traversed at all.
pub enum CodegenError {
    /// Invalid JSON or a structurally invalid interface-definition document.
    #[error("document error: {0}")]
    DocumentError(String),
    /// Invalid generator configuration.
    #[error("config error: {0}")]
    ConfigError(String),
    /// Output serialization failure.
    #[error("serialization error: {0}")]
    SerializationError(String),
    /// Filesystem I/O error from CLI or callers that propagate I/O.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
