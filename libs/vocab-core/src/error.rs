//! Error types for vocab-core.

use thiserror::Error;

/// Result type alias using EngineError.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised by the engine for caller mistakes.
///
/// Skew between persisted state and loaded content is deliberately not an
/// error (unknown persisted keys are skipped during merge), and selection
/// over an empty or unloaded pool returns an empty list instead of failing.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown word '{key}'")]
    UnknownWord { key: String },
}
