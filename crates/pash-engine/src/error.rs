//! Engine error types for `pash-engine`.

use pash_core::CryptoError;
use thiserror::Error;

/// Errors produced by the derivation worker and engine configuration.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Derivation, formatting or encryption failed inside the core.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The worker thread has stopped or its queue is closed.
    #[error("derivation worker unavailable")]
    WorkerUnavailable,

    /// The request was cancelled before the worker ran it.
    #[error("request {0} cancelled")]
    Cancelled(u64),

    /// The worker answered with a different response kind than requested.
    #[error("unexpected response to {0} request")]
    UnexpectedResponse(&'static str),

    /// Configuration value out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading or writing the configuration file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
