//! Cryptographic error types for `pash-core`.

use thiserror::Error;

/// Errors produced by the derivation pipeline and its helpers.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key derivation failed (invalid iteration count, block index overflow).
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Bit stream read failure (invalid bit count, exhausted block source).
    #[error("key stream error: {0}")]
    KeyStream(String),

    /// Password formatting failure (invalid alphabet or unsatisfiable format).
    #[error("password generation error: {0}")]
    PasswordGeneration(String),

    /// Encryption failure (oversized plaintext, CSPRNG failure).
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Authentication tag verification failed: ciphertext tampered or wrong key.
    #[error("decryption failed: authentication tag mismatch")]
    Decryption,

    /// Hex or UTF-8 decoding failure.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Secure memory allocation failure (mlock, CSPRNG fill).
    #[error("secure memory error: {0}")]
    SecureMemory(String),

    /// Breadcrumb parameters out of range.
    #[error("breadcrumbs error: {0}")]
    Breadcrumbs(String),
}
