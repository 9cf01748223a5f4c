//! Iterated-HMAC block derivation.
//!
//! This module provides:
//! - [`derive_block`]: one independently computable 256-bit block per index
//! - [`KdfParams`]: serializable iteration count
//! - [`DerivationStrategy`]: which salt chain feeds [`derive_block`]
//!
//! # Construction
//!
//! ```text
//! U_1   = HMAC(key, salt || BE32(index + 1))
//! U_k   = HMAC(key, U_{k-1})              for k in 2..=iterations
//! block = U_1 ^ U_2 ^ ... ^ U_iterations
//! ```
//!
//! The output is always one HMAC block. Unlike PBKDF2 there is no notion of
//! a requested output length: longer keys are obtained by asking for more
//! indices, and block `i` never depends on block `i - 1`.

use ring::hmac;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::memory::SecretBytes;
use crate::primitives::{be32, tag_to_block, xor_in_place, BLOCK_LEN};

/// Iteration count used by every derivation unless configured otherwise.
pub const DEFAULT_ITERATIONS: u32 = 10_000;

/// Iteration count of the earliest published derivation chain.
pub const LEGACY_ITERATIONS: u32 = 1_000;

/// Separator placed between the identity fields of the combined salt.
const SALT_SEPARATOR: u8 = b'\n';

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Work factor of [`derive_block`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KdfParams {
    /// Total HMAC rounds per block, including the first one. Must be >= 1.
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// Parameters of the legacy 1 000-round chain.
    #[must_use]
    pub const fn legacy() -> Self {
        Self {
            iterations: LEGACY_ITERATIONS,
        }
    }

    /// # Errors
    ///
    /// Returns `CryptoError::KeyDerivation` if `iterations` is zero.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.iterations == 0 {
            return Err(CryptoError::KeyDerivation(
                "iteration count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// How the identity fields are fed into [`derive_block`].
///
/// The two strategies produce unrelated outputs for the same inputs and are
/// never mixed within one derivation context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DerivationStrategy {
    /// One derivation keyed by the master password, salted with
    /// `user "\n" service "\n" color`.
    #[default]
    Combined,
    /// Three derivations at the same index: the master password salted by
    /// the user name, that output salted by the service name, and that
    /// output salted by the color.
    Chained,
}

/// Strategy plus work factor: everything besides the identity that
/// determines the derived bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivationOptions {
    pub strategy: DerivationStrategy,
    pub params: KdfParams,
}

impl DerivationOptions {
    #[must_use]
    pub const fn new(strategy: DerivationStrategy, params: KdfParams) -> Self {
        Self { strategy, params }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Derive block `index` for `(key, salt)`.
///
/// Pure: the same inputs always give the same block, so results may be
/// memoized per index. Empty keys and salts are valid input.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if `params.iterations` is zero or
/// `index` is `u32::MAX` (the block counter `index + 1` would overflow).
pub fn derive_block(
    key: &[u8],
    salt: &[u8],
    index: u32,
    params: &KdfParams,
) -> Result<SecretBytes<BLOCK_LEN>, CryptoError> {
    params.validate()?;
    let counter = index.checked_add(1).ok_or_else(|| {
        CryptoError::KeyDerivation(format!("block index {index} out of range"))
    })?;

    let key = hmac::Key::new(hmac::HMAC_SHA256, key);

    let mut ctx = hmac::Context::with_key(&key);
    ctx.update(salt);
    ctx.update(&be32(counter));
    let mut intermediate = tag_to_block(&ctx.sign());
    let mut block = intermediate;

    for _ in 1..params.iterations {
        let next = tag_to_block(&hmac::sign(&key, &intermediate));
        intermediate = next;
        xor_in_place(&mut block, &intermediate);
    }

    let out = SecretBytes::new(block);
    block.zeroize();
    intermediate.zeroize();
    Ok(out)
}

/// Salt of the [`DerivationStrategy::Combined`] chain. Fields are expected
/// to be normalized already.
#[must_use]
pub fn combined_salt(user: &str, service: &str, color: &str) -> Vec<u8> {
    let mut salt = Vec::with_capacity(
        user.len()
            .saturating_add(service.len())
            .saturating_add(color.len())
            .saturating_add(2),
    );
    salt.extend_from_slice(user.as_bytes());
    salt.push(SALT_SEPARATOR);
    salt.extend_from_slice(service.as_bytes());
    salt.push(SALT_SEPARATOR);
    salt.extend_from_slice(color.as_bytes());
    salt
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
