//! HMAC-SHA256, SHA-256 and the byte/hex helpers shared by the pipeline.
//!
//! All hashing goes through `ring`. Hex is lowercase on output and
//! case-insensitive on input.

use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use ring::{digest, hmac};

use crate::error::CryptoError;

/// Output length of HMAC-SHA256 and SHA-256, and the size of one key block.
pub const BLOCK_LEN: usize = 32;

/// `HMAC-SHA256(key, message)`.
#[must_use]
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; BLOCK_LEN] {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key);
    tag_to_block(&hmac::sign(&key, message))
}

/// `HMAC-SHA256(key, parts[0] || parts[1] || ...)` without concatenating.
#[must_use]
pub fn hmac_sha256_parts(key: &[u8], parts: &[&[u8]]) -> [u8; BLOCK_LEN] {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key);
    let mut ctx = hmac::Context::with_key(&key);
    for part in parts {
        ctx.update(part);
    }
    tag_to_block(&ctx.sign())
}

/// Verify `tag == HMAC-SHA256(key, parts...)` in constant time.
#[must_use]
pub fn hmac_sha256_verify(key: &[u8], parts: &[&[u8]], tag: &[u8]) -> bool {
    let expected = hmac_sha256_parts(key, parts);
    constant_time_eq(&expected, tag)
}

pub(crate) fn tag_to_block(tag: &hmac::Tag) -> [u8; BLOCK_LEN] {
    let mut out = [0u8; BLOCK_LEN];
    out.copy_from_slice(tag.as_ref());
    out
}

/// `SHA-256(data)`.
#[must_use]
pub fn sha256(data: &[u8]) -> [u8; BLOCK_LEN] {
    let hash = digest::digest(&digest::SHA256, data);
    let mut out = [0u8; BLOCK_LEN];
    out.copy_from_slice(hash.as_ref());
    out
}

/// XOR `other` into `target`, stopping at the shorter of the two.
pub fn xor_in_place(target: &mut [u8], other: &[u8]) {
    for (t, o) in target.iter_mut().zip(other) {
        *t ^= o;
    }
}

/// Big-endian encoding of a 32-bit word.
#[must_use]
pub const fn be32(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Lowercase hex encoding.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    HEXLOWER.encode(bytes)
}

/// Decode hex (either case).
///
/// # Errors
///
/// Returns `CryptoError::Encoding` on odd length or non-hex characters.
pub fn hex_decode(text: &str) -> Result<Vec<u8>, CryptoError> {
    HEXLOWER_PERMISSIVE
        .decode(text.as_bytes())
        .map_err(|e| CryptoError::Encoding(format!("invalid hex: {e}")))
}

/// Hex encoding of the UTF-8 bytes of `text`.
#[must_use]
pub fn hex_encode_str(text: &str) -> String {
    hex_encode(text.as_bytes())
}

/// Decode hex, then UTF-8.
///
/// # Errors
///
/// Returns `CryptoError::Encoding` on malformed hex or malformed UTF-8.
pub fn hex_decode_str(text: &str) -> Result<String, CryptoError> {
    let bytes = hex_decode(text)?;
    String::from_utf8(bytes).map_err(|e| CryptoError::Encoding(format!("invalid UTF-8: {e}")))
}

/// Constant-time byte comparison.
///
/// Length is not secret here (tags and verification prefixes have public
/// sizes), so a length mismatch returns early.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Identity-field normalization: drop every whitespace character, then
/// lower-case. Never applied to the master password.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}
