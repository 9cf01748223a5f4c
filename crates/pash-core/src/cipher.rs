//! HMAC-SHA256 counter-mode encryption with an encrypt-then-MAC tag.
//!
//! This module provides:
//! - [`encrypt`] / [`decrypt`]: string in, lowercase hex out (and back)
//! - [`seal`] / [`open`]: the same construction over bytes and [`SealedData`]
//!
//! # Construction
//!
//! ```text
//! k_iv  = HMAC("pash iv",  key)
//! k_pad = HMAC("pash pad", key)
//! k_mac = HMAC("pash mac", key)
//! iv    = HMAC(k_iv, random(16) || BE64(unix_millis))
//! ct_i  = pt_i ^ HMAC(k_pad, iv || BE32(i))      (32-byte blocks, last one short)
//! tag   = HMAC(k_mac, iv || ct)
//! out   = hex(iv) || hex(ct) || hex(tag)
//! ```
//!
//! The IV travels with the ciphertext, so the nonce source only affects
//! encryption: ciphertexts whose IV came from a bare timestamp still open.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::OsRng;
use rand::RngCore;
use ring::hmac;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::memory::{SecretBuffer, SecretBytes};
use crate::primitives::{
    be32, hex_decode, hex_encode, hmac_sha256, hmac_sha256_parts, tag_to_block, xor_in_place,
    BLOCK_LEN,
};

/// IV length in bytes.
pub const IV_LEN: usize = BLOCK_LEN;

/// Tag length in bytes.
pub const TAG_LEN: usize = BLOCK_LEN;

/// Random bytes mixed into each IV, ahead of the timestamp.
pub const NONCE_RANDOM_LEN: usize = 16;

/// Shortest valid hex ciphertext: IV and tag around an empty body.
pub const MIN_HEX_LEN: usize = 2 * (IV_LEN + TAG_LEN);

const LABEL_IV: &[u8] = b"pash iv";
const LABEL_PAD: &[u8] = b"pash pad";
const LABEL_MAC: &[u8] = b"pash mac";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Parsed ciphertext: `iv || ciphertext || tag`.
#[must_use = "encrypted data must be stored or transmitted"]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedData {
    pub iv: [u8; IV_LEN],
    /// Same length as the plaintext.
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_LEN],
}

impl SealedData {
    /// Lowercase hex of `iv || ciphertext || tag`.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let capacity = IV_LEN
            .saturating_add(self.ciphertext.len())
            .saturating_add(TAG_LEN);
        let mut bytes = Vec::with_capacity(capacity);
        bytes.extend_from_slice(&self.iv);
        bytes.extend_from_slice(&self.ciphertext);
        bytes.extend_from_slice(&self.tag);
        hex_encode(&bytes)
    }

    /// Parse hex (either case).
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Encoding` if `text` is not even-length hex or
    /// is shorter than [`MIN_HEX_LEN`].
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        if text.len() < MIN_HEX_LEN {
            return Err(CryptoError::Encoding(format!(
                "ciphertext too short: {} hex chars (minimum {MIN_HEX_LEN})",
                text.len()
            )));
        }
        let bytes = hex_decode(text)?;
        let ct_end = bytes
            .len()
            .checked_sub(TAG_LEN)
            .filter(|&end| end >= IV_LEN)
            .ok_or_else(|| CryptoError::Encoding("ciphertext length underflow".into()))?;

        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&bytes[..IV_LEN]);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[ct_end..]);

        Ok(Self {
            iv,
            ciphertext: bytes[IV_LEN..ct_end].to_vec(),
            tag,
        })
    }
}

/// Role-separated sub-keys; recomputed on every call, never stored.
struct CipherKeys {
    iv: SecretBytes<BLOCK_LEN>,
    pad: SecretBytes<BLOCK_LEN>,
    mac: hmac::Key,
}

impl CipherKeys {
    /// Any key length works, the empty key included.
    fn derive(key: &[u8]) -> Self {
        let mut mac = hmac_sha256(LABEL_MAC, key);
        let keys = Self {
            iv: SecretBytes::new(hmac_sha256(LABEL_IV, key)),
            pad: SecretBytes::new(hmac_sha256(LABEL_PAD, key)),
            mac: hmac::Key::new(hmac::HMAC_SHA256, &mac),
        };
        mac.zeroize();
        keys
    }

    fn tag(&self, iv: &[u8], ciphertext: &[u8]) -> [u8; TAG_LEN] {
        let mut ctx = hmac::Context::with_key(&self.mac);
        ctx.update(iv);
        ctx.update(ciphertext);
        tag_to_block(&ctx.sign())
    }

    fn verify(&self, sealed: &SealedData) -> bool {
        let mut message = Vec::with_capacity(IV_LEN.saturating_add(sealed.ciphertext.len()));
        message.extend_from_slice(&sealed.iv);
        message.extend_from_slice(&sealed.ciphertext);
        hmac::verify(&self.mac, &message, &sealed.tag).is_ok()
    }

    /// XOR the pad stream for `iv` into `data`.
    fn apply_pad(&self, iv: &[u8; IV_LEN], data: &mut [u8]) -> Result<(), CryptoError> {
        for (i, chunk) in data.chunks_mut(BLOCK_LEN).enumerate() {
            let counter = u32::try_from(i)
                .map_err(|_| CryptoError::Encryption("message exceeds 2^32 blocks".into()))?;
            let counter = be32(counter);
            let mut pad = hmac_sha256_parts(self.pad.expose(), &[iv.as_slice(), &counter]);
            xor_in_place(chunk, &pad);
            pad.zeroize();
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Encrypt `plaintext` under `key` and return lowercase hex.
///
/// Two calls with the same inputs give different outputs.
///
/// # Errors
///
/// Returns `CryptoError::Encryption` if the CSPRNG fails.
pub fn encrypt(key: &[u8], plaintext: &str) -> Result<String, CryptoError> {
    Ok(seal(key, plaintext.as_bytes())?.to_hex())
}

/// Decrypt hex produced by [`encrypt`].
///
/// Returns `None` for malformed hex, a short input, a tag mismatch or a plaintext that is not UTF-8. Nothing is decrypted before
/// the tag checks out.
#[must_use]
pub fn decrypt(key: &[u8], ciphertext_hex: &str) -> Option<String> {
    let sealed = SealedData::from_hex(ciphertext_hex).ok()?;
    let plaintext = open(key, &sealed).ok()?;
    std::str::from_utf8(plaintext.expose()).ok().map(str::to_owned)
}

/// Encrypt bytes with a fresh nonce.
///
/// # Errors
///
/// Same as [`encrypt`].
pub fn seal(key: &[u8], plaintext: &[u8]) -> Result<SealedData, CryptoError> {
    let mut nonce = fresh_nonce()?;
    let sealed = seal_with_nonce(key, plaintext, &nonce);
    nonce.zeroize();
    sealed
}

/// Authenticate and decrypt.
///
/// # Errors
///
/// Returns `CryptoError::Decryption` if the tag does not match.
pub fn open(key: &[u8], sealed: &SealedData) -> Result<SecretBuffer, CryptoError> {
    let keys = CipherKeys::derive(key);
    if !keys.verify(sealed) {
        return Err(CryptoError::Decryption);
    }
    let mut buf = sealed.ciphertext.clone();
    let result = keys
        .apply_pad(&sealed.iv, &mut buf)
        .and_then(|()| SecretBuffer::new(&buf));
    buf.zeroize();
    result
}

fn seal_with_nonce(key: &[u8], plaintext: &[u8], nonce: &[u8]) -> Result<SealedData, CryptoError> {
    let keys = CipherKeys::derive(key);
    let iv = hmac_sha256(keys.iv.expose(), nonce);
    let mut ciphertext = plaintext.to_vec();
    if let Err(e) = keys.apply_pad(&iv, &mut ciphertext) {
        ciphertext.zeroize();
        return Err(e);
    }
    let tag = keys.tag(&iv, &ciphertext);
    Ok(SealedData {
        iv,
        ciphertext,
        tag,
    })
}

/// 16 random bytes followed by the big-endian Unix time in milliseconds.
fn fresh_nonce() -> Result<Vec<u8>, CryptoError> {
    let mut random = [0u8; NONCE_RANDOM_LEN];
    OsRng
        .try_fill_bytes(&mut random)
        .map_err(|e| CryptoError::Encryption(format!("CSPRNG fill failed: {e}")))?;
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
    let mut nonce = Vec::with_capacity(NONCE_RANDOM_LEN.saturating_add(8));
    nonce.extend_from_slice(&random);
    nonce.extend_from_slice(&millis.to_be_bytes());
    random.zeroize();
    Ok(nonce)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
