//! Identity-level API: passwords, internal pash keys, verification and
//! encryption for one (master password, user) pair.
//!
//! Pash keys reuse the password pipeline with the reserved service name
//! `"pash"` and a reserved color per purpose, and keep block 0 raw:
//!
//! | Kind           | Color   | Used for                                   |
//! |----------------|---------|--------------------------------------------|
//! | `Verification` | `black` | first 7 hex chars detect a mistyped master |
//! | `Encryption`   | `red`   | key of [`Pash::encrypt`] / [`Pash::decrypt`] |
//! | `SyncId`       | `green` | HMAC key for [`Pash::service_sync_id`]     |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cipher;
use crate::context::DerivationContext;
use crate::error::CryptoError;
use crate::format::{self, LengthTier, PasswordFormat};
use crate::kdf::DerivationOptions;
use crate::keystream::{BlockSource, KeyStream};
use crate::memory::{SecretBuffer, SecretBytes};
use crate::primitives::{constant_time_eq, hex_encode, hmac_sha256, normalize, BLOCK_LEN};

/// Service name reserved for pash keys.
pub const PASH_SERVICE: &str = "pash";

/// Hex characters of the black key kept as a verification tag.
pub const VERIFICATION_TAG_LEN: usize = 7;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Colors offered for services. Any other string is accepted as a tag too.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Color {
    Red,
    Green,
    Blue,
    Black,
}

impl Color {
    pub const ALL: [Self; 4] = [Self::Red, Self::Green, Self::Blue, Self::Black];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Black => "black",
        }
    }

    /// Match a tag after normalization, e.g. `" Blue "` is [`Color::Blue`].
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = normalize(tag);
        Self::ALL.into_iter().find(|c| c.as_str() == tag)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Color {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Purpose of a pash key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PashKeyKind {
    Verification,
    Encryption,
    SyncId,
}

impl PashKeyKind {
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Verification => Color::Black,
            Self::Encryption => Color::Red,
            Self::SyncId => Color::Green,
        }
    }
}

/// A derived 256-bit internal key. Zeroized on drop; `Debug` is masked.
pub struct PashKey {
    kind: PashKeyKind,
    bytes: SecretBytes<BLOCK_LEN>,
}

impl PashKey {
    #[must_use]
    pub const fn kind(&self) -> PashKeyKind {
        self.kind
    }

    #[must_use]
    pub const fn expose(&self) -> &[u8; BLOCK_LEN] {
        self.bytes.expose()
    }

    /// Lowercase hex, identical to the [`PasswordFormat::Raw`] output.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex_encode(self.bytes.expose())
    }
}

impl fmt::Debug for PashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PashKey({:?}, ***)", self.kind)
    }
}

/// One master password and user name.
///
/// Every operation builds a fresh [`DerivationContext`]; nothing derived is
/// kept between calls.
pub struct Pash {
    master: SecretBuffer,
    user: String,
    options: DerivationOptions,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl Pash {
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` if the master password cannot be
    /// copied into secret memory.
    pub fn new(master_password: &str, user: &str) -> Result<Self, CryptoError> {
        Self::with_options(master_password, user, DerivationOptions::default())
    }

    /// # Errors
    ///
    /// Returns `CryptoError::KeyDerivation` for invalid `options` and
    /// `CryptoError::SecureMemory` if the master password cannot be copied.
    pub fn with_options(
        master_password: &str,
        user: &str,
        options: DerivationOptions,
    ) -> Result<Self, CryptoError> {
        options.params.validate()?;
        Ok(Self {
            master: SecretBuffer::from_text(master_password)?,
            user: user.to_owned(),
            options,
        })
    }

    /// Normalized user name.
    #[must_use]
    pub fn user(&self) -> String {
        normalize(&self.user)
    }

    #[must_use]
    pub const fn options(&self) -> DerivationOptions {
        self.options
    }

    /// Fresh derivation context for `(service, color)`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` if the master password cannot be
    /// copied.
    pub fn context(&self, service: &str, color: &str) -> Result<DerivationContext, CryptoError> {
        DerivationContext::from_master_bytes(
            self.master.expose(),
            &self.user,
            service,
            color,
            self.options,
        )
    }

    /// The password for `(service, color)` in `kind` at `tier`.
    ///
    /// # Errors
    ///
    /// Propagates derivation errors.
    pub fn generate_password(
        &self,
        service: &str,
        color: &str,
        kind: PasswordFormat,
        tier: LengthTier,
    ) -> Result<String, CryptoError> {
        let mut stream = KeyStream::new(self.context(service, color)?);
        format::format(&mut stream, kind, tier)
    }

    /// Derive the internal key of `kind`.
    ///
    /// # Errors
    ///
    /// Propagates derivation errors.
    pub fn pash_key(&self, kind: PashKeyKind) -> Result<PashKey, CryptoError> {
        let mut ctx = self.context(PASH_SERVICE, kind.color().as_str())?;
        let bytes = SecretBytes::new(*ctx.block(0)?);
        Ok(PashKey { kind, bytes })
    }

    /// First [`VERIFICATION_TAG_LEN`] hex characters of the verification key.
    ///
    /// # Errors
    ///
    /// Propagates derivation errors.
    pub fn verification_tag(&self) -> Result<String, CryptoError> {
        let mut hex = self.pash_key(PashKeyKind::Verification)?.to_hex();
        hex.truncate(VERIFICATION_TAG_LEN);
        Ok(hex)
    }

    /// Compare this master password's tag with `stored_tag` in constant
    /// time. Case-insensitive.
    ///
    /// # Errors
    ///
    /// Propagates derivation errors.
    pub fn verify_master_password(&self, stored_tag: &str) -> Result<bool, CryptoError> {
        let tag = self.verification_tag()?;
        Ok(constant_time_eq(
            tag.as_bytes(),
            stored_tag.to_ascii_lowercase().as_bytes(),
        ))
    }

    /// Stable opaque id of a service record:
    /// `hex(HMAC(sync key, ["<service>","<color>"]))`, both fields normalized.
    ///
    /// # Errors
    ///
    /// Propagates derivation errors; `CryptoError::Encoding` if the id
    /// payload cannot be serialized.
    pub fn service_sync_id(&self, service: &str, color: &str) -> Result<String, CryptoError> {
        let key = self.pash_key(PashKeyKind::SyncId)?;
        let payload = serde_json::to_string(&[normalize(service), normalize(color)])
            .map_err(|e| CryptoError::Encoding(format!("sync id payload: {e}")))?;
        Ok(hex_encode(&hmac_sha256(key.expose(), payload.as_bytes())))
    }

    /// Encrypt under the encryption pash key.
    ///
    /// # Errors
    ///
    /// Propagates derivation and encryption errors.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let key = self.pash_key(PashKeyKind::Encryption)?;
        cipher::encrypt(key.expose(), plaintext)
    }

    /// Decrypt output of [`Pash::encrypt`]; `None` on any failure.
    #[must_use]
    pub fn decrypt(&self, ciphertext_hex: &str) -> Option<String> {
        let key = self.pash_key(PashKeyKind::Encryption).ok()?;
        cipher::decrypt(key.expose(), ciphertext_hex)
    }
}

impl fmt::Debug for Pash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pash")
            .field("master", &self.master)
            .field("user", &self.user)
            .field("options", &self.options)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
