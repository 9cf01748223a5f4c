//! `pash-core`: deterministic password derivation for PASH.
//!
//! A master password, a user name, a service name and a color tag are turned
//! into a resumable pseudorandom bit stream ([`kdf`], [`keystream`]), which
//! the [`format`] module shapes into a password. Nothing is persisted.
//!
//! This crate is the audit target: no I/O, no async, no logging.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;
pub mod primitives;

pub mod kdf;
pub mod keystream;

pub mod context;
pub mod format;

pub mod cipher;

pub mod breadcrumbs;

pub mod pash;

pub use context::DerivationContext;
pub use error::CryptoError;
pub use format::{
    draw_char, draw_index, format_with_spec, Alphabet, CharClass, FormatSpec, LengthTier,
    PasswordFormat,
};
pub use kdf::{
    derive_block, DerivationOptions, DerivationStrategy, KdfParams, DEFAULT_ITERATIONS,
    LEGACY_ITERATIONS,
};
pub use keystream::{BlockSource, KeyStream};
pub use memory::{LockedRegion, SecretBuffer, SecretBytes};
pub use pash::{Color, Pash, PashKey, PashKeyKind, PASH_SERVICE, VERIFICATION_TAG_LEN};
pub use primitives::normalize;
pub use cipher::{decrypt, encrypt, SealedData};
