//! Secrets never reach `Debug` or `Display` output.

use pash_core::context::DerivationContext;
use pash_core::keystream::KeyStream;
use pash_core::memory::{SecretBuffer, SecretBytes};
use pash_core::pash::{Pash, PashKeyKind};

const MASTER: &str = "correct horse battery staple";

#[test]
fn secret_buffer_is_masked() {
    let buf = SecretBuffer::from_text(MASTER).unwrap();
    assert!(!format!("{buf:?}").contains("horse"));
    assert!(!format!("{buf}").contains("horse"));
}

#[test]
fn secret_bytes_is_masked() {
    let key = SecretBytes::new([0x5A; 32]);
    let shown = format!("{key:?} {key}");
    assert!(!shown.contains("5a") && !shown.contains("90"));
}

#[test]
fn context_and_stream_are_masked() {
    let ctx = DerivationContext::new(MASTER, "user", "svc", "red").unwrap();
    let stream = KeyStream::new(ctx);
    let shown = format!("{stream:?}");
    assert!(!shown.contains("horse"));
    assert!(shown.contains("user"));
}

#[test]
fn pash_and_keys_are_masked() {
    let pash = Pash::new(MASTER, "user").unwrap();
    assert!(!format!("{pash:?}").contains("horse"));
    let key = pash.pash_key(PashKeyKind::Encryption).unwrap();
    let hex = key.to_hex();
    assert!(!format!("{key:?}").contains(&hex[..8]));
}
