//! Identity-level encryption round trips.

use pash_core::cipher::{self, MIN_HEX_LEN};
use pash_core::kdf::{DerivationOptions, DerivationStrategy, KdfParams};
use pash_core::pash::{Pash, PashKeyKind};

fn fast_pash(master: &str, user: &str) -> Pash {
    let opts = DerivationOptions::new(DerivationStrategy::Combined, KdfParams { iterations: 10 });
    Pash::with_options(master, user, opts).unwrap()
}

#[test]
fn pash_encrypts_with_its_red_key() {
    let pash = fast_pash("master", "user");
    let hex = pash.encrypt("service list").unwrap();
    let key = pash.pash_key(PashKeyKind::Encryption).unwrap();
    assert_eq!(cipher::decrypt(key.expose(), &hex).as_deref(), Some("service list"));
}

#[test]
fn other_identities_cannot_decrypt() {
    let hex = fast_pash("master", "user").encrypt("secret").unwrap();
    assert_eq!(fast_pash("master!", "user").decrypt(&hex), None);
    assert_eq!(fast_pash("master", "user2").decrypt(&hex), None);
    assert_eq!(fast_pash("master", " U SER ").decrypt(&hex).as_deref(), Some("secret"));
}

#[test]
fn first_hex_digit_incremented_fails() {
    let pash = fast_pash("master", "user");
    let hex = pash.encrypt("hi").unwrap();
    let first = u8::from_str_radix(&hex[..1], 16).unwrap();
    let bumped = format!("{:x}{}", (first + 1) % 16, &hex[1..]);
    assert_eq!(pash.decrypt(&bumped), None);
}

#[test]
fn long_non_ascii_plaintext() {
    let pash = fast_pash("master", "user");
    let text = "Hello World! Non-ASCII: áçêñtòs ☃ ".repeat(20);
    let hex = pash.encrypt(&text).unwrap();
    assert_eq!(hex.len(), MIN_HEX_LEN + 2 * text.len());
    assert_eq!(pash.decrypt(&hex), Some(text));
}
