//! Password generation through the identity-level API.

use pash_core::format::{CharClass, LengthTier, PasswordFormat};
use pash_core::kdf::{DerivationOptions, DerivationStrategy, KdfParams};
use pash_core::pash::Pash;

const TIERS: [LengthTier; 3] = [LengthTier::Short, LengthTier::Medium, LengthTier::Long];

fn fast_pash(master: &str) -> Pash {
    let opts = DerivationOptions::new(DerivationStrategy::Combined, KdfParams { iterations: 10 });
    Pash::with_options(master, "user", opts).unwrap()
}

fn has(class: CharClass, pw: &str) -> bool {
    pw.bytes().any(|b| class.contains(b))
}

#[test]
fn pash_matches_reference_password() {
    let pash = Pash::new("Eu gosto de maçãs!", "bitu").unwrap();
    let pw = pash
        .generate_password("face", "blue", PasswordFormat::Standard, LengthTier::Short)
        .unwrap();
    assert_eq!(pw, "Z0iwl");
}

#[test]
fn every_format_keeps_its_invariants() {
    for i in 0..20 {
        let pash = fast_pash(&format!("master {i}"));
        for tier in TIERS {
            let m = tier.multiplier();

            let std = pash
                .generate_password("svc", "red", PasswordFormat::Standard, tier)
                .unwrap();
            assert_eq!(std.len(), 5 * m);
            assert!(std.as_bytes()[0].is_ascii_uppercase(), "{std}");
            assert!(std[1..].bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
            assert!(has(CharClass::Lower, &std) && has(CharClass::Digit, &std));

            let num = pash
                .generate_password("svc", "red", PasswordFormat::Numeric, tier)
                .unwrap();
            assert_eq!(num.len(), 4 * m);
            assert!(num.bytes().all(|b| b.is_ascii_digit()));

            let strong = pash
                .generate_password("svc", "red", PasswordFormat::Strong, tier)
                .unwrap();
            assert_eq!(strong.len(), 7 * m);
            for class in [CharClass::Upper, CharClass::Lower, CharClass::Digit, CharClass::Symbol] {
                assert!(has(class, &strong), "{strong} lacks {class:?}");
            }
        }
    }
}

#[test]
fn colors_and_services_separate_passwords() {
    let pash = fast_pash("master");
    let a = pash
        .generate_password("mail", "red", PasswordFormat::Strong, LengthTier::Long)
        .unwrap();
    let b = pash
        .generate_password("mail", "green", PasswordFormat::Strong, LengthTier::Long)
        .unwrap();
    let c = pash
        .generate_password("bank", "red", PasswordFormat::Strong, LengthTier::Long)
        .unwrap();
    assert_ne!(a, b);
    assert_ne!(a, c);
}

#[test]
fn empty_identity_fields_are_valid() {
    let pash = fast_pash("");
    let pw = pash
        .generate_password("   ", "", PasswordFormat::Numeric, LengthTier::Medium)
        .unwrap();
    assert_eq!(pw.len(), 8);
}

#[test]
fn numeric_tiers_share_a_prefix() {
    // no whole-string rejection, so a longer tier extends the shorter one
    let pash = Pash::new("Eu gosto de maçãs!", "bitu").unwrap();
    let short = pash
        .generate_password("face", "blue", PasswordFormat::Numeric, LengthTier::Short)
        .unwrap();
    let long = pash
        .generate_password("face", "blue", PasswordFormat::Numeric, LengthTier::Long)
        .unwrap();
    assert!(long.starts_with(&short));
}
