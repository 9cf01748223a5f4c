//! Password vectors for master password "Eu gosto de maçãs!", user "bitu",
//! service "face", color "blue".

use insta::assert_snapshot;
use pash_core::context::DerivationContext;
use pash_core::format::{format, LengthTier, PasswordFormat};
use pash_core::kdf::{DerivationOptions, DerivationStrategy, KdfParams};
use pash_core::keystream::KeyStream;

const MASTER: &str = "Eu gosto de maçãs!";

fn password(options: DerivationOptions, kind: PasswordFormat, tier: LengthTier) -> String {
    let ctx = DerivationContext::with_options(MASTER, "bitu", "face", "blue", options).unwrap();
    let mut stream = KeyStream::new(ctx);
    format(&mut stream, kind, tier).unwrap()
}

fn combined(kind: PasswordFormat, tier: LengthTier) -> String {
    password(DerivationOptions::default(), kind, tier)
}

fn chained(kind: PasswordFormat, tier: LengthTier) -> String {
    let opts = DerivationOptions::new(DerivationStrategy::Chained, KdfParams::default());
    password(opts, kind, tier)
}

#[test]
fn combined_standard() {
    assert_snapshot!(combined(PasswordFormat::Standard, LengthTier::Short), @"Z0iwl");
    assert_snapshot!(combined(PasswordFormat::Standard, LengthTier::Medium), @"Y65gw10ik8");
    assert_snapshot!(combined(PasswordFormat::Standard, LengthTier::Long), @"Tjpvmpvhbc1bom4");
}

#[test]
fn combined_numeric() {
    assert_snapshot!(combined(PasswordFormat::Numeric, LengthTier::Short), @"9249");
    assert_snapshot!(combined(PasswordFormat::Numeric, LengthTier::Medium), @"92491667");
    assert_snapshot!(combined(PasswordFormat::Numeric, LengthTier::Long), @"924916679638");
}

#[test]
fn combined_strong() {
    assert_snapshot!(combined(PasswordFormat::Strong, LengthTier::Short), @"hx3)OM2");
    assert_snapshot!(combined(PasswordFormat::Strong, LengthTier::Medium), @">JT;||4hx3)OM2");
    assert_snapshot!(combined(PasswordFormat::Strong, LengthTier::Long), @">JT;||4hx3)OM2)KLZDqv");
}

#[test]
fn combined_raw() {
    assert_snapshot!(
        combined(PasswordFormat::Raw, LengthTier::Short),
        @"9e249eaf1be667ff9fbd6ace382162de20ee77c65af6da20ab22ccf906a97bdd"
    );
}

#[test]
fn chained_standard_and_numeric() {
    assert_snapshot!(chained(PasswordFormat::Standard, LengthTier::Short), @"Ymww1");
    assert_snapshot!(chained(PasswordFormat::Standard, LengthTier::Medium), @"Ymww16ba7g");
    assert_snapshot!(chained(PasswordFormat::Standard, LengthTier::Long), @"Ymww16ba7g6vxu6");
    assert_snapshot!(chained(PasswordFormat::Numeric, LengthTier::Short), @"4643");
    assert_snapshot!(chained(PasswordFormat::Numeric, LengthTier::Medium), @"46432372");
    assert_snapshot!(chained(PasswordFormat::Numeric, LengthTier::Long), @"464323722705");
}

#[test]
fn chained_strong() {
    assert_snapshot!(chained(PasswordFormat::Strong, LengthTier::Short), @"-Ga+B.5");
    assert_snapshot!(chained(PasswordFormat::Strong, LengthTier::Medium), @"-Ga+B.5Mg?gT;a");
    assert_snapshot!(chained(PasswordFormat::Strong, LengthTier::Long), @"x.]W>uit_EER?V-Ga+B.5");
}

#[test]
fn legacy_chained_short() {
    let opts = DerivationOptions::new(DerivationStrategy::Chained, KdfParams::legacy());
    assert_snapshot!(password(opts, PasswordFormat::Standard, LengthTier::Short), @"M42gw");
    assert_snapshot!(password(opts, PasswordFormat::Numeric, LengthTier::Short), @"1706");
    assert_snapshot!(password(opts, PasswordFormat::Strong, LengthTier::Short), @"h:(0b8B");
}

#[test]
fn identity_fields_are_normalized() {
    let opts = DerivationOptions::new(DerivationStrategy::Chained, KdfParams::default());
    let ctx = DerivationContext::with_options(MASTER, " BI tu", "Fa ce", "BLUE", opts).unwrap();
    let mut stream = KeyStream::new(ctx);
    let pw = format(&mut stream, PasswordFormat::Standard, LengthTier::Short).unwrap();
    assert_snapshot!(pw, @"Ymww1");
}
