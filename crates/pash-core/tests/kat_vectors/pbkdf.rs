//! Block derivation vectors.

use pash_core::context::DerivationContext;
use pash_core::kdf::{derive_block, DerivationOptions, DerivationStrategy, KdfParams};
use pash_core::keystream::BlockSource;
use pash_core::primitives::hex_encode;

const MASTER: &str = "Eu gosto de maçãs!";

#[test]
fn password_sodio_block_zero() {
    let block = derive_block(b"password", b"sodio", 0, &KdfParams::default()).unwrap();
    assert_eq!(
        hex_encode(block.expose()),
        "1f9dde59fa42dd274cc49faf9e20345a03da07c43c246b79f27d76556af8ab32"
    );
}

#[test]
fn combined_blocks() {
    let mut ctx = DerivationContext::new(MASTER, "bitu", "face", "blue").unwrap();
    let expected = [
        (0, "9e249eaf1be667ff9fbd6ace382162de20ee77c65af6da20ab22ccf906a97bdd"),
        (1, "30d43cfb34dc0c866d09153e1eaab3393f4697d75a32d48f16e30f6ec78e9311"),
        (2, "9de2a03156a20c47364265e38db3b184e1f30100f2875c88cb34b143cc745f49"),
        (5, "684abe197d7769020f9b7a3a9e0da7e1b02fc9dd8a4f51ef0543bd8b8c7c1d19"),
    ];
    for (index, hex) in expected {
        assert_eq!(hex_encode(ctx.block(index).unwrap()), hex, "block {index}");
    }
}

#[test]
fn chained_block_zero() {
    let opts = DerivationOptions::new(DerivationStrategy::Chained, KdfParams::default());
    let mut ctx = DerivationContext::with_options(MASTER, "bitu", "face", "blue", opts).unwrap();
    assert_eq!(
        hex_encode(ctx.block(0).unwrap()),
        "c4c64d32d3d722dab705408108d02bb2ffa9018d4603275391882820b04e61a6"
    );
}

#[test]
fn legacy_chained_block_zero() {
    let opts = DerivationOptions::new(DerivationStrategy::Chained, KdfParams::legacy());
    let mut ctx = DerivationContext::with_options(MASTER, "bitu", "face", "blue", opts).unwrap();
    assert_eq!(
        hex_encode(ctx.block(0).unwrap()),
        "fb1e7065a3e75612703097d8f7275ebab5138b254b2c11407b09ab925849343e"
    );
}
