//! Pash key, verification tag and sync id vectors for user "bitu".

use pash_core::pash::{Pash, PashKeyKind};

const MASTER: &str = "Eu gosto de maçãs!";

#[test]
fn reserved_color_keys() {
    let pash = Pash::new(MASTER, "bitu").unwrap();
    let cases = [
        (
            PashKeyKind::Verification,
            "51f35c37b69ee99f12f364162cad77b1bb3ff314b06023b1d9190efce48a8bbe",
        ),
        (
            PashKeyKind::Encryption,
            "b99b30ba7d3b995828df0e478c4a217f21bdbe42e0ab4fdfc1ac5e79d3a06fbb",
        ),
        (
            PashKeyKind::SyncId,
            "33c2719a938efd47c01aaa94158fe8b0c7d19ef83056d16d6ee85d53769a4571",
        ),
    ];
    for (kind, hex) in cases {
        assert_eq!(pash.pash_key(kind).unwrap().to_hex(), hex, "{kind:?}");
    }
}

#[test]
fn verification_tag() {
    let pash = Pash::new(MASTER, "BITU").unwrap();
    assert_eq!(pash.verification_tag().unwrap(), "51f35c3");
}

#[test]
fn service_sync_id() {
    let pash = Pash::new(MASTER, "bitu").unwrap();
    assert_eq!(
        pash.service_sync_id("face", "blue").unwrap(),
        "21bef39ccae11d03e2709aa795d08c24b7edd820175d685e5513d1c162bcb814"
    );
}
