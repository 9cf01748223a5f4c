//! Decryption of a ciphertext produced with key `[0x11; 32]`.

use pash_core::cipher::{decrypt, SealedData};

const KEY: [u8; 32] = [0x11; 32];

const HI: &str = "993c13effbd015cd408a2a8aed81b8be13acb5308a4c9aaa91653ccb75804033\
                  06e0\
                  b1bedc86fb19c358bc29566702a29e8c3174c73a8d99c460bd9aa367b9349f7e";

#[test]
fn decrypts_known_ciphertext() {
    assert_eq!(decrypt(&KEY, HI).as_deref(), Some("hi"));
}

#[test]
fn known_ciphertext_layout() {
    let sealed = SealedData::from_hex(HI).unwrap();
    assert_eq!(sealed.ciphertext, vec![0x06, 0xe0]);
    assert_eq!(sealed.iv[0], 0x99);
    assert_eq!(sealed.tag[31], 0x7e);
}

#[test]
fn two_block_ciphertext() {
    let hex = "993c13effbd015cd408a2a8aed81b8be13acb5308a4c9aaa91653ccb75804033\
               16f17dd5c29385aae49a218ddf481a276b53b5ec207171cb71045586cd157466\
               86a8765a9ed7b60e\
               f135ee6fb88311c59fa88a2972e0b251398255007c8d23085225384a9f9e6e9e";
    assert_eq!(decrypt(&KEY, hex).as_deref(), Some("x".repeat(40).as_str()));
}
