//! Secret holders clear their bytes.

use pash_core::memory::SecretBytes;
use zeroize::Zeroize;

#[test]
fn secret_bytes_zeroize_clears_contents() {
    let mut key = SecretBytes::new([0xDE; 32]);
    assert_eq!(key.expose(), &[0xDE; 32]);
    key.zeroize();
    assert_eq!(key.expose(), &[0u8; 32]);
}

