//! Typo-detection cues derived from prefixes of a master password being typed.
//!
//! A crumb is the first hex digit of `SHA-256(prefix)`, that is the high
//! nibble of the first digest byte, masked to `depth` bits. Crumbs are
//! emitted for prefixes of `step`, `2 * step`, ... characters, stopping
//! before the full input so the character still being typed never produces
//! a cue.

use crate::error::CryptoError;
use crate::primitives::sha256;

/// Largest supported crumb depth in bits.
pub const MAX_DEPTH: u8 = 8;

/// Bits a crumb can actually carry; deeper masks keep the whole digit.
pub const DIGIT_BITS: u8 = 4;

/// Compute the crumbs for `typed`.
///
/// Prefixes are counted in Unicode scalar values and hashed as UTF-8, so a
/// prefix never splits a character. Text entered as UTF-16 counts a
/// character outside the Basic Multilingual Plane (an emoji, say) as two
/// units; here it counts as one, which shifts every later prefix boundary.
///
/// Depths above [`DIGIT_BITS`] yield the same crumbs as depth 4.
///
/// # Errors
///
/// Returns `CryptoError::Breadcrumbs` if `step` is zero or `depth` is
/// outside `1..=8`.
pub fn generate(typed: &str, step: usize, depth: u8) -> Result<Vec<u8>, CryptoError> {
    if step == 0 {
        return Err(CryptoError::Breadcrumbs("step must be at least 1".into()));
    }
    if depth == 0 || depth > MAX_DEPTH {
        return Err(CryptoError::Breadcrumbs(format!(
            "depth {depth} outside 1..={MAX_DEPTH}"
        )));
    }
    let mask = u8::MAX
        .checked_shr(u32::from(MAX_DEPTH.saturating_sub(depth)))
        .unwrap_or(0);

    // byte offset where each prefix of `n` characters ends, for n >= 1
    let ends: Vec<usize> = typed
        .char_indices()
        .skip(1)
        .map(|(offset, _)| offset)
        .collect();

    Ok(ends
        .iter()
        .enumerate()
        .filter(|(i, _)| i.saturating_add(1).checked_rem(step) == Some(0))
        .map(|(_, &end)| first_hex_digit(typed[..end].as_bytes()) & mask)
        .collect())
}

fn first_hex_digit(prefix: &[u8]) -> u8 {
    sha256(prefix)[0] >> DIGIT_BITS
}
