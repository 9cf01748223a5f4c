//! Resumable MSB-first bit reader over an indexed sequence of 256-bit blocks.

use crate::error::CryptoError;
use crate::primitives::BLOCK_LEN;

/// Bits per block.
pub const BLOCK_BITS: u64 = 256;

/// Largest bit count accepted by [`KeyStream::read_bits`].
pub const MAX_READ_BITS: u32 = 32;

/// Random-access supplier of 256-bit blocks.
///
/// Implementations must be pure per index: `block(i)` returns the same bytes
/// no matter how many other blocks were requested before.
pub trait BlockSource {
    /// # Errors
    ///
    /// Returns an error if the block cannot be produced (derivation failure,
    /// or a finite source that has no block `index`).
    fn block(&mut self, index: u32) -> Result<&[u8; BLOCK_LEN], CryptoError>;
}

impl<S: BlockSource + ?Sized> BlockSource for &mut S {
    fn block(&mut self, index: u32) -> Result<&[u8; BLOCK_LEN], CryptoError> {
        (**self).block(index)
    }
}

/// Bit cursor over a [`BlockSource`].
///
/// The cursor only moves forward. Blocks are requested lazily as the cursor
/// crosses 256-bit boundaries.
#[derive(Debug)]
pub struct KeyStream<S> {
    source: S,
    position: u64,
}

impl<S: BlockSource> KeyStream<S> {
    /// Start reading `source` at bit 0.
    pub const fn new(source: S) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    /// Number of bits consumed so far.
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.position
    }

    /// Read the next `n` bits as an unsigned big-endian integer.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyStream` if `n` is outside `1..=32` or the
    /// position runs past the last addressable block, and propagates errors
    /// from the block source.
    #[allow(clippy::arithmetic_side_effects)] // n <= 32, so `value` stays below 2^32
    pub fn read_bits(&mut self, n: u32) -> Result<u32, CryptoError> {
        if n == 0 || n > MAX_READ_BITS {
            return Err(CryptoError::KeyStream(format!(
                "bit count {n} outside 1..={MAX_READ_BITS}"
            )));
        }
        let mut value: u64 = 0;
        for _ in 0..n {
            let bit = self.next_bit()?;
            value = (value << 1) | u64::from(bit);
        }
        u32::try_from(value).map_err(|_| CryptoError::KeyStream("bit accumulator overflow".into()))
    }

    /// Direct access to block `index`, independent of the cursor.
    ///
    /// # Errors
    ///
    /// Propagates errors from the block source.
    pub fn block(&mut self, index: u32) -> Result<&[u8; BLOCK_LEN], CryptoError> {
        self.source.block(index)
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    #[allow(clippy::arithmetic_side_effects)] // shift <= 7
    fn next_bit(&mut self) -> Result<u8, CryptoError> {
        let (index, byte, shift) = locate(self.position)?;
        let block = self.source.block(index)?;
        let bit = (block[byte] >> shift) & 1;
        self.position = self
            .position
            .checked_add(1)
            .ok_or_else(|| CryptoError::KeyStream("bit position overflow".into()))?;
        Ok(bit)
    }
}

/// Split a bit position into (block index, byte within block, right shift).
#[allow(clippy::arithmetic_side_effects)] // divisors are non-zero constants; `pos % 8 <= 7`
fn locate(position: u64) -> Result<(u32, usize, u32), CryptoError> {
    let index = u32::try_from(position / BLOCK_BITS).map_err(|_| {
        CryptoError::KeyStream(format!("bit position {position} past the last block"))
    })?;
    let within = position % BLOCK_BITS;
    // `within / 8 < 32`, always fits
    let byte = (within / 8) as usize;
    let shift = 7 - (within % 8) as u32;
    Ok((index, byte, shift))
}
