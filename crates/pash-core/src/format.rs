//! Rejection-sampling password formatter.
//!
//! Provides:
//! - [`format`]: one of the built-in [`PasswordFormat`]s at a [`LengthTier`]
//! - [`format_with_spec`]: any validated [`FormatSpec`]
//! - [`draw_index`]: one uniform draw from `0..n`
//!
//! Each character costs `ceil(log2 N)` bits per attempt; out-of-range values
//! are discarded, so every character is exactly uniform over its alphabet.
//! A candidate missing a required class is discarded as a whole and the next
//! candidate is drawn from the following bits, which keeps the result uniform
//! over the set of valid passwords.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::error::CryptoError;
use crate::keystream::{BlockSource, KeyStream};
use crate::primitives::hex_encode;

// ---------------------------------------------------------------------------
// Character sets
// ---------------------------------------------------------------------------

pub const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &[u8] = b"0123456789";
pub const SYMBOLS: &[u8] = b"!#$%&()*+,-./:;<=>?@[]_{|}";

/// Hex characters in a [`PasswordFormat::Raw`] output.
pub const RAW_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The four character classes a format can require.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CharClass {
    Upper,
    Lower,
    Digit,
    Symbol,
}

impl CharClass {
    #[must_use]
    pub const fn chars(self) -> &'static [u8] {
        match self {
            Self::Upper => UPPERCASE,
            Self::Lower => LOWERCASE,
            Self::Digit => DIGITS,
            Self::Symbol => SYMBOLS,
        }
    }

    #[must_use]
    pub fn contains(self, c: u8) -> bool {
        self.chars().contains(&c)
    }
}

/// Ordered, duplicate-free set of printable ASCII characters.
///
/// Order matters: draw `v` selects `chars[v]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<u8>,
    bits: u32,
}

impl Alphabet {
    /// # Errors
    ///
    /// Returns `CryptoError::PasswordGeneration` if `chars` is empty, holds a
    /// byte that is not printable ASCII, or repeats a character.
    pub fn new(chars: &[u8]) -> Result<Self, CryptoError> {
        if chars.is_empty() {
            return Err(CryptoError::PasswordGeneration("alphabet is empty".into()));
        }
        let mut seen = [false; 128];
        for &c in chars {
            if !c.is_ascii_graphic() {
                return Err(CryptoError::PasswordGeneration(format!(
                    "alphabet byte 0x{c:02x} is not printable ASCII"
                )));
            }
            let slot = &mut seen[usize::from(c)];
            if *slot {
                return Err(CryptoError::PasswordGeneration(format!(
                    "alphabet repeats {:?}",
                    char::from(c)
                )));
            }
            *slot = true;
        }
        Ok(Self::from_trusted(chars.to_vec()))
    }

    /// Concatenation of the given classes, in order.
    ///
    /// # Errors
    ///
    /// Same as [`Alphabet::new`]; a class listed twice is a duplicate.
    pub fn from_classes(classes: &[CharClass]) -> Result<Self, CryptoError> {
        Self::new(&classes.iter().flat_map(|c| c.chars()).copied().collect::<Vec<_>>())
    }

    fn from_trusted(chars: Vec<u8>) -> Self {
        let bits = bits_for(chars.len());
        Self { chars, bits }
    }

    fn concat(parts: &[&[u8]]) -> Self {
        Self::from_trusted(parts.concat())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    #[must_use]
    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    /// `ceil(log2(len))`: bits consumed by one draw attempt.
    #[must_use]
    pub const fn bits_per_draw(&self) -> u32 {
        self.bits
    }

    fn count_outside(&self, excluded: &[CharClass]) -> usize {
        self.chars
            .iter()
            .filter(|&&c| !excluded.iter().any(|class| class.contains(c)))
            .count()
    }

    fn intersects(&self, class: CharClass) -> bool {
        self.chars.iter().any(|&c| class.contains(c))
    }
}

fn bits_for(n: usize) -> u32 {
    let max_value = n.saturating_sub(1);
    usize::BITS.saturating_sub(max_value.leading_zeros())
}

/// Output length selector. Lengths scale linearly: 1x, 2x, 3x.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LengthTier {
    Short,
    #[default]
    Medium,
    Long,
}

impl LengthTier {
    #[must_use]
    pub const fn multiplier(self) -> usize {
        match self {
            Self::Short => 1,
            Self::Medium => 2,
            Self::Long => 3,
        }
    }

    /// Inverse of [`LengthTier::multiplier`].
    #[must_use]
    pub const fn from_multiplier(multiplier: u8) -> Option<Self> {
        match multiplier {
            1 => Some(Self::Short),
            2 => Some(Self::Medium),
            3 => Some(Self::Long),
            _ => None,
        }
    }
}

/// Built-in output formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PasswordFormat {
    /// Upper-case letter, then lower-case letters and digits (at least one of each).
    #[default]
    Standard,
    /// Digits only.
    Numeric,
    /// Letters, digits and symbols, at least one of each class.
    Strong,
    /// Block 0 as 64 lowercase hex characters. Ignores the tier.
    Raw,
}

impl PasswordFormat {
    /// Characters per tier unit.
    const fn unit(self) -> usize {
        match self {
            Self::Standard => 5,
            Self::Numeric => 4,
            Self::Strong => 7,
            Self::Raw => RAW_LEN,
        }
    }

    /// Output length in characters.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // unit <= 7 and multiplier <= 3
    pub const fn length(self, tier: LengthTier) -> usize {
        match self {
            Self::Raw => RAW_LEN,
            _ => self.unit() * tier.multiplier(),
        }
    }

    /// Alphabet and class rules, or `None` for [`PasswordFormat::Raw`].
    #[must_use]
    pub fn spec(self, tier: LengthTier) -> Option<FormatSpec> {
        let length = self.length(tier);
        match self {
            Self::Standard => Some(FormatSpec {
                leading: Some(Alphabet::concat(&[UPPERCASE])),
                body: Alphabet::concat(&[LOWERCASE, DIGITS]),
                required: vec![CharClass::Lower, CharClass::Digit],
                length,
            }),
            Self::Numeric => Some(FormatSpec {
                leading: None,
                body: Alphabet::concat(&[DIGITS]),
                required: Vec::new(),
                length,
            }),
            Self::Strong => Some(FormatSpec {
                leading: None,
                body: Alphabet::concat(&[UPPERCASE, LOWERCASE, DIGITS, SYMBOLS]),
                required: vec![
                    CharClass::Upper,
                    CharClass::Lower,
                    CharClass::Digit,
                    CharClass::Symbol,
                ],
                length,
            }),
            Self::Raw => None,
        }
    }

    /// `log2` of the number of distinct outputs at `tier`.
    #[must_use]
    pub fn entropy_bits(self, tier: LengthTier) -> f64 {
        self.spec(tier).map_or(256.0, |spec| spec.entropy_bits())
    }
}

/// Alphabet(s), required classes and exact length of a formatted password.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatSpec {
    leading: Option<Alphabet>,
    body: Alphabet,
    required: Vec<CharClass>,
    length: usize,
}

impl FormatSpec {
    /// Build a custom format. `leading`, when present, supplies the first
    /// character and `body` the rest.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::PasswordGeneration` if `length` is zero, a class
    /// is required twice, or no string of `length` characters can contain
    /// every required class.
    pub fn new(
        leading: Option<Alphabet>,
        body: Alphabet,
        required: Vec<CharClass>,
        length: usize,
    ) -> Result<Self, CryptoError> {
        let spec = Self {
            leading,
            body,
            required,
            length,
        };
        spec.check_satisfiable()?;
        Ok(spec)
    }

    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn required(&self) -> &[CharClass] {
        &self.required
    }

    #[must_use]
    pub const fn body(&self) -> &Alphabet {
        &self.body
    }

    #[must_use]
    pub const fn leading(&self) -> Option<&Alphabet> {
        self.leading.as_ref()
    }

    fn check_satisfiable(&self) -> Result<(), CryptoError> {
        let fail = |msg: String| Err(CryptoError::PasswordGeneration(msg));
        if self.length == 0 {
            return fail("length must be at least 1".into());
        }
        let lead_slots = usize::from(self.leading.is_some());
        let body_slots = self.length.saturating_sub(lead_slots);

        let (mut body_only, mut lead_only, mut either) = (0usize, 0usize, 0usize);
        for (i, &class) in self.required.iter().enumerate() {
            if self.required[..i].contains(&class) {
                return fail(format!("class {class:?} required twice"));
            }
            let in_lead = self.leading.as_ref().is_some_and(|a| a.intersects(class));
            let in_body = body_slots > 0 && self.body.intersects(class);
            match (in_lead, in_body) {
                (true, true) => either = either.saturating_add(1),
                (true, false) => lead_only = lead_only.saturating_add(1),
                (false, true) => body_only = body_only.saturating_add(1),
                (false, false) => return fail(format!("no alphabet provides class {class:?}")),
            }
        }
        let spare_lead = lead_slots.saturating_sub(lead_only);
        let body_needed = body_only.saturating_add(either.saturating_sub(spare_lead));
        if lead_only > lead_slots || body_needed > body_slots {
            return fail(format!(
                "{} required classes cannot fit in {} characters",
                self.required.len(),
                self.length
            ));
        }
        Ok(())
    }

    fn satisfied_by(&self, candidate: &[u8]) -> bool {
        self.required
            .iter()
            .all(|&class| candidate.iter().any(|&c| class.contains(c)))
    }

    /// `log2` of the number of strings this format accepts, by
    /// inclusion-exclusion over the required classes.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)] // float sums; alphabet sizes < 2^7
    pub fn entropy_bits(&self) -> f64 {
        let lead_slots = usize::from(self.leading.is_some());
        let body_slots = i32::try_from(self.length.saturating_sub(lead_slots)).unwrap_or(i32::MAX);
        let mut total = 0.0_f64;
        for mask in 0..(1u32 << self.required.len()) {
            let excluded: Vec<CharClass> = self
                .required
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, &c)| c)
                .collect();
            let lead = self
                .leading
                .as_ref()
                .map_or(1.0, |a| a.count_outside(&excluded) as f64);
            let body = (self.body.count_outside(&excluded) as f64).powi(body_slots);
            let term = lead * body;
            if excluded.len() % 2 == 0 {
                total += term;
            } else {
                total -= term;
            }
        }
        total.log2()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Draw a uniform index in `0..n`.
///
/// Reads `ceil(log2 n)` bits per attempt and retries while the value is
/// `>= n`. Consumes nothing when `n == 1`.
///
/// # Errors
///
/// Returns `CryptoError::PasswordGeneration` if `n` is zero or above
/// `2^32`, and propagates stream errors.
pub fn draw_index<S: BlockSource>(stream: &mut KeyStream<S>, n: usize) -> Result<usize, CryptoError> {
    if n == 0 || u64::try_from(n).map_or(true, |n| n > 1u64 << 32) {
        return Err(CryptoError::PasswordGeneration(format!(
            "cannot draw from {n} values"
        )));
    }
    let bits = bits_for(n);
    if bits == 0 {
        return Ok(0);
    }
    loop {
        let value = usize::try_from(stream.read_bits(bits)?)
            .map_err(|_| CryptoError::PasswordGeneration("draw exceeds usize".into()))?;
        if value < n {
            return Ok(value);
        }
    }
}

/// Draw one character of `alphabet`.
///
/// # Errors
///
/// Propagates stream errors.
pub fn draw_char<S: BlockSource>(
    stream: &mut KeyStream<S>,
    alphabet: &Alphabet,
) -> Result<u8, CryptoError> {
    let index = draw_index(stream, alphabet.len())?;
    alphabet
        .chars
        .get(index)
        .copied()
        .ok_or_else(|| CryptoError::PasswordGeneration(format!("draw {index} out of range")))
}

/// Format the next password of `kind` at `tier` from `stream`.
///
/// [`PasswordFormat::Raw`] reads block 0 directly and leaves the cursor alone.
///
/// # Errors
///
/// Propagates stream errors.
pub fn format<S: BlockSource>(
    stream: &mut KeyStream<S>,
    kind: PasswordFormat,
    tier: LengthTier,
) -> Result<String, CryptoError> {
    match kind.spec(tier) {
        Some(spec) => format_with_spec(stream, &spec),
        None => Ok(hex_encode(stream.block(0)?)),
    }
}

/// Draw candidates until one contains every required class.
///
/// # Errors
///
/// Propagates stream errors. A finite block source may run out before a
/// valid candidate appears.
pub fn format_with_spec<S: BlockSource>(
    stream: &mut KeyStream<S>,
    spec: &FormatSpec,
) -> Result<String, CryptoError> {
    let mut candidate = Zeroizing::new(Vec::with_capacity(spec.length));
    loop {
        fill_candidate(stream, spec, &mut candidate)?;
        if spec.satisfied_by(&candidate) {
            return String::from_utf8(std::mem::take(&mut *candidate))
                .map_err(|_| CryptoError::PasswordGeneration("non-ASCII output".into()));
        }
    }
}

/// Replace `candidate` with a fresh draw. A failed draw leaves it wiped.
fn fill_candidate<S: BlockSource>(
    stream: &mut KeyStream<S>,
    spec: &FormatSpec,
    candidate: &mut Vec<u8>,
) -> Result<(), CryptoError> {
    candidate.zeroize();
    let drawn = draw_into(stream, spec, candidate);
    if drawn.is_err() {
        candidate.zeroize();
    }
    drawn
}

fn draw_into<S: BlockSource>(
    stream: &mut KeyStream<S>,
    spec: &FormatSpec,
    candidate: &mut Vec<u8>,
) -> Result<(), CryptoError> {
    if let Some(leading) = &spec.leading {
        candidate.push(draw_char(stream, leading)?);
    }
    while candidate.len() < spec.length {
        candidate.push(draw_char(stream, &spec.body)?);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
