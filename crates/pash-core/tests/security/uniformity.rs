//! Chi-square goodness of fit of [`draw_index`] against the uniform
//! distribution.
//!
//! Each test draws `500 * N` values from a fixed single-iteration context,
//! so the statistic is deterministic. Thresholds are the 0.999 quantiles of
//! the chi-square distribution with `N - 1` degrees of freedom: a biased
//! draw (e.g. modulo reduction, which favours low indices) blows far past
//! them.

use pash_core::context::DerivationContext;
use pash_core::format::draw_index;
use pash_core::kdf::{DerivationOptions, DerivationStrategy, KdfParams};
use pash_core::keystream::KeyStream;

const DRAWS_PER_VALUE: usize = 500;

#[allow(clippy::cast_precision_loss)]
fn chi_square(n: usize) -> f64 {
    let opts = DerivationOptions::new(DerivationStrategy::Combined, KdfParams { iterations: 1 });
    let ctx = DerivationContext::with_options("uniformity", "user", "service", "color", opts).unwrap();
    let mut stream = KeyStream::new(ctx);

    let mut counts = vec![0usize; n];
    for _ in 0..n * DRAWS_PER_VALUE {
        counts[draw_index(&mut stream, n).unwrap()] += 1;
    }
    let expected = DRAWS_PER_VALUE as f64;
    counts
        .iter()
        .map(|&c| {
            let d = c as f64 - expected;
            d * d / expected
        })
        .sum()
}

#[test]
fn lower_and_digit_alphabet_is_uniform() {
    let stat = chi_square(36);
    assert!(stat < 66.62, "chi-square {stat} over 35 degrees of freedom");
}

#[test]
fn digit_alphabet_is_uniform() {
    let stat = chi_square(10);
    assert!(stat < 27.88, "chi-square {stat} over 9 degrees of freedom");
}

#[test]
fn strong_alphabet_is_uniform() {
    let stat = chi_square(88);
    assert!(stat < 133.6, "chi-square {stat} over 87 degrees of freedom");
}

#[test]
fn low_indices_are_not_favoured() {
    // Under modulo reduction of 6-bit values, indices 0..28 would appear
    // twice as often as 28..36.
    let opts = DerivationOptions::new(DerivationStrategy::Combined, KdfParams { iterations: 1 });
    let ctx = DerivationContext::with_options("uniformity", "user", "service", "color", opts).unwrap();
    let mut stream = KeyStream::new(ctx);
    let draws = 36 * DRAWS_PER_VALUE;
    let low = (0..draws)
        .filter(|_| draw_index(&mut stream, 36).unwrap() < 28)
        .count();
    // uniform expectation is 28/36 = 0.778; modulo bias would give 0.875
    let share = low * 1000 / draws;
    assert!((750..=805).contains(&share), "low share {share}/1000");
}
