//! # Traits
//!
//! $$
//! \text{Trait contracts: }\mathcal{A}:\text{inputs}\to\text{trials/quotes/recommendations}
//! $$
//!
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::error::Result;
use crate::quant::screener::PriceBars;
use crate::quant::screener::Recommendation;

/// Number of consecutive trials drawn from one seeded stream in [`TrialExt::trials_par`].
pub const TRIALS_PER_STREAM: usize = 4096;

#[inline(always)]
fn splitmix64(mut z: u64) -> u64 {
  z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
  z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
  z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
  z ^ (z >> 31)
}

/// Seed of the `stream`-th independent random stream derived from `seed`.
pub fn stream_seed(seed: u64, stream: u64) -> u64 {
  splitmix64(seed ^ splitmix64(stream))
}

/// A Monte Carlo experiment whose trials are independent draws.
pub trait TrialExt: Send + Sync {
  type Output: Send;

  fn trial<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Output;

  fn trials<R: Rng + ?Sized>(&self, m: usize, rng: &mut R) -> Vec<Self::Output> {
    (0..m).map(|_| self.trial(rng)).collect()
  }

  /// Run `m` trials on the rayon pool. Trials are split into chunks of
  /// [`TRIALS_PER_STREAM`], each with its own stream, and concatenated in
  /// chunk order, so the result depends only on `seed` and not on the number
  /// of worker threads.
  fn trials_par(&self, m: usize, seed: u64) -> Vec<Self::Output> {
    let streams = m.div_ceil(TRIALS_PER_STREAM);
    let chunks: Vec<Vec<Self::Output>> = (0..streams)
      .into_par_iter()
      .map(|s| {
        let mut rng = StdRng::seed_from_u64(stream_seed(seed, s as u64));
        let len = TRIALS_PER_STREAM.min(m - s * TRIALS_PER_STREAM);
        self.trials(len, &mut rng)
      })
      .collect();

    chunks.into_iter().flatten().collect()
  }
}

/// Market data collaborator consumed by the breakout screener.
pub trait MarketDataSource {
  /// Candidate identifiers, in screening order.
  fn symbols(&self) -> Vec<String>;

  /// Dated analyst recommendations for `symbol`.
  fn recommendations(&self, symbol: &str) -> Result<Vec<Recommendation>>;

  /// High/low price history for `symbol` at the screening interval.
  fn price_bars(&self, symbol: &str) -> Result<PriceBars>;

  /// Latest traded price of `symbol`.
  fn last_price(&self, symbol: &str) -> Result<f64>;
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Coin;

  impl TrialExt for Coin {
    type Output = u32;

    fn trial<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
      rng.random_range(0..1_000_000)
    }
  }

  #[test]
  fn parallel_trials_are_reproducible() {
    let a = Coin.trials_par(TRIALS_PER_STREAM * 2 + 17, 7);
    let b = Coin.trials_par(TRIALS_PER_STREAM * 2 + 17, 7);

    assert_eq!(a.len(), TRIALS_PER_STREAM * 2 + 17);
    assert_eq!(a, b);
    assert_ne!(a, Coin.trials_par(TRIALS_PER_STREAM * 2 + 17, 8));
  }

  #[test]
  fn first_stream_matches_sequential_draws() {
    let par = Coin.trials_par(10, 3);
    let mut rng = StdRng::seed_from_u64(stream_seed(3, 0));

    assert_eq!(par, Coin.trials(10, &mut rng));
  }

  #[test]
  fn zero_trials_is_empty() {
    assert!(Coin.trials_par(0, 1).is_empty());
  }
}
