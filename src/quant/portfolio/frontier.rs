//! # Frontier Extraction
//!
//! $$
//! b(\sigma) = \min\left(\left\lfloor \frac{\sigma-\sigma_{\min}}{h} \right\rfloor, K-1\right),\qquad h = \frac{\sigma_{\max}-\sigma_{\min}}{K}
//! $$
//!
//! Empirical efficient frontier: the highest-return sample in each of `K`
//! equal-width volatility buckets.

use tracing::debug;

use super::types::FrontierPoint;
use super::types::PortfolioTable;
use crate::error::QuantError;
use crate::error::Result;

/// Buckets a [`PortfolioTable`] by volatility and keeps the best return per bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrontierExtractor {
  intervals: usize,
}

impl FrontierExtractor {
  pub fn new(intervals: usize) -> Result<Self> {
    if intervals == 0 {
      return Err(QuantError::InvalidConfig(
        "frontier needs at least one volatility interval".into(),
      ));
    }
    Ok(Self { intervals })
  }

  pub fn intervals(&self) -> usize {
    self.intervals
  }

  /// Bucket of `volatility`; the maximum volatility lands in the last bucket.
  pub fn bucket_index(&self, volatility: f64, min_vol: f64, step: f64) -> usize {
    let pos = ((volatility - min_vol) / step).floor() as usize;
    pos.min(self.intervals - 1)
  }

  /// Frontier points in increasing volatility order; empty buckets are dropped.
  ///
  /// A bucket's incumbent is only replaced by a strictly greater return, so
  /// among equal returns the earliest trial is kept.
  pub fn extract(&self, table: &PortfolioTable) -> Result<Vec<FrontierPoint>> {
    let (min_vol, max_vol) = table.volatility_range().ok_or(QuantError::EmptyTable)?;
    if min_vol == max_vol {
      return Err(QuantError::DegenerateRange {
        volatility: min_vol,
      });
    }

    let step = (max_vol - min_vol) / self.intervals as f64;
    let mut best: Vec<Option<(usize, f64)>> = vec![None; self.intervals];

    for (trial, p) in table.iter().enumerate() {
      let bucket = self.bucket_index(p.volatility, min_vol, step);
      let incumbent = best[bucket].map_or(f64::NEG_INFINITY, |(_, r)| r);
      if p.expected_return > incumbent {
        best[bucket] = Some((trial, p.expected_return));
      }
    }

    let frontier: Vec<FrontierPoint> = best
      .into_iter()
      .enumerate()
      .filter_map(|(bucket, slot)| {
        slot.map(|(trial, _)| FrontierPoint {
          bucket,
          lower: min_vol + bucket as f64 * step,
          upper: min_vol + (bucket + 1) as f64 * step,
          trial,
          portfolio: table.rows()[trial].clone(),
        })
      })
      .collect();

    debug!(
      intervals = self.intervals,
      filled = frontier.len(),
      min_vol,
      max_vol,
      "extracted frontier buckets"
    );

    Ok(frontier)
  }
}
