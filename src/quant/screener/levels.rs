//! # Price Levels
//!
//! $$
//! k^\* = \min\left\{k : \frac{|I_{k+1}-I_k|}{I_1} < s\right\}
//! $$
//!
//! Representative price levels from an elbow search over 1-D k-means fits,
//! and the support/resistance summary built from them.

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::error::QuantError;
use crate::error::Result;
use crate::stats::kmeans::KMeans;
use crate::stats::kmeans::KMeansFit;

pub const DEFAULT_SATURATION: f64 = 0.05;
pub const DEFAULT_MAX_CLUSTERS: usize = 9;

/// Selected levels and the fits they were chosen from.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceLevels {
  /// Cluster centers of the selected fit, ascending, without duplicates.
  pub levels: Vec<f64>,
  /// Selected cluster count.
  pub clusters: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
  pub maximum: f64,
  pub minimum: f64,
  pub support: f64,
  pub resistance: f64,
}

#[derive(Clone, Debug)]
pub struct LevelClusterer {
  saturation: f64,
  max_clusters: usize,
  n_init: usize,
  seed: u64,
}

impl Default for LevelClusterer {
  fn default() -> Self {
    Self {
      saturation: DEFAULT_SATURATION,
      max_clusters: DEFAULT_MAX_CLUSTERS,
      n_init: 10,
      seed: 0,
    }
  }
}

impl LevelClusterer {
  pub fn new(saturation: f64) -> Self {
    Self {
      saturation,
      ..Self::default()
    }
  }

  pub fn max_clusters(mut self, max_clusters: usize) -> Self {
    self.max_clusters = max_clusters.max(1);
    self
  }

  pub fn n_init(mut self, n_init: usize) -> Self {
    self.n_init = n_init.max(1);
    self
  }

  pub fn seed(mut self, seed: u64) -> Self {
    self.seed = seed;
    self
  }

  /// Fits for `k = 1..=min(max_clusters, n)`, each warm-started from the
  /// previous one so inertia never increases with `k`.
  pub fn candidates(&self, series: &[f64]) -> Result<Vec<KMeansFit>> {
    if series.is_empty() {
      return Err(QuantError::InsufficientData {
        instrument: "price series".into(),
        observations: 0,
        required: 1,
      });
    }

    let k_max = self.max_clusters.min(series.len());
    let mut fits: Vec<KMeansFit> = Vec::with_capacity(k_max);
    for k in 1..=k_max {
      let fit = KMeans::new(k)
        .n_init(self.n_init)
        .seed(self.seed)
        .fit_warm(series, fits.last())?;
      fits.push(fit);
    }
    Ok(fits)
  }

  /// Index into `fits` picked by the saturation elbow rule.
  pub fn select(&self, fits: &[KMeansFit]) -> usize {
    let Some(first) = fits.first() else {
      return 0;
    };
    if first.inertia == 0.0 {
      return 0;
    }

    fits
      .windows(2)
      .position(|w| (w[1].inertia - w[0].inertia).abs() / first.inertia < self.saturation)
      .unwrap_or(fits.len() - 1)
  }

  pub fn find_levels(&self, series: &[f64]) -> Result<PriceLevels> {
    let fits = self.candidates(series)?;
    let chosen = &fits[self.select(&fits)];

    let mut levels = chosen.sorted_centers();
    levels.dedup();
    debug!(
      clusters = chosen.n_clusters(),
      inertia = chosen.inertia,
      "selected price levels"
    );

    Ok(PriceLevels {
      levels,
      clusters: chosen.n_clusters(),
    })
  }

  /// Support is the lowest level of `lows`; resistance the highest of `highs`.
  pub fn support_and_resistance(&self, highs: &[f64], lows: &[f64]) -> Result<SupportResistance> {
    let high_levels = self.find_levels(highs)?;
    let low_levels = self.find_levels(lows)?;

    Ok(SupportResistance {
      maximum: highs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
      minimum: lows.iter().copied().fold(f64::INFINITY, f64::min),
      support: low_levels.levels.first().copied().unwrap_or(f64::NAN),
      resistance: high_levels.levels.last().copied().unwrap_or(f64::NAN),
    })
  }
}
