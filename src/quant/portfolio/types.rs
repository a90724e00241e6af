//! # Portfolio Types
//!
//! $$
//! \mathbf{w}\in\Delta^{n-1},\qquad S(\mathbf{w}) = \frac{\mathbf{w}^\top\mu}{\sqrt{\mathbf{w}^\top\Sigma\mathbf{w}}}
//! $$
//!
//! Shared enums and result containers for portfolio sampling.

use std::cmp::Reverse;

use ndarray::Array1;
use ordered_float::OrderedFloat;
use serde::Deserialize;
use serde::Serialize;

/// Long-only, fully-invested weights (non-negative, summing to one).
pub type WeightVector = Array1<f64>;

/// How random weight vectors are drawn on the simplex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimplexSampling {
  /// Independent uniforms normalized by their sum. Not uniform over the simplex.
  #[default]
  NormalizedUniform,
  /// Dirichlet(1, ..., 1), i.e. uniform over the simplex.
  Dirichlet,
}

impl SimplexSampling {
  /// Parse a string into a [`SimplexSampling`].
  pub fn from_str(s: &str) -> Self {
    match s.to_lowercase().as_str() {
      "dirichlet" | "uniform-simplex" | "flat" => Self::Dirichlet,
      _ => Self::NormalizedUniform,
    }
  }
}

/// What to do with a sample whose volatility is exactly zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DegeneratePolicy {
  /// Keep the row with a NaN Sharpe ratio.
  #[default]
  Propagate,
  /// Abort sampling with [`crate::QuantError::DegenerateSample`].
  Reject,
}

/// One simulated portfolio.
#[derive(Clone, Debug, PartialEq)]
pub struct SampledPortfolio {
  /// Portfolio weights in instrument order.
  pub weights: WeightVector,
  /// Expected annualized return `wᵀμ`.
  pub expected_return: f64,
  /// Annualized volatility `sqrt(wᵀΣw)`, never negative.
  pub volatility: f64,
  /// `expected_return / volatility`; NaN when volatility is zero.
  pub sharpe_ratio: f64,
}

impl SampledPortfolio {
  pub fn is_degenerate(&self) -> bool {
    self.volatility == 0.0
  }

  /// Cash amount per instrument for a given capital.
  pub fn allocate(&self, capital: f64) -> Vec<f64> {
    self.weights.iter().map(|w| w * capital).collect()
  }
}

/// Sampled portfolios in trial order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PortfolioTable {
  rows: Vec<SampledPortfolio>,
}

impl PortfolioTable {
  pub fn new(rows: Vec<SampledPortfolio>) -> Self {
    Self { rows }
  }

  pub fn rows(&self) -> &[SampledPortfolio] {
    &self.rows
  }

  pub fn iter(&self) -> std::slice::Iter<'_, SampledPortfolio> {
    self.rows.iter()
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  /// `(min, max)` volatility over the table.
  pub fn volatility_range(&self) -> Option<(f64, f64)> {
    self.rows.iter().map(|p| p.volatility).fold(None, |acc, v| match acc {
      None => Some((v, v)),
      Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
  }

  /// Trial index and row with the highest Sharpe ratio. NaN rows are ignored;
  /// among equal maxima the earliest trial wins.
  pub fn best_sharpe(&self) -> Option<(usize, &SampledPortfolio)> {
    self
      .rows
      .iter()
      .enumerate()
      .filter(|(_, p)| !p.sharpe_ratio.is_nan())
      .min_by_key(|(_, p)| Reverse(OrderedFloat(p.sharpe_ratio)))
  }
}

impl<'a> IntoIterator for &'a PortfolioTable {
  type Item = &'a SampledPortfolio;
  type IntoIter = std::slice::Iter<'a, SampledPortfolio>;

  fn into_iter(self) -> Self::IntoIter {
    self.rows.iter()
  }
}

/// A non-empty volatility bucket of the empirical frontier.
#[derive(Clone, Debug, PartialEq)]
pub struct FrontierPoint {
  /// Zero-based bucket index.
  pub bucket: usize,
  /// Inclusive lower volatility bound of the bucket.
  pub lower: f64,
  /// Exclusive upper volatility bound (inclusive for the last bucket).
  pub upper: f64,
  /// Trial index of the selected portfolio in the source table.
  pub trial: usize,
  /// Highest-return portfolio observed in the bucket.
  pub portfolio: SampledPortfolio,
}
