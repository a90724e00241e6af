//! # Portfolio Sampler
//!
//! $$
//! w_i = \frac{u_i}{\sum_j u_j},\quad \mu_p=\mathbf{w}^\top\mu,\quad \sigma_p=\sqrt{\max(0,\mathbf{w}^\top\Sigma\mathbf{w})}
//! $$
//!
//! Random long-only, fully-invested portfolios and their risk/return profile.

use ndarray::Array1;
use ndarray::Array2;
use rand::Rng;
use rand_distr::Exp1;
use tracing::debug;

use super::returns::CovarianceMatrix;
use super::returns::ReturnVector;
use super::types::DegeneratePolicy;
use super::types::PortfolioTable;
use super::types::SampledPortfolio;
use super::types::SimplexSampling;
use super::types::WeightVector;
use crate::error::QuantError;
use crate::error::Result;
use crate::traits::TrialExt;

/// Draws random simplex weights and evaluates them against fixed return and
/// covariance estimates.
#[derive(Clone, Debug)]
pub struct PortfolioSampler {
  mu: Array1<f64>,
  cov: Array2<f64>,
  sampling: SimplexSampling,
  policy: DegeneratePolicy,
}

impl PortfolioSampler {
  /// `n_instruments` must agree with both the return vector and the covariance.
  pub fn new(
    returns: &ReturnVector,
    covariance: &CovarianceMatrix,
    n_instruments: usize,
  ) -> Result<Self> {
    if n_instruments == 0 {
      return Err(QuantError::InvalidConfig(
        "cannot sample portfolios over zero instruments".into(),
      ));
    }
    for actual in [returns.len(), covariance.dim()] {
      if actual != n_instruments {
        return Err(QuantError::DimensionMismatch {
          expected: n_instruments,
          actual,
        });
      }
    }

    Ok(Self {
      mu: returns.values().clone(),
      cov: covariance.values().clone(),
      sampling: SimplexSampling::default(),
      policy: DegeneratePolicy::default(),
    })
  }

  pub fn with_sampling(mut self, sampling: SimplexSampling) -> Self {
    self.sampling = sampling;
    self
  }

  pub fn with_policy(mut self, policy: DegeneratePolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn n_instruments(&self) -> usize {
    self.mu.len()
  }

  pub fn sampling(&self) -> SimplexSampling {
    self.sampling
  }

  /// Draw one weight vector on the simplex.
  pub fn draw_weights<R: Rng + ?Sized>(&self, rng: &mut R) -> WeightVector {
    let n = self.n_instruments();
    loop {
      let raw = match self.sampling {
        SimplexSampling::NormalizedUniform => {
          Array1::from_shape_simple_fn(n, || rng.random::<f64>())
        }
        SimplexSampling::Dirichlet => Array1::from_shape_simple_fn(n, || rng.sample::<f64, _>(Exp1)),
      };
      let total = raw.sum();
      if total > 0.0 {
        return raw / total;
      }
    }
  }

  /// Expected return, volatility and Sharpe ratio of `weights`.
  pub fn evaluate(&self, weights: WeightVector) -> SampledPortfolio {
    let expected_return = weights.dot(&self.mu);
    let variance = weights.dot(&self.cov.dot(&weights));
    let volatility = if variance > 0.0 { variance.sqrt() } else { 0.0 };
    let sharpe_ratio = if volatility > 0.0 {
      expected_return / volatility
    } else {
      f64::NAN
    };

    SampledPortfolio {
      weights,
      expected_return,
      volatility,
      sharpe_ratio,
    }
  }

  /// Apply the degenerate-sample policy to rows in trial order.
  pub fn tabulate(&self, rows: Vec<SampledPortfolio>) -> Result<PortfolioTable> {
    let degenerate = rows.iter().filter(|p| p.is_degenerate()).count();
    if degenerate > 0 {
      if self.policy == DegeneratePolicy::Reject {
        let trial = rows.iter().position(|p| p.is_degenerate()).unwrap_or(0);
        return Err(QuantError::DegenerateSample { trial });
      }
      debug!(degenerate, "zero-volatility samples kept with NaN Sharpe ratio");
    }

    Ok(PortfolioTable::new(rows))
  }

  /// Sample `trials` portfolios sequentially from `rng`.
  pub fn sample<R: Rng + ?Sized>(&self, trials: usize, rng: &mut R) -> Result<PortfolioTable> {
    self.tabulate(self.trials(trials, rng))
  }

  /// Sample `trials` portfolios on the rayon pool; reproducible for a given seed.
  pub fn sample_par(&self, trials: usize, seed: u64) -> Result<PortfolioTable> {
    self.tabulate(self.trials_par(trials, seed))
  }
}

impl TrialExt for PortfolioSampler {
  type Output = SampledPortfolio;

  fn trial<R: Rng + ?Sized>(&self, rng: &mut R) -> SampledPortfolio {
    let weights = self.draw_weights(rng);
    self.evaluate(weights)
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;
  use ndarray::array;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  use super::*;

  fn inputs() -> (ReturnVector, CovarianceMatrix) {
    let names = vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()];
    let mu = ReturnVector::new(names.clone(), array![0.08, 0.1, 0.12]).unwrap();
    let cov = CovarianceMatrix::new(
      names,
      array![[0.04, 0.01, 0.0], [0.01, 0.09, 0.02], [0.0, 0.02, 0.16]],
    )
    .unwrap();
    (mu, cov)
  }

  #[test]
  fn weights_are_on_the_simplex() {
    let (mu, cov) = inputs();
    let mut rng = StdRng::seed_from_u64(11);

    for sampling in [SimplexSampling::NormalizedUniform, SimplexSampling::Dirichlet] {
      let sampler = PortfolioSampler::new(&mu, &cov, 3).unwrap().with_sampling(sampling);
      let table = sampler.sample(500, &mut rng).unwrap();

      assert_eq!(table.len(), 500);
      for p in &table {
        assert!(p.weights.iter().all(|w| *w >= 0.0));
        assert_relative_eq!(p.weights.sum(), 1.0, epsilon = 1e-12);
        assert!(p.volatility >= 0.0);
      }
    }
  }

  #[test]
  fn evaluate_computes_return_volatility_and_sharpe() {
    let (mu, cov) = inputs();
    let sampler = PortfolioSampler::new(&mu, &cov, 3).unwrap();
    let p = sampler.evaluate(array![0.5, 0.5, 0.0]);

    assert_relative_eq!(p.expected_return, 0.09, epsilon = 1e-12);
    assert_relative_eq!(p.volatility, 0.0375_f64.sqrt(), epsilon = 1e-12);
    assert_relative_eq!(p.sharpe_ratio, 0.09 / 0.0375_f64.sqrt(), epsilon = 1e-12);
  }

  #[test]
  fn same_seed_same_table() {
    let (mu, cov) = inputs();
    let sampler = PortfolioSampler::new(&mu, &cov, 3).unwrap();

    let a = sampler.sample(50, &mut StdRng::seed_from_u64(5)).unwrap();
    let b = sampler.sample(50, &mut StdRng::seed_from_u64(5)).unwrap();
    assert_eq!(a, b);

    let c = sampler.sample_par(5000, 9).unwrap();
    let d = sampler.sample_par(5000, 9).unwrap();
    assert_eq!(c, d);
  }

  #[test]
  fn rejects_dimension_mismatch() {
    let (mu, cov) = inputs();
    let err = PortfolioSampler::new(&mu, &cov, 2).unwrap_err();

    assert!(matches!(
      err,
      QuantError::DimensionMismatch {
        expected: 2,
        actual: 3
      }
    ));
  }

  #[test]
  fn zero_variance_instrument_follows_policy() {
    let names = vec!["CASH".to_string()];
    let mu = ReturnVector::new(names.clone(), array![0.02]).unwrap();
    let cov = CovarianceMatrix::new(names, array![[0.0]]).unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let sampler = PortfolioSampler::new(&mu, &cov, 1).unwrap();
    let table = sampler.sample(3, &mut rng).unwrap();
    assert!(table.iter().all(|p| p.volatility == 0.0 && p.sharpe_ratio.is_nan()));

    let strict = sampler.with_policy(DegeneratePolicy::Reject);
    let err = strict.sample(3, &mut rng).unwrap_err();
    assert!(matches!(err, QuantError::DegenerateSample { trial: 0 }));
  }
}
