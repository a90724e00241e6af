//! # Returns Model
//!
//! $$
//! \mu_i = N\,\overline{r_i},\qquad \Sigma_{ij} = N\,\widehat{\operatorname{Cov}}(r_i, r_j)
//! $$
//!
//! Annualized expected returns and covariance from an aligned price panel.

use ndarray::Array1;
use ndarray::Array2;
use statrs::statistics::Statistics;

use super::data::PricePanel;
use super::data::simple_returns_series;
use crate::error::QuantError;
use crate::error::Result;

/// Trading-day annualization factor.
pub const TRADING_DAYS_PER_YEAR: f64 = 250.0;

/// Annualized expected return per instrument.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnVector {
  instruments: Vec<String>,
  values: Array1<f64>,
}

impl ReturnVector {
  pub fn new(instruments: Vec<String>, values: Array1<f64>) -> Result<Self> {
    if instruments.len() != values.len() {
      return Err(QuantError::DimensionMismatch {
        expected: instruments.len(),
        actual: values.len(),
      });
    }

    Ok(Self {
      instruments,
      values,
    })
  }

  pub fn instruments(&self) -> &[String] {
    &self.instruments
  }

  pub fn values(&self) -> &Array1<f64> {
    &self.values
  }

  pub fn get(&self, instrument: &str) -> Option<f64> {
    self
      .instruments
      .iter()
      .position(|i| i == instrument)
      .map(|i| self.values[i])
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

/// Annualized covariance of per-period returns.
#[derive(Clone, Debug, PartialEq)]
pub struct CovarianceMatrix {
  instruments: Vec<String>,
  values: Array2<f64>,
}

impl CovarianceMatrix {
  pub fn new(instruments: Vec<String>, values: Array2<f64>) -> Result<Self> {
    let (rows, cols) = values.dim();
    if rows != cols {
      return Err(QuantError::DimensionMismatch {
        expected: rows,
        actual: cols,
      });
    }
    if rows != instruments.len() {
      return Err(QuantError::DimensionMismatch {
        expected: instruments.len(),
        actual: rows,
      });
    }

    Ok(Self {
      instruments,
      values,
    })
  }

  pub fn instruments(&self) -> &[String] {
    &self.instruments
  }

  pub fn values(&self) -> &Array2<f64> {
    &self.values
  }

  pub fn dim(&self) -> usize {
    self.values.nrows()
  }

  pub fn get(&self, a: &str, b: &str) -> Option<f64> {
    let i = self.instruments.iter().position(|x| x == a)?;
    let j = self.instruments.iter().position(|x| x == b)?;
    Some(self.values[[i, j]])
  }

  /// Portfolio variance `wᵀ Σ w`. May come out slightly negative from rounding.
  pub fn quadratic_form(&self, weights: &Array1<f64>) -> f64 {
    weights.dot(&self.values.dot(weights))
  }
}

/// Estimates [`ReturnVector`] and [`CovarianceMatrix`] from simple returns.
#[derive(Clone, Copy, Debug)]
pub struct ReturnsModel {
  /// Number of periods per year used to annualize mean and covariance.
  pub periods_per_year: f64,
}

impl Default for ReturnsModel {
  fn default() -> Self {
    Self {
      periods_per_year: TRADING_DAYS_PER_YEAR,
    }
  }
}

impl ReturnsModel {
  pub fn new(periods_per_year: f64) -> Self {
    Self { periods_per_year }
  }

  /// Per-period simple returns, one series per instrument in panel order.
  pub fn period_returns(&self, panel: &PricePanel) -> Result<Vec<Vec<f64>>> {
    if panel.n_instruments() == 0 {
      return Err(QuantError::InvalidConfig(
        "price panel has no instruments".into(),
      ));
    }

    let observations = panel.n_observations();
    if observations < 2 {
      return Err(QuantError::InsufficientData {
        instrument: panel.instruments()[0].clone(),
        observations,
        required: 2,
      });
    }

    Ok(
      panel
        .prices()
        .columns()
        .into_iter()
        .map(|col| simple_returns_series(&col.to_vec()))
        .collect(),
    )
  }

  /// Annualized mean returns and sample covariance.
  ///
  /// With a single return period the sample covariance is undefined; it is
  /// reported as zero rather than NaN.
  pub fn compute(&self, panel: &PricePanel) -> Result<(ReturnVector, CovarianceMatrix)> {
    let returns = self.period_returns(panel)?;
    let n = returns.len();
    let periods = returns[0].len();

    let mu = Array1::from_iter(
      returns
        .iter()
        .map(|r| r.iter().mean() * self.periods_per_year),
    );

    let mut cov = Array2::<f64>::zeros((n, n));
    if periods >= 2 {
      for i in 0..n {
        for j in i..n {
          let c = returns[i].iter().covariance(returns[j].iter()) * self.periods_per_year;
          cov[[i, j]] = c;
          cov[[j, i]] = c;
        }
      }
    }

    let instruments = panel.instruments().to_vec();
    Ok((
      ReturnVector::new(instruments.clone(), mu)?,
      CovarianceMatrix::new(instruments, cov)?,
    ))
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;
  use chrono::Days;
  use chrono::NaiveDate;

  use super::*;
  use crate::quant::portfolio::data::PriceSeries;

  fn panel(columns: &[(&str, &[f64])]) -> PricePanel {
    let start = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
    let series = columns
      .iter()
      .map(|(name, prices)| {
        let points = prices
          .iter()
          .enumerate()
          .map(|(t, p)| (start + Days::new(t as u64), *p))
          .collect();
        PriceSeries::new(*name, points)
      })
      .collect();
    PricePanel::new(series).unwrap()
  }

  #[test]
  fn annualizes_mean_and_covariance() {
    let p = panel(&[
      ("AAA", &[100.0, 101.0, 99.99, 100.9899]),
      ("BBB", &[50.0, 50.5, 51.005, 50.49495]),
    ]);
    let (mu, cov) = ReturnsModel::default().compute(&p).unwrap();

    // AAA: +1%, -1%, +1%; BBB: +1%, +1%, -1%
    assert_relative_eq!(mu.get("AAA").unwrap(), 0.01 / 3.0 * 250.0, epsilon = 1e-9);
    assert_relative_eq!(mu.get("BBB").unwrap(), 0.01 / 3.0 * 250.0, epsilon = 1e-9);

    let var = (2.0 * (0.02 / 3.0_f64).powi(2) + (0.04 / 3.0_f64).powi(2)) / 2.0;
    assert_relative_eq!(cov.get("AAA", "AAA").unwrap(), var * 250.0, epsilon = 1e-9);
    assert_relative_eq!(
      cov.get("AAA", "BBB").unwrap(),
      cov.get("BBB", "AAA").unwrap(),
      epsilon = 1e-15
    );
    assert!(cov.get("AAA", "BBB").unwrap() < 0.0);
  }

  #[test]
  fn custom_annualization_factor() {
    let p = panel(&[("AAA", &[100.0, 101.0, 102.01])]);
    let (mu, _) = ReturnsModel::new(52.0).compute(&p).unwrap();

    assert_relative_eq!(mu.values()[0], 0.01 * 52.0, epsilon = 1e-9);
  }

  #[test]
  fn single_observation_is_insufficient() {
    let p = panel(&[("AAA", &[100.0]), ("BBB", &[50.0])]);
    let err = ReturnsModel::default().compute(&p).unwrap_err();

    assert!(matches!(
      err,
      QuantError::InsufficientData {
        observations: 1,
        required: 2,
        ..
      }
    ));
  }

  #[test]
  fn single_return_period_has_zero_covariance() {
    let p = panel(&[("AAA", &[100.0, 110.0]), ("BBB", &[50.0, 45.0])]);
    let (mu, cov) = ReturnsModel::default().compute(&p).unwrap();

    assert_relative_eq!(mu.values()[0], 25.0, epsilon = 1e-9);
    assert!(cov.values().iter().all(|v| *v == 0.0));
  }

  #[test]
  fn quadratic_form_matches_manual_product() {
    let cov = CovarianceMatrix::new(
      vec!["A".into(), "B".into()],
      ndarray::array![[0.04, 0.01], [0.01, 0.09]],
    )
    .unwrap();
    let w = ndarray::array![0.5, 0.5];

    assert_relative_eq!(cov.quadratic_form(&w), 0.0375, epsilon = 1e-12);
  }
}
