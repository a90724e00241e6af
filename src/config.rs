//! # Configuration
//!
//! $$
//! \text{json} \mapsto (\text{tickers}, [t_0, t_1], N_{\text{sim}}, K)
//! $$
//!
//! Explicit run configuration for the frontier and screener pipelines.

use std::fs;
use std::path::Path;

use chrono::Days;
use chrono::Local;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

use crate::error::QuantError;
use crate::error::Result;
use crate::quant::portfolio::DegeneratePolicy;
use crate::quant::portfolio::PricePanel;
use crate::quant::portfolio::PriceSeries;
use crate::quant::portfolio::SimplexSampling;
use crate::quant::portfolio::TRADING_DAYS_PER_YEAR;
use crate::quant::portfolio::select_series;

mod date_format {
  use chrono::NaiveDate;
  use serde::Deserialize;
  use serde::Deserializer;
  use serde::Serializer;

  const FORMAT: &str = "%m-%d-%Y";

  pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.format(FORMAT).to_string())
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let s = String::deserialize(deserializer)?;
    crate::quant::portfolio::parse_date(&s)
      .ok_or_else(|| serde::de::Error::custom(format!("invalid date `{s}`, expected MM-DD-YYYY")))
  }
}

fn default_periods_per_year() -> f64 {
  TRADING_DAYS_PER_YEAR
}

/// Efficient-frontier run configuration, usually read from `config.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrontierConfig {
  /// Instruments in weight order.
  pub tickers: Vec<String>,
  /// Capital to split according to the selected weights. Not used by sampling.
  #[serde(default)]
  pub capital: f64,
  /// First date of the price window (inclusive).
  #[serde(with = "date_format")]
  pub start: NaiveDate,
  /// Last date of the price window (inclusive).
  #[serde(with = "date_format")]
  pub end: NaiveDate,
  /// Number of random portfolios.
  pub simulations: usize,
  /// Number of volatility buckets.
  pub intervals: usize,
  /// Seed of the random source; drawn from the OS when absent.
  #[serde(default)]
  pub seed: Option<u64>,
  #[serde(default)]
  pub sampling: SimplexSampling,
  #[serde(default)]
  pub degenerate: DegeneratePolicy,
  #[serde(default = "default_periods_per_year")]
  pub periods_per_year: f64,
  /// Sample on the rayon pool.
  #[serde(default)]
  pub parallel: bool,
}

impl FrontierConfig {
  pub fn from_json_str(s: &str) -> Result<Self> {
    let config: Self = serde_json::from_str(s)?;
    config.validate()?;
    Ok(config)
  }

  pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
    Self::from_json_str(&fs::read_to_string(path)?)
  }

  pub fn validate(&self) -> Result<()> {
    let fail = |msg: String| Err(QuantError::InvalidConfig(msg));

    if self.tickers.is_empty() {
      return fail("`tickers` must not be empty".into());
    }
    if self.simulations == 0 {
      return fail("`simulations` must be positive".into());
    }
    if self.intervals == 0 {
      return fail("`intervals` must be positive".into());
    }
    if self.start >= self.end {
      return fail(format!("`start` ({}) must precede `end` ({})", self.start, self.end));
    }
    if !(self.capital.is_finite() && self.capital >= 0.0) {
      return fail(format!("`capital` must be non-negative, got {}", self.capital));
    }
    if !(self.periods_per_year.is_finite() && self.periods_per_year > 0.0) {
      return fail(format!(
        "`periods_per_year` must be positive, got {}",
        self.periods_per_year
      ));
    }

    Ok(())
  }

  /// Aligned panel of the configured tickers inside `[start, end]`.
  pub fn select_panel(&self, series: &[PriceSeries]) -> Result<PricePanel> {
    let window = select_series(series, &self.tickers)?
      .iter()
      .map(|s| s.window(Some(self.start), Some(self.end)))
      .collect();
    PricePanel::new(window)
  }
}

/// Breakout screener configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenerConfig {
  /// Minimum `|resistance - support| / price`.
  pub difference: f64,
  /// Maximum `|price - support| / price`.
  pub threshold: f64,
  /// Relative inertia drop below which adding clusters stops paying off.
  pub saturation: f64,
  /// Largest cluster count tried by the elbow search.
  pub max_clusters: usize,
  /// k-means++ restarts per cluster count.
  pub n_init: usize,
  /// Seed of the k-means initialisation.
  pub seed: u64,
  /// A symbol is only screened if it has a recommendation this many days
  /// before `as_of` or later.
  pub sentiment_days: u32,
  /// Reference date of the recency window; today when absent.
  pub as_of: Option<NaiveDate>,
}

impl Default for ScreenerConfig {
  fn default() -> Self {
    Self {
      difference: 0.05,
      threshold: 0.01,
      saturation: 0.05,
      max_clusters: 9,
      n_init: 10,
      seed: 0,
      sentiment_days: 365,
      as_of: None,
    }
  }
}

impl ScreenerConfig {
  /// Earliest recommendation date that counts as recent.
  pub fn sentiment_since(&self) -> NaiveDate {
    let as_of = self.as_of.unwrap_or_else(|| Local::now().date_naive());
    as_of - Days::new(u64::from(self.sentiment_days))
  }

  pub fn validate(&self) -> Result<()> {
    let positive = [
      ("difference", self.difference),
      ("threshold", self.threshold),
      ("saturation", self.saturation),
    ];
    for (name, value) in positive {
      if !(value.is_finite() && value > 0.0) {
        return Err(QuantError::InvalidConfig(format!(
          "`{name}` must be positive, got {value}"
        )));
      }
    }
    if self.max_clusters == 0 || self.n_init == 0 {
      return Err(QuantError::InvalidConfig(
        "`max_clusters` and `n_init` must be positive".into(),
      ));
    }
    if self.sentiment_days == 0 {
      return Err(QuantError::InvalidConfig(
        "`sentiment_days` must be positive".into(),
      ));
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  const CONFIG: &str = r#"{
    "tickers": ["AAA", "BBB"],
    "capital": 10000,
    "start": "01-02-2020",
    "end": "12-31-2020",
    "simulations": 1000,
    "intervals": 20
  }"#;

  #[test]
  fn parses_month_first_dates() {
    let config = FrontierConfig::from_json_str(CONFIG).unwrap();

    assert_eq!(config.tickers, vec!["AAA", "BBB"]);
    assert_eq!(config.start, NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
    assert_eq!(config.end, NaiveDate::from_ymd_opt(2020, 12, 31).unwrap());
    assert_eq!(config.seed, None);
    assert_eq!(config.sampling, SimplexSampling::NormalizedUniform);
    assert_eq!(config.periods_per_year, 250.0);
    assert!(!config.parallel);
  }

  #[test]
  fn reads_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file
      .write_all(CONFIG.replace("1000,", "10, \"seed\": 3, \"sampling\": \"dirichlet\",").as_bytes())
      .unwrap();

    let config = FrontierConfig::from_path(file.path()).unwrap();
    assert_eq!(config.simulations, 10);
    assert_eq!(config.seed, Some(3));
    assert_eq!(config.sampling, SimplexSampling::Dirichlet);
  }

  #[test]
  fn rejects_invalid_values() {
    let zero_intervals = CONFIG.replace("\"intervals\": 20", "\"intervals\": 0");
    assert!(matches!(
      FrontierConfig::from_json_str(&zero_intervals),
      Err(QuantError::InvalidConfig(_))
    ));

    let reversed = CONFIG.replace("01-02-2020", "01-02-2021");
    assert!(FrontierConfig::from_json_str(&reversed).is_err());

    let bad_date = CONFIG.replace("01-02-2020", "2nd of January");
    assert!(matches!(
      FrontierConfig::from_json_str(&bad_date),
      Err(QuantError::Json(_))
    ));
  }

  #[test]
  fn select_panel_windows_configured_tickers() {
    let config = FrontierConfig::from_json_str(CONFIG).unwrap();
    let d = |m, day| NaiveDate::from_ymd_opt(2020, m, day).unwrap();
    let series = vec![
      PriceSeries::new("BBB", vec![(d(1, 1), 1.0), (d(1, 2), 2.0), (d(1, 3), 3.0)]),
      PriceSeries::new("ZZZ", vec![(d(1, 2), 9.0)]),
      PriceSeries::new("AAA", vec![(d(1, 1), 4.0), (d(1, 2), 5.0), (d(1, 3), 6.0)]),
    ];

    let panel = config.select_panel(&series).unwrap();
    assert_eq!(panel.instruments(), &["AAA".to_string(), "BBB".to_string()]);
    assert_eq!(panel.n_observations(), 2);
  }

  #[test]
  fn sentiment_window_ends_at_as_of() {
    let config: ScreenerConfig =
      serde_json::from_str(r#"{"sentiment_days": 30, "as_of": "2024-03-31"}"#).unwrap();

    assert_eq!(config.sentiment_since(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
  }

  #[test]
  fn screener_defaults_are_valid() {
    let config: ScreenerConfig = serde_json::from_str(r#"{"threshold": 0.02}"#).unwrap();

    assert_eq!(config.threshold, 0.02);
    assert_eq!(config.difference, 0.05);
    assert_eq!(config.sentiment_days, 365);
    assert_eq!(config.as_of, None);
    assert!(config.validate().is_ok());
    assert!(ScreenerConfig {
      sentiment_days: 0,
      ..ScreenerConfig::default()
    }
    .validate()
    .is_err());
    assert!(ScreenerConfig {
      saturation: 0.0,
      ..ScreenerConfig::default()
    }
    .validate()
    .is_err());
  }
}
