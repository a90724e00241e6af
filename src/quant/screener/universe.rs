//! # Universe
//!
//! In-memory market data snapshot, usually loaded from JSON.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use super::PriceBars;
use super::Recommendation;
use crate::error::QuantError;
use crate::error::Result;
use crate::traits::MarketDataSource;

/// Everything the screener needs to know about one instrument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSnapshot {
  pub symbol: String,
  pub price: f64,
  #[serde(default)]
  pub recommendations: Vec<Recommendation>,
  #[serde(default)]
  pub highs: Vec<f64>,
  #[serde(default)]
  pub lows: Vec<f64>,
}

/// Ordered list of snapshots serving as a [`MarketDataSource`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Universe {
  instruments: Vec<InstrumentSnapshot>,
}

impl Universe {
  pub fn new(instruments: Vec<InstrumentSnapshot>) -> Self {
    Self { instruments }
  }

  pub fn from_json_str(s: &str) -> Result<Self> {
    Ok(serde_json::from_str(s)?)
  }

  pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
    Self::from_json_str(&fs::read_to_string(path)?)
  }

  pub fn len(&self) -> usize {
    self.instruments.len()
  }

  pub fn is_empty(&self) -> bool {
    self.instruments.is_empty()
  }

  fn get(&self, symbol: &str) -> Result<&InstrumentSnapshot> {
    self
      .instruments
      .iter()
      .find(|s| s.symbol == symbol)
      .ok_or_else(|| QuantError::UnknownInstrument(symbol.to_string()))
  }
}

impl MarketDataSource for Universe {
  fn symbols(&self) -> Vec<String> {
    self.instruments.iter().map(|s| s.symbol.clone()).collect()
  }

  fn recommendations(&self, symbol: &str) -> Result<Vec<Recommendation>> {
    Ok(self.get(symbol)?.recommendations.clone())
  }

  fn price_bars(&self, symbol: &str) -> Result<PriceBars> {
    let snapshot = self.get(symbol)?;
    Ok(PriceBars {
      highs: snapshot.highs.clone(),
      lows: snapshot.lows.clone(),
    })
  }

  fn last_price(&self, symbol: &str) -> Result<f64> {
    let price = self.get(symbol)?.price;
    if !(price.is_finite() && price > 0.0) {
      return Err(QuantError::InvalidConfig(format!(
        "{symbol}: last price must be positive, got {price}"
      )));
    }
    Ok(price)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const UNIVERSE: &str = r#"[
    {"symbol": "AAA", "price": 10.0,
     "recommendations": [{"date": "2024-02-01", "grade": "Buy"}],
     "highs": [11.0], "lows": [9.0]},
    {"symbol": "BBB", "price": 20.0}
  ]"#;

  #[test]
  fn loads_json_universe() {
    let universe = Universe::from_json_str(UNIVERSE).unwrap();

    assert_eq!(universe.len(), 2);
    assert_eq!(universe.symbols(), vec!["AAA", "BBB"]);
    let recs = universe.recommendations("AAA").unwrap();
    assert_eq!(recs[0].grade, "Buy");
    assert_eq!(recs[0].date, chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    assert!(universe.recommendations("BBB").unwrap().is_empty());
    assert_eq!(universe.price_bars("AAA").unwrap().highs, vec![11.0]);
    assert_eq!(universe.last_price("BBB").unwrap(), 20.0);
  }

  #[test]
  fn unknown_symbol_is_an_error() {
    let universe = Universe::from_json_str(UNIVERSE).unwrap();

    assert!(matches!(
      universe.last_price("ZZZ"),
      Err(QuantError::UnknownInstrument(_))
    ));
  }
}
