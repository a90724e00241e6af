//! # Screener Engine
//!
//! $$
//! \pi = \frac{|R-P|}{P}
//! $$
//!
//! Runs the bullish-sentiment and support/resistance breakout screen over a
//! market data source.

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::levels::LevelClusterer;
use super::levels::SupportResistance;
use super::sentiment::SentimentTally;
use super::sentiment::tally_sentiment;
use crate::config::ScreenerConfig;
use crate::error::Result;
use crate::traits::MarketDataSource;

/// One instrument that passed the screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreeningRecord {
  pub symbol: String,
  pub price: f64,
  pub support: f64,
  pub resistance: f64,
  /// Upside to resistance relative to price.
  pub profit: f64,
  pub buy: usize,
  pub hold: usize,
  pub sell: usize,
  pub unknown: usize,
}

#[derive(Clone, Debug)]
pub struct Screener {
  config: ScreenerConfig,
  clusterer: LevelClusterer,
}

impl Screener {
  pub fn new(config: ScreenerConfig) -> Result<Self> {
    config.validate()?;
    let clusterer = LevelClusterer::new(config.saturation)
      .max_clusters(config.max_clusters)
      .n_init(config.n_init)
      .seed(config.seed);
    Ok(Self { config, clusterer })
  }

  pub fn config(&self) -> &ScreenerConfig {
    &self.config
  }

  /// Screen every symbol of `source` in order. Symbols whose data cannot be
  /// fetched are logged and skipped.
  pub fn screen<S: MarketDataSource + ?Sized>(&self, source: &S) -> Vec<ScreeningRecord> {
    let symbols = source.symbols();
    let mut records = Vec::new();
    for symbol in &symbols {
      match self.screen_symbol(source, symbol) {
        Ok(Some(record)) => records.push(record),
        Ok(None) => {}
        Err(err) => warn!(symbol = symbol.as_str(), error = %err, "skipping symbol"),
      }
    }
    info!(
      screened = symbols.len(),
      passed = records.len(),
      "screen finished"
    );
    records
  }

  /// Screen a single symbol. A symbol is skipped unless at least one
  /// recommendation falls inside the sentiment window; the tally then covers
  /// every recommendation. Price data is only fetched once the sentiment gate
  /// has passed.
  pub fn screen_symbol<S: MarketDataSource + ?Sized>(
    &self,
    source: &S,
    symbol: &str,
  ) -> Result<Option<ScreeningRecord>> {
    let recommendations = source.recommendations(symbol)?;
    let since = self.config.sentiment_since();
    if !recommendations.iter().any(|r| r.date >= since) {
      debug!(symbol, %since, "no recent recommendations");
      return Ok(None);
    }

    let tally = tally_sentiment(recommendations.iter().map(|r| r.grade.as_str()));
    if !tally.is_bullish() {
      debug!(symbol, buy = tally.buy, sell = tally.sell, "sentiment not bullish");
      return Ok(None);
    }

    let bars = source.price_bars(symbol)?;
    let levels = self.clusterer.support_and_resistance(&bars.highs, &bars.lows)?;
    let price = source.last_price(symbol)?;

    Ok(self.evaluate(symbol, price, &levels, tally))
  }

  /// Apply the distance tests to already computed levels.
  pub fn evaluate(
    &self,
    symbol: &str,
    price: f64,
    levels: &SupportResistance,
    tally: SentimentTally,
  ) -> Option<ScreeningRecord> {
    let profit = (levels.resistance - price).abs() / price;
    let sufficient_diff = (levels.resistance - levels.support).abs() / price > self.config.difference;
    let near_support = (price - levels.support).abs() / price < self.config.threshold;

    if !(sufficient_diff && near_support) {
      return None;
    }

    Some(ScreeningRecord {
      symbol: symbol.to_string(),
      price,
      support: levels.support,
      resistance: levels.resistance,
      profit,
      buy: tally.buy,
      hold: tally.hold,
      sell: tally.sell,
      unknown: tally.unknown,
    })
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;
  use tracing_test::traced_test;

  use chrono::NaiveDate;

  use super::*;
  use crate::quant::screener::InstrumentSnapshot;
  use crate::quant::screener::Recommendation;
  use crate::quant::screener::Universe;

  fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
  }

  fn config() -> ScreenerConfig {
    ScreenerConfig {
      as_of: Some(as_of()),
      ..ScreenerConfig::default()
    }
  }

  fn bands(low: f64, high: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| if i % 2 == 0 { low } else { high }).collect()
  }

  fn snapshot(symbol: &str, price: f64, recommendations: &[&str]) -> InstrumentSnapshot {
    let date = as_of() - chrono::Days::new(10);
    InstrumentSnapshot {
      symbol: symbol.to_string(),
      price,
      recommendations: recommendations
        .iter()
        .map(|g| Recommendation::new(date, *g))
        .collect(),
      highs: bands(100.5, 120.0, 40),
      lows: bands(100.0, 119.0, 40),
    }
  }

  fn levels(support: f64, resistance: f64) -> SupportResistance {
    SupportResistance {
      maximum: resistance,
      minimum: support,
      support,
      resistance,
    }
  }

  #[test]
  fn evaluate_applies_both_thresholds() {
    let screener = Screener::new(config()).unwrap();
    let tally = SentimentTally {
      buy: 2,
      ..SentimentTally::default()
    };

    let record = screener.evaluate("AAA", 100.5, &levels(100.0, 120.0), tally).unwrap();
    assert_relative_eq!(record.profit, 19.5 / 100.5, epsilon = 1e-12);
    assert_eq!(record.buy, 2);

    // too far from support
    assert!(screener.evaluate("AAA", 105.0, &levels(100.0, 120.0), tally).is_none());
    // not enough room to resistance
    assert!(screener.evaluate("AAA", 100.5, &levels(100.0, 103.0), tally).is_none());
  }

  #[test]
  fn screen_keeps_bullish_names_near_support() {
    let universe = Universe::new(vec![
      snapshot("GOOD", 100.4, &["Buy", "Outperform", "Hold"]),
      snapshot("BEAR", 100.4, &["Sell", "Buy", "Underperform"]),
      snapshot("QUIET", 100.4, &[]),
      snapshot("HIGH", 112.0, &["Buy"]),
    ]);
    let records = Screener::new(config()).unwrap().screen(&universe);

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.symbol, "GOOD");
    assert_relative_eq!(record.support, 100.0, epsilon = 1e-9);
    assert_relative_eq!(record.resistance, 120.0, epsilon = 1e-9);
    assert_eq!((record.buy, record.hold, record.sell), (2, 1, 0));
  }

  #[traced_test]
  #[test]
  fn bad_symbol_data_is_skipped() {
    let mut broken = snapshot("BROKEN", 100.4, &["Buy"]);
    broken.highs.clear();
    let universe = Universe::new(vec![broken, snapshot("GOOD", 100.4, &["Buy"])]);
    let records = Screener::new(config()).unwrap().screen(&universe);

    assert_eq!(records.len(), 1);
    assert!(logs_contain("skipping symbol"));
  }

  #[test]
  fn stale_recommendations_are_skipped() {
    let mut stale = snapshot("STALE", 100.4, &["Buy", "Outperform"]);
    for r in &mut stale.recommendations {
      r.date = as_of() - chrono::Days::new(400);
    }
    let mut mixed = snapshot("MIXED", 100.4, &["Buy"]);
    mixed
      .recommendations
      .push(Recommendation::new(as_of() - chrono::Days::new(900), "Outperform"));
    let universe = Universe::new(vec![stale, mixed]);

    let records = Screener::new(config()).unwrap().screen(&universe);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].symbol, "MIXED");
    assert_eq!(records[0].buy, 2);

    let wide = ScreenerConfig {
      sentiment_days: 500,
      ..config()
    };
    let records = Screener::new(wide).unwrap().screen(&universe);
    assert_eq!(records.len(), 2);
  }

  #[test]
  fn rejects_invalid_config() {
    let config = ScreenerConfig {
      threshold: -1.0,
      ..ScreenerConfig::default()
    };
    assert!(Screener::new(config).is_err());
  }
}
