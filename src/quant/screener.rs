//! # Breakout Screener
//!
//! $$
//! \frac{|R-S|}{P} > \delta,\qquad \frac{|P-S|}{P} < \tau
//! $$
//!
//! Analyst-sentiment and clustered support/resistance screen for equities
//! trading close to support with room to run.

use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

pub mod engine;
pub mod levels;
pub mod sentiment;
pub mod universe;

pub use engine::ScreeningRecord;
pub use engine::Screener;
pub use levels::LevelClusterer;
pub use levels::PriceLevels;
pub use levels::SupportResistance;
pub use sentiment::Classification;
pub use sentiment::Sentiment;
pub use sentiment::SentimentTally;
pub use sentiment::classify;
pub use sentiment::tally_sentiment;
pub use universe::InstrumentSnapshot;
pub use universe::Universe;

/// Intraday high and low series of one instrument.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceBars {
  pub highs: Vec<f64>,
  pub lows: Vec<f64>,
}

/// A dated analyst grade such as `Outperform` or `Sector Perform`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
  pub date: NaiveDate,
  pub grade: String,
}

impl Recommendation {
  pub fn new(date: NaiveDate, grade: impl Into<String>) -> Self {
    Self {
      date,
      grade: grade.into(),
    }
  }
}
