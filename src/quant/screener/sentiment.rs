//! # Sentiment
//!
//! $$
//! T = \sum_{p} \mathbb{1}_{\text{buy}}(p)\,e_B + \mathbb{1}_{\text{sell}}(p)\,e_S + \dots
//! $$
//!
//! Keyword classification of analyst recommendation phrases.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

pub const BUY_WORDS: [&str; 8] = [
  "buy",
  "overweight",
  "outperform",
  "overperform",
  "overperformer",
  "accumulate",
  "add",
  "positive",
];

pub const HOLD_WORDS: [&str; 10] = [
  "hold",
  "equal-weight",
  "perform",
  "neutral",
  "in-line",
  "sector",
  "market",
  "mixed",
  "average",
  "fair",
];

pub const SELL_WORDS: [&str; 7] = [
  "sell",
  "underweight",
  "underperform",
  "underperformer",
  "reduce",
  "negative",
  "below",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
  Buy,
  Hold,
  Sell,
  Unknown,
}

impl fmt::Display for Sentiment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Sentiment::Buy => "Buy",
      Sentiment::Hold => "Hold",
      Sentiment::Sell => "Sell",
      Sentiment::Unknown => "Unknown",
    };
    f.write_str(s)
  }
}

/// Decision for a single phrase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
  /// No keyword matched.
  Unknown,
  /// Exactly one category matched.
  Single(Sentiment),
  /// Several categories matched; only buy and sell are counted.
  Mixed { buy: bool, sell: bool },
}

/// Aggregate sentiment counts over a list of phrases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTally {
  pub buy: usize,
  pub hold: usize,
  pub sell: usize,
  pub unknown: usize,
}

impl SentimentTally {
  pub fn record(&mut self, classification: Classification) {
    match classification {
      Classification::Unknown => self.unknown += 1,
      Classification::Single(s) => *self.slot(s) += 1,
      Classification::Mixed { buy, sell } => {
        self.buy += usize::from(buy);
        self.sell += usize::from(sell);
      }
    }
  }

  pub fn count(&self, sentiment: Sentiment) -> usize {
    match sentiment {
      Sentiment::Buy => self.buy,
      Sentiment::Hold => self.hold,
      Sentiment::Sell => self.sell,
      Sentiment::Unknown => self.unknown,
    }
  }

  pub fn total(&self) -> usize {
    self.buy + self.hold + self.sell + self.unknown
  }

  /// More buy than sell recommendations.
  pub fn is_bullish(&self) -> bool {
    self.buy > self.sell
  }

  fn slot(&mut self, sentiment: Sentiment) -> &mut usize {
    match sentiment {
      Sentiment::Buy => &mut self.buy,
      Sentiment::Hold => &mut self.hold,
      Sentiment::Sell => &mut self.sell,
      Sentiment::Unknown => &mut self.unknown,
    }
  }
}

pub fn classify(phrase: &str) -> Classification {
  let lower = phrase.to_lowercase();
  let (mut buy, mut hold, mut sell) = (false, false, false);
  for token in lower.split_whitespace() {
    buy |= BUY_WORDS.contains(&token);
    hold |= HOLD_WORDS.contains(&token);
    sell |= SELL_WORDS.contains(&token);
  }

  match (buy, hold, sell) {
    (false, false, false) => Classification::Unknown,
    (true, false, false) => Classification::Single(Sentiment::Buy),
    (false, true, false) => Classification::Single(Sentiment::Hold),
    (false, false, true) => Classification::Single(Sentiment::Sell),
    _ => Classification::Mixed { buy, sell },
  }
}

/// Tally `phrases`; unrecognised ones are counted as unknown and logged.
pub fn tally_sentiment<I, S>(phrases: I) -> SentimentTally
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut tally = SentimentTally::default();
  for phrase in phrases {
    let phrase = phrase.as_ref();
    let decision = classify(phrase);
    if decision == Classification::Unknown {
      warn!(phrase, "unrecognised recommendation");
    }
    tally.record(decision);
  }
  tally
}
