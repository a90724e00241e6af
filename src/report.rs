//! # Report
//!
//! $$
//! \mathcal{F} \mapsto \text{terminal tables}
//! $$
//!
//! Plain-text tables for frontier runs and screening results.

use prettytable::Cell;
use prettytable::Row;
use prettytable::Table;
use prettytable::format;

use crate::quant::portfolio::FrontierPoint;
use crate::quant::portfolio::SampledPortfolio;
use crate::quant::screener::ScreeningRecord;

fn table_with_titles(titles: Vec<String>) -> Table {
  let mut table = Table::new();
  table.set_format(*format::consts::FORMAT_BOX_CHARS);
  table.set_titles(Row::new(titles.iter().map(|t| Cell::new(t)).collect()));
  table
}

fn cells(values: impl IntoIterator<Item = String>) -> Row {
  Row::new(values.into_iter().map(|v| Cell::new(&v)).collect())
}

fn pct(x: f64) -> String {
  format!("{:.2}%", 100.0 * x)
}

/// One row per frontier point: bucket, volatility range, return, Sharpe, weights.
pub fn frontier_table(instruments: &[String], frontier: &[FrontierPoint]) -> Table {
  let mut titles = vec![
    "Bucket".to_string(),
    "Volatility".to_string(),
    "Return".to_string(),
    "Sharpe".to_string(),
  ];
  titles.extend(instruments.iter().cloned());
  let mut table = table_with_titles(titles);

  for point in frontier {
    let p = &point.portfolio;
    let mut row = vec![
      point.bucket.to_string(),
      pct(p.volatility),
      pct(p.expected_return),
      format!("{:.4}", p.sharpe_ratio),
    ];
    row.extend(p.weights.iter().map(|w| pct(*w)));
    table.add_row(cells(row));
  }

  table
}

/// Weights and capital allocation of a single portfolio.
pub fn portfolio_table(instruments: &[String], portfolio: &SampledPortfolio, capital: f64) -> Table {
  let mut table = table_with_titles(vec![
    "Instrument".to_string(),
    "Weight".to_string(),
    "Allocation".to_string(),
  ]);

  for ((name, w), amount) in instruments
    .iter()
    .zip(portfolio.weights.iter())
    .zip(portfolio.allocate(capital))
  {
    table.add_row(cells([name.clone(), pct(*w), format!("{amount:.2}")]));
  }
  table.add_row(cells([
    "Return / Vol / Sharpe".to_string(),
    format!("{} / {}", pct(portfolio.expected_return), pct(portfolio.volatility)),
    format!("{:.4}", portfolio.sharpe_ratio),
  ]));

  table
}

pub fn screening_table(records: &[ScreeningRecord]) -> Table {
  let mut table = table_with_titles(
    [
      "Ticker",
      "Price",
      "Support",
      "Resistance",
      "Profit",
      "Buy",
      "Hold",
      "Sell",
      "Unknown",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect(),
  );

  for r in records {
    table.add_row(cells([
      r.symbol.clone(),
      format!("{:.2}", r.price),
      format!("{:.2}", r.support),
      format!("{:.2}", r.resistance),
      pct(r.profit),
      r.buy.to_string(),
      r.hold.to_string(),
      r.sell.to_string(),
      r.unknown.to_string(),
    ]));
  }

  table
}

#[cfg(test)]
mod tests {
  use ndarray::array;

  use super::*;

  fn portfolio() -> SampledPortfolio {
    SampledPortfolio {
      weights: array![0.25, 0.75],
      expected_return: 0.1,
      volatility: 0.2,
      sharpe_ratio: 0.5,
    }
  }

  #[test]
  fn frontier_table_lists_weights_per_instrument() {
    let names = vec!["AAA".to_string(), "BBB".to_string()];
    let point = FrontierPoint {
      bucket: 3,
      lower: 0.18,
      upper: 0.21,
      trial: 7,
      portfolio: portfolio(),
    };
    let rendered = frontier_table(&names, &[point]).to_string();

    assert!(rendered.contains("AAA"));
    assert!(rendered.contains("75.00%"));
    assert!(rendered.contains("0.5000"));
  }

  #[test]
  fn portfolio_table_allocates_capital() {
    let names = vec!["AAA".to_string(), "BBB".to_string()];
    let table = portfolio_table(&names, &portfolio(), 1000.0);

    assert_eq!(table.len(), 3);
    assert!(table.to_string().contains("750.00"));
  }

  #[test]
  fn screening_table_has_one_row_per_record() {
    let record = ScreeningRecord {
      symbol: "GOOD".into(),
      price: 100.4,
      support: 100.0,
      resistance: 120.0,
      profit: 0.1952,
      buy: 2,
      hold: 1,
      sell: 0,
      unknown: 3,
    };
    let table = screening_table(&[record.clone(), record]);
    let rendered = table.to_string();

    assert_eq!(table.len(), 2);
    assert!(rendered.contains("GOOD"));
    assert!(rendered.contains("Unknown"));
    assert_eq!(table.get_row(0).unwrap().get_cell(8).unwrap().get_content(), "3");
  }
}
