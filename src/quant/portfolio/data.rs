//! # Portfolio Data Utilities
//!
//! $$
//! r_{i,t} = \frac{p_{i,t}-p_{i,t-1}}{p_{i,t-1}}
//! $$
//!
//! Price panel alignment, wide CSV loading and return preprocessing.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::io::Read;

use chrono::NaiveDate;
use ndarray::Array2;
use ndarray::ArrayView1;

use crate::error::QuantError;
use crate::error::Result;

/// Date formats accepted in price files and configuration, tried in order.
pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m-%d-%Y", "%m/%d/%Y"];

/// Parse a calendar date in any of [`DATE_FORMATS`].
pub fn parse_date(s: &str) -> Option<NaiveDate> {
  let s = s.trim();
  DATE_FORMATS
    .iter()
    .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn is_usable(price: f64) -> bool {
  price.is_finite() && price > 0.0
}

fn is_missing(cell: &str) -> bool {
  matches!(
    cell.to_ascii_lowercase().as_str(),
    "" | "na" | "nan" | "null" | "none"
  )
}

/// Convert prices to simple per-period returns. The first period has no return.
pub fn simple_returns_series(prices: &[f64]) -> Vec<f64> {
  prices
    .windows(2)
    .map(|w| (w[1] - w[0]) / w[0])
    .collect()
}

/// Raw, unaligned price history of a single instrument.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceSeries {
  /// Instrument identifier.
  pub instrument: String,
  /// `(date, adjusted price)` observations; order is not significant.
  pub points: Vec<(NaiveDate, f64)>,
}

impl PriceSeries {
  pub fn new(instrument: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Self {
    Self {
      instrument: instrument.into(),
      points,
    }
  }

  /// Keep only observations inside the inclusive `[start, end]` window.
  pub fn window(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
    let points = self
      .points
      .iter()
      .copied()
      .filter(|(d, _)| start.is_none_or(|s| *d >= s) && end.is_none_or(|e| *d <= e))
      .collect();

    Self {
      instrument: self.instrument.clone(),
      points,
    }
  }
}

/// Pick `tickers` out of `all`, in ticker order.
pub fn select_series(all: &[PriceSeries], tickers: &[String]) -> Result<Vec<PriceSeries>> {
  tickers
    .iter()
    .map(|t| {
      all
        .iter()
        .find(|s| &s.instrument == t)
        .cloned()
        .ok_or_else(|| QuantError::UnknownInstrument(t.clone()))
    })
    .collect()
}

fn csv_error(err: csv::Error) -> QuantError {
  QuantError::Parse {
    line: err.position().map_or(0, |p| p.line() as usize),
    message: err.to_string(),
  }
}

/// Read a wide price file: a header `date,TICK1,TICK2,...` followed by one row
/// per date. Empty, `NA`, `NaN` and `null` cells are treated as missing.
/// Quoted fields and blank lines are accepted.
pub fn read_price_csv<R: Read>(reader: R) -> Result<Vec<PriceSeries>> {
  let mut rdr = csv::ReaderBuilder::new()
    .trim(csv::Trim::All)
    .from_reader(reader);

  let headers = rdr.headers().map_err(csv_error)?.clone();
  let mut series: Vec<PriceSeries> = headers
    .iter()
    .skip(1)
    .map(|name| PriceSeries::new(name, Vec::new()))
    .collect();
  if series.is_empty() {
    return Err(QuantError::Parse {
      line: 1,
      message: "header has no instrument columns".into(),
    });
  }

  for result in rdr.records() {
    let record = result.map_err(csv_error)?;
    let line = record.position().map_or(0, |p| p.line() as usize);
    let cell = |i: usize| record.get(i).unwrap_or_default();

    let date = parse_date(cell(0)).ok_or_else(|| QuantError::Parse {
      line,
      message: format!("invalid date `{}`", cell(0)),
    })?;

    for (i, s) in series.iter_mut().enumerate() {
      let value = cell(i + 1);
      if is_missing(value) {
        continue;
      }
      let price: f64 = value.parse().map_err(|_| QuantError::Parse {
        line,
        message: format!("invalid price `{value}` for `{}`", s.instrument),
      })?;
      s.points.push((date, price));
    }
  }

  Ok(series)
}

/// Price history aligned across instruments on common dates.
///
/// Rows where any instrument is missing (absent, non-finite or non-positive)
/// are dropped. Column order is the order the series were supplied in and
/// defines the order of portfolio weights downstream.
#[derive(Clone, Debug)]
pub struct PricePanel {
  instruments: Vec<String>,
  dates: Vec<NaiveDate>,
  prices: Array2<f64>,
}

impl PricePanel {
  pub fn new(series: Vec<PriceSeries>) -> Result<Self> {
    let n = series.len();
    let mut seen = HashSet::with_capacity(n);
    let mut instruments = Vec::with_capacity(n);
    let mut by_date: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();

    for (i, s) in series.into_iter().enumerate() {
      if !seen.insert(s.instrument.clone()) {
        return Err(QuantError::DuplicateInstrument(s.instrument));
      }
      for (date, price) in s.points {
        let row = by_date.entry(date).or_insert_with(|| vec![None; n]);
        row[i] = Some(price).filter(|p| is_usable(*p));
      }
      instruments.push(s.instrument);
    }

    let rows: Vec<(NaiveDate, Vec<f64>)> = by_date
      .into_iter()
      .filter_map(|(date, row)| row.into_iter().collect::<Option<Vec<f64>>>().map(|r| (date, r)))
      .collect();

    let mut prices = Array2::<f64>::zeros((rows.len(), n));
    let mut dates = Vec::with_capacity(rows.len());
    for (t, (date, row)) in rows.into_iter().enumerate() {
      for (i, p) in row.into_iter().enumerate() {
        prices[[t, i]] = p;
      }
      dates.push(date);
    }

    Ok(Self {
      instruments,
      dates,
      prices,
    })
  }

  pub fn instruments(&self) -> &[String] {
    &self.instruments
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  /// Prices with shape `(observations, instruments)`.
  pub fn prices(&self) -> &Array2<f64> {
    &self.prices
  }

  pub fn n_instruments(&self) -> usize {
    self.instruments.len()
  }

  pub fn n_observations(&self) -> usize {
    self.dates.len()
  }

  /// Restrict to `tickers` (in that order) and the inclusive `[start, end]` window.
  pub fn select(
    &self,
    tickers: &[String],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
  ) -> Result<Self> {
    let cols = tickers
      .iter()
      .map(|t| {
        self
          .instruments
          .iter()
          .position(|i| i == t)
          .ok_or_else(|| QuantError::UnknownInstrument(t.clone()))
      })
      .collect::<Result<Vec<usize>>>()?;
    let rows: Vec<usize> = self
      .dates
      .iter()
      .enumerate()
      .filter(|(_, d)| start.is_none_or(|s| **d >= s) && end.is_none_or(|e| **d <= e))
      .map(|(t, _)| t)
      .collect();

    let prices = Array2::from_shape_fn((rows.len(), cols.len()), |(t, i)| {
      self.prices[[rows[t], cols[i]]]
    });

    Ok(Self {
      instruments: tickers.to_vec(),
      dates: rows.iter().map(|&t| self.dates[t]).collect(),
      prices,
    })
  }

  /// Aligned prices of one instrument.
  pub fn column(&self, instrument: &str) -> Option<ArrayView1<'_, f64>> {
    self
      .instruments
      .iter()
      .position(|i| i == instrument)
      .map(|i| self.prices.column(i))
  }
}
