//! # Visualization
//!
//! $$
//! \{(\sigma_k,\mu_k)\}_{k=1}^{N} \cup \mathcal{F} \mapsto \text{risk/return scatter}
//! $$
//!
use std::fs;
use std::path::Path;

use plotly::Layout;
use plotly::Plot;
use plotly::Scatter;
use plotly::common::ColorScale;
use plotly::common::ColorScalePalette;
use plotly::common::Line;
use plotly::common::Marker;
use plotly::common::Mode;
use plotly::layout::Axis;

use crate::error::Result;
use crate::quant::portfolio::FrontierPoint;
use crate::quant::portfolio::PortfolioTable;
use crate::quant::portfolio::SampledPortfolio;

pub struct FrontierPlotter {
  title: String,
  marker_size: usize,
  line_width: f64,
  show_legend: bool,
  instruments: Vec<String>,
}

impl Default for FrontierPlotter {
  fn default() -> Self {
    Self::new()
  }
}

impl FrontierPlotter {
  pub fn new() -> Self {
    Self {
      title: "Efficient frontier".to_string(),
      marker_size: 4,
      line_width: 2.0,
      show_legend: true,
      instruments: Vec::new(),
    }
  }

  pub fn title(mut self, title: &str) -> Self {
    self.title = title.into();
    self
  }

  pub fn marker_size(mut self, size: usize) -> Self {
    self.marker_size = size.max(1);
    self
  }

  pub fn line_width(mut self, w: f64) -> Self {
    self.line_width = w;
    self
  }

  pub fn show_legend(mut self, show: bool) -> Self {
    self.show_legend = show;
    self
  }

  /// Instrument names used in hover text.
  pub fn instruments(mut self, instruments: &[String]) -> Self {
    self.instruments = instruments.to_vec();
    self
  }

  fn hover(&self, p: &SampledPortfolio) -> String {
    let weights = self
      .instruments
      .iter()
      .zip(p.weights.iter())
      .map(|(name, w)| format!("{name}: {:.2}%", 100.0 * w))
      .collect::<Vec<String>>()
      .join("<br>");
    format!(
      "return: {:.4}<br>volatility: {:.4}<br>sharpe: {:.4}<br>{weights}",
      p.expected_return, p.volatility, p.sharpe_ratio
    )
  }

  /// All samples as markers with the frontier overlaid as a line.
  pub fn plot(&self, table: &PortfolioTable, frontier: &[FrontierPoint]) -> Plot {
    let mut plot = Plot::new();
    plot.set_layout(
      Layout::new()
        .title(self.title.as_str())
        .show_legend(self.show_legend)
        .x_axis(Axis::new().title("Volatility"))
        .y_axis(Axis::new().title("Expected return")),
    );

    let vol: Vec<f64> = table.iter().map(|p| p.volatility).collect();
    let ret: Vec<f64> = table.iter().map(|p| p.expected_return).collect();
    let sharpe: Vec<f64> = table.iter().map(|p| p.sharpe_ratio).collect();
    let hover: Vec<String> = table.iter().map(|p| self.hover(p)).collect();
    plot.add_trace(
      Scatter::new(vol, ret)
        .mode(Mode::Markers)
        .marker(
          Marker::new()
            .size(self.marker_size)
            .opacity(0.6)
            .color_array(sharpe)
            .color_scale(ColorScale::Palette(ColorScalePalette::Viridis))
            .show_scale(true),
        )
        .name("Sampled portfolios")
        .hover_text_array(hover)
        .hover_template("%{hovertext}<extra></extra>"),
    );

    let vol: Vec<f64> = frontier.iter().map(|p| p.portfolio.volatility).collect();
    let ret: Vec<f64> = frontier.iter().map(|p| p.portfolio.expected_return).collect();
    let hover: Vec<String> = frontier.iter().map(|p| self.hover(&p.portfolio)).collect();
    plot.add_trace(
      Scatter::new(vol, ret)
        .mode(Mode::LinesMarkers)
        .line(Line::new().width(self.line_width))
        .marker(Marker::new().size(self.marker_size + 2))
        .name("Efficient frontier")
        .hover_text_array(hover)
        .hover_template("%{hovertext}<extra></extra>"),
    );

    plot
  }

  pub fn write_html(
    &self,
    table: &PortfolioTable,
    frontier: &[FrontierPoint],
    path: impl AsRef<Path>,
  ) -> Result<()> {
    fs::write(path, self.plot(table, frontier).to_html())?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use ndarray::array;

  use super::*;

  fn row(ret: f64, vol: f64) -> SampledPortfolio {
    SampledPortfolio {
      weights: array![0.4, 0.6],
      expected_return: ret,
      volatility: vol,
      sharpe_ratio: ret / vol,
    }
  }

  #[test]
  fn plot_contains_samples_and_frontier() {
    let table = PortfolioTable::new(vec![row(0.1, 0.2), row(0.12, 0.3)]);
    let frontier = vec![FrontierPoint {
      bucket: 0,
      lower: 0.2,
      upper: 0.3,
      trial: 1,
      portfolio: row(0.12, 0.3),
    }];
    let names = vec!["AAA".to_string(), "BBB".to_string()];
    let json = FrontierPlotter::new()
      .title("Test frontier")
      .instruments(&names)
      .plot(&table, &frontier)
      .to_json();

    assert!(json.contains("Sampled portfolios"));
    assert!(json.contains("Efficient frontier"));
    assert!(json.contains("Test frontier"));
    assert!(json.contains("BBB: 60.00%"));
  }

  #[test]
  fn writes_html_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frontier.html");
    let table = PortfolioTable::new(vec![row(0.1, 0.2), row(0.12, 0.3)]);

    FrontierPlotter::new().write_html(&table, &[], &path).unwrap();
    assert!(path.exists());
  }

  #[test]
  fn unwritable_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("frontier.html");
    let table = PortfolioTable::new(vec![row(0.1, 0.2), row(0.12, 0.3)]);

    let err = FrontierPlotter::new().write_html(&table, &[], &path).unwrap_err();
    assert!(matches!(err, crate::QuantError::Io(_)));
  }

  #[test]
  fn samples_are_coloured_by_sharpe() {
    let table = PortfolioTable::new(vec![row(0.1, 0.2), row(0.12, 0.3)]);
    let json = FrontierPlotter::new().plot(&table, &[]).to_json();

    assert!(json.contains("Viridis"));
    assert!(json.contains("\"showscale\":true"));
  }
}
