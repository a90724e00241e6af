//! # quant-frontier
//!
//! $$
//! \max_{\mathbf{w}\in\Delta^{n-1}} \mathbf{w}^\top\mu \quad \text{s.t.}\quad \sqrt{\mathbf{w}^\top\Sigma\mathbf{w}} \in [\sigma_b, \sigma_{b+1})
//! $$
//!
//! Monte Carlo Markowitz frontier estimation and a support/resistance
//! breakout screener.
//!
//! - [`quant::portfolio`]: returns model, random portfolio sampling and
//!   frontier extraction.
//! - [`quant::screener`]: analyst sentiment tally, clustered price levels and
//!   the breakout screen.
//! - [`stats::kmeans`]: seeded 1-D k-means.

pub mod config;
pub mod error;
pub mod quant;
pub mod report;
pub mod stats;
pub mod traits;
pub mod visualization;

pub use error::QuantError;
pub use error::Result;
