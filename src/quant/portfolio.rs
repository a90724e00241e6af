//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Monte Carlo approximation of the Markowitz efficient frontier.

pub mod data;
pub mod engine;
pub mod frontier;
pub mod returns;
pub mod sampler;
pub mod types;

pub use data::PricePanel;
pub use data::PriceSeries;
pub use data::parse_date;
pub use data::read_price_csv;
pub use data::select_series;
pub use data::simple_returns_series;
pub use engine::FrontierEngine;
pub use engine::FrontierEngineConfig;
pub use engine::FrontierReport;
pub use frontier::FrontierExtractor;
pub use returns::CovarianceMatrix;
pub use returns::ReturnVector;
pub use returns::ReturnsModel;
pub use returns::TRADING_DAYS_PER_YEAR;
pub use sampler::PortfolioSampler;
pub use types::DegeneratePolicy;
pub use types::FrontierPoint;
pub use types::PortfolioTable;
pub use types::SampledPortfolio;
pub use types::SimplexSampling;
pub use types::WeightVector;
