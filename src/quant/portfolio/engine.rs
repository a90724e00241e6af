//! # Frontier Engine
//!
//! $$
//! P \xrightarrow{\text{returns}} (\mu, \Sigma) \xrightarrow{\text{sample}} \{\mathbf{w}_k\}_{k=1}^{N} \xrightarrow{\text{bucket}} \mathcal{F}
//! $$
//!
//! High-level orchestration of the Monte Carlo frontier pipeline.

use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use super::data::PricePanel;
use super::frontier::FrontierExtractor;
use super::returns::CovarianceMatrix;
use super::returns::ReturnVector;
use super::returns::ReturnsModel;
use super::returns::TRADING_DAYS_PER_YEAR;
use super::sampler::PortfolioSampler;
use super::types::DegeneratePolicy;
use super::types::FrontierPoint;
use super::types::PortfolioTable;
use super::types::SampledPortfolio;
use super::types::SimplexSampling;
use crate::config::FrontierConfig;
use crate::error::Result;
use crate::traits::TrialExt;

/// Runtime configuration for [`FrontierEngine`].
#[derive(Clone, Debug)]
pub struct FrontierEngineConfig {
  /// Number of random portfolios.
  pub simulations: usize,
  /// Number of volatility buckets.
  pub intervals: usize,
  /// Annualization factor for returns and covariance.
  pub periods_per_year: f64,
  pub sampling: SimplexSampling,
  pub degenerate: DegeneratePolicy,
  /// Seed of the random source; drawn from the OS when `None`.
  pub seed: Option<u64>,
  /// Sample on the rayon pool.
  pub parallel: bool,
  /// Show a progress bar while sampling sequentially.
  pub progress: bool,
}

impl Default for FrontierEngineConfig {
  fn default() -> Self {
    Self {
      simulations: 10_000,
      intervals: 100,
      periods_per_year: TRADING_DAYS_PER_YEAR,
      sampling: SimplexSampling::NormalizedUniform,
      degenerate: DegeneratePolicy::Propagate,
      seed: None,
      parallel: false,
      progress: false,
    }
  }
}

impl From<&FrontierConfig> for FrontierEngineConfig {
  fn from(config: &FrontierConfig) -> Self {
    Self {
      simulations: config.simulations,
      intervals: config.intervals,
      periods_per_year: config.periods_per_year,
      sampling: config.sampling,
      degenerate: config.degenerate,
      seed: config.seed,
      parallel: config.parallel,
      progress: false,
    }
  }
}

/// Everything produced by one frontier run.
#[derive(Clone, Debug)]
pub struct FrontierReport {
  pub returns: ReturnVector,
  pub covariance: CovarianceMatrix,
  /// All sampled portfolios in trial order.
  pub table: PortfolioTable,
  /// Best-return portfolio per non-empty volatility bucket.
  pub frontier: Vec<FrontierPoint>,
  /// Seed the run was sampled with.
  pub seed: u64,
}

impl FrontierReport {
  pub fn instruments(&self) -> &[String] {
    self.returns.instruments()
  }

  /// Maximum-Sharpe portfolio over the whole table, not just the frontier.
  pub fn best_sharpe(&self) -> Option<(usize, &SampledPortfolio)> {
    self.table.best_sharpe()
  }
}

/// Single entry-point engine for the frontier workflow.
#[derive(Clone, Debug)]
pub struct FrontierEngine {
  config: FrontierEngineConfig,
}

impl FrontierEngine {
  /// Construct a new engine with explicit configuration.
  pub fn new(config: FrontierEngineConfig) -> Self {
    Self { config }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &FrontierEngineConfig {
    &self.config
  }

  /// Estimate returns, sample portfolios and extract the frontier.
  pub fn run(&self, panel: &PricePanel) -> Result<FrontierReport> {
    let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
    let extractor = FrontierExtractor::new(self.config.intervals)?;
    let (returns, covariance) = self.estimate(panel)?;
    let sampler = self.sampler(&returns, &covariance)?;

    info!(
      simulations = self.config.simulations,
      seed,
      parallel = self.config.parallel,
      "simulating portfolios"
    );
    let table = if self.config.parallel {
      sampler.sample_par(self.config.simulations, seed)?
    } else {
      self.sample_sequential(&sampler, &mut StdRng::seed_from_u64(seed))?
    };

    let frontier = extractor.extract(&table)?;
    info!(frontier = frontier.len(), "extracted efficient frontier");

    Ok(FrontierReport {
      returns,
      covariance,
      table,
      frontier,
      seed,
    })
  }

  /// Annualized return vector and covariance of `panel`.
  pub fn estimate(&self, panel: &PricePanel) -> Result<(ReturnVector, CovarianceMatrix)> {
    let estimate = ReturnsModel::new(self.config.periods_per_year).compute(panel)?;
    info!(
      instruments = panel.n_instruments(),
      observations = panel.n_observations(),
      "estimated return model"
    );
    Ok(estimate)
  }

  fn sampler(
    &self,
    returns: &ReturnVector,
    covariance: &CovarianceMatrix,
  ) -> Result<PortfolioSampler> {
    Ok(
      PortfolioSampler::new(returns, covariance, returns.len())?
        .with_sampling(self.config.sampling)
        .with_policy(self.config.degenerate),
    )
  }

  fn sample_sequential<R: Rng + ?Sized>(
    &self,
    sampler: &PortfolioSampler,
    rng: &mut R,
  ) -> Result<PortfolioTable> {
    let bar = self.progress_bar();
    let mut rows = Vec::with_capacity(self.config.simulations);
    for _ in 0..self.config.simulations {
      rows.push(sampler.trial(rng));
      bar.inc(1);
    }
    bar.finish_and_clear();

    sampler.tabulate(rows)
  }

  fn progress_bar(&self) -> ProgressBar {
    if !self.config.progress {
      return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(self.config.simulations as u64);
    bar.set_style(
      ProgressStyle::with_template("{msg} {wide_bar} {pos}/{len} [{elapsed_precise}]")
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message("Simulating portfolios");
    bar
  }
}
