//! Command-line entry point: frontier estimation and the breakout screen.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use quant_frontier::config::FrontierConfig;
use quant_frontier::config::ScreenerConfig;
use quant_frontier::quant::portfolio::FrontierEngine;
use quant_frontier::quant::portfolio::FrontierEngineConfig;
use quant_frontier::quant::portfolio::parse_date;
use quant_frontier::quant::portfolio::read_price_csv;
use quant_frontier::quant::screener::Screener;
use quant_frontier::quant::screener::Universe;
use quant_frontier::report;
use quant_frontier::visualization::FrontierPlotter;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "quant-frontier", version, about = "Monte Carlo efficient frontier and breakout screener")]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Sample random portfolios and extract the efficient frontier
  Frontier(FrontierArgs),
  /// Screen a universe for bullish names trading near support
  Screen(ScreenArgs),
}

#[derive(Args)]
struct FrontierArgs {
  /// Run configuration (tickers, capital, start, end, simulations, intervals)
  #[arg(long, default_value = "config.json")]
  config: PathBuf,

  /// Wide CSV of prices: `date,TICK1,TICK2,...`
  #[arg(long)]
  prices: PathBuf,

  /// Override the configured seed
  #[arg(long)]
  seed: Option<u64>,

  /// Sample on all cores
  #[arg(long)]
  parallel: bool,

  /// Write an HTML scatter of the samples and frontier
  #[arg(long)]
  plot: Option<PathBuf>,

  /// Show a progress bar while sampling
  #[arg(long)]
  progress: bool,
}

#[derive(Args)]
struct ScreenArgs {
  /// JSON list of `{symbol, price, recommendations: [{date, grade}], highs, lows}`
  #[arg(long)]
  universe: PathBuf,

  /// Minimum distance between support and resistance, relative to price
  #[arg(long)]
  difference: Option<f64>,

  /// Maximum distance between price and support, relative to price
  #[arg(long)]
  threshold: Option<f64>,

  /// Elbow saturation threshold of the level search
  #[arg(long)]
  saturation: Option<f64>,

  /// Only screen symbols with a recommendation in the last N days
  #[arg(long)]
  sentiment_days: Option<u32>,

  /// Reference date of the recommendation window (YYYY-MM-DD); defaults to today
  #[arg(long, value_parser = parse_as_of)]
  as_of: Option<NaiveDate>,

  /// Print records as JSON instead of a table
  #[arg(long)]
  json: bool,
}

fn parse_as_of(s: &str) -> std::result::Result<NaiveDate, String> {
  parse_date(s).ok_or_else(|| format!("invalid date `{s}`"))
}

fn run_frontier(args: FrontierArgs) -> Result<()> {
  let config = FrontierConfig::from_path(&args.config)
    .with_context(|| format!("loading {}", args.config.display()))?;
  let file = File::open(&args.prices).with_context(|| format!("opening {}", args.prices.display()))?;
  let series = read_price_csv(BufReader::new(file))
    .with_context(|| format!("parsing {}", args.prices.display()))?;
  let panel = config.select_panel(&series)?;

  let mut engine_config = FrontierEngineConfig::from(&config);
  engine_config.seed = args.seed.or(engine_config.seed);
  engine_config.parallel |= args.parallel;
  engine_config.progress = args.progress;

  let run = FrontierEngine::new(engine_config).run(&panel)?;
  println!("{}", report::frontier_table(run.instruments(), &run.frontier));

  match run.best_sharpe() {
    Some((trial, best)) => {
      info!(trial, sharpe = best.sharpe_ratio, "maximum Sharpe portfolio");
      println!("{}", report::portfolio_table(run.instruments(), best, config.capital));
    }
    None => warn!("no portfolio with a finite Sharpe ratio"),
  }

  if let Some(path) = args.plot {
    FrontierPlotter::new()
      .instruments(run.instruments())
      .write_html(&run.table, &run.frontier, &path)
      .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "wrote frontier plot");
  }

  Ok(())
}

fn run_screen(args: ScreenArgs) -> Result<()> {
  let universe = Universe::from_path(&args.universe)
    .with_context(|| format!("loading {}", args.universe.display()))?;

  let defaults = ScreenerConfig::default();
  let config = ScreenerConfig {
    difference: args.difference.unwrap_or(defaults.difference),
    threshold: args.threshold.unwrap_or(defaults.threshold),
    saturation: args.saturation.unwrap_or(defaults.saturation),
    sentiment_days: args.sentiment_days.unwrap_or(defaults.sentiment_days),
    as_of: args.as_of,
    ..defaults
  };

  let records = Screener::new(config)?.screen(&universe);
  if args.json {
    println!("{}", serde_json::to_string_pretty(&records)?);
  } else {
    println!("{}", report::screening_table(&records));
  }

  Ok(())
}

fn main() -> Result<()> {
  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(EnvFilter::from_default_env().add_directive("quant_frontier=info".parse()?))
    .init();

  let cli = Cli::parse();
  match cli.command {
    Commands::Frontier(args) => run_frontier(args),
    Commands::Screen(args) => run_screen(args),
  }
}
