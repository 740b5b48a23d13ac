//! Egg Lag Panel CLI
//!
//! Builds a household-week egg purchase panel from a transaction file.

use anyhow::{bail, Context, Result};
use clap::Parser;
use egg_lag_panel::{pipeline, DemographicOrder, PanelConfig, WeekLabelStyle, VERSION};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "egg-panel")]
#[command(version = VERSION)]
#[command(about = "Build a household-week egg purchase panel from retail transactions", long_about = None)]
struct Cli {
    /// Transaction file; a bare file name is read from the raw data directory
    input: Option<String>,

    /// Panel file; a bare file name is written to the processed data directory
    output: Option<String>,

    /// Lag weeks per snapshot, including the target week
    #[arg(long)]
    lags: Option<usize>,

    /// Commodity description tagged as the target purchase
    #[arg(long)]
    target: Option<String>,

    /// Week label convention
    #[arg(long, value_enum)]
    week_label: Option<WeekLabelStyle>,

    /// Row order for picking household demographics
    #[arg(long, value_enum)]
    demographic_order: Option<DemographicOrder>,

    /// Only compute lag features; skip demographic and spend attributes
    #[arg(long)]
    skip_attributes: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save a JSON run summary to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// Load the configuration file and apply command-line overrides.
    fn effective_config(&self) -> Result<PanelConfig> {
        let mut config = match &self.config {
            Some(path) => {
                if !path.exists() {
                    bail!("configuration file {} does not exist", path.display());
                }
                PanelConfig::load_from(path)
            }
            None => PanelConfig::load(),
        }
        .context("Could not load configuration")?;

        if let Some(lags) = self.lags {
            config.lag_depth = lags;
        }
        if let Some(target) = &self.target {
            config.target_commodity = target.clone();
        }
        if let Some(week_label) = self.week_label {
            config.week_label = week_label;
        }
        if let Some(order) = self.demographic_order {
            config.demographic_order = order;
        }
        if self.skip_attributes {
            config.enrich_attributes = false;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.effective_config()?;

    if cli.print_config {
        println!("Config file: {:?}", cli.config.clone().unwrap_or_else(PanelConfig::config_path));
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let (Some(input), Some(output)) = (&cli.input, &cli.output) else {
        bail!("both INPUT and OUTPUT are required");
    };
    let input = config.resolve_input(input);
    let output = config.resolve_output(output);

    println!("Processing Data...");
    let summary = pipeline::run(&input, &output, &config)
        .with_context(|| format!("Failed to build panel from {}", input.display()))?;

    if let Some(path) = &cli.summary {
        summary
            .save(path)
            .with_context(|| format!("Could not save run summary to {}", path.display()))?;
    }

    println!("{}", summary.summary());
    println!("Processing Done!");
    Ok(())
}
