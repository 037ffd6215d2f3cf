use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use urbanflow_core::{
    export::{write_edge_congestion, write_vehicle_paths},
    loading::{CityDataConfig, load_city},
    traffic::CongestionFunction,
};

mod config;
mod pipeline;

use crate::config::AppConfig;
use crate::pipeline::RunOutput;

const VEHICLE_PATHS_FILE: &str = "vehicle_paths.csv";
const EDGE_CONGESTION_FILE: &str = "edge_congestion.csv";
const SUMMARY_FILE: &str = "summary.json";

#[derive(Parser)]
#[command(name = "urbanflow", version)]
#[command(about = "Road network analysis and traffic simulation")]
struct Cli {
    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory with intersections.csv, roads.csv and vehicles.csv
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Directory the exports are written to
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Number of simulation ticks
    #[arg(long)]
    ticks: Option<usize>,

    /// Simulated time per tick
    #[arg(long)]
    step: Option<f64>,

    /// Congestion formula
    #[arg(long, value_enum)]
    formula: Option<Formula>,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Formula {
    Linear,
    Bpr,
    Exponential,
}

impl From<Formula> for CongestionFunction {
    fn from(formula: Formula) -> Self {
        match formula {
            Formula::Linear => CongestionFunction::Linear,
            Formula::Bpr => CongestionFunction::Bpr,
            Formula::Exponential => CongestionFunction::Exponential,
        }
    }
}

impl Cli {
    /// Configuration file (or defaults) with command line values on top
    fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };

        if let Some(data_dir) = &self.data_dir {
            config.data_dir.clone_from(data_dir);
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir.clone_from(output_dir);
        }
        if let Some(ticks) = self.ticks {
            config.ticks = ticks;
        }
        if let Some(step) = self.step {
            config.step = step;
        }
        if let Some(formula) = self.formula {
            config.congestion.set_function(formula.into());
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.resolve_config()?;
    info!(
        "Running with data from {} ({:?} congestion)",
        config.data_dir.display(),
        config.congestion.function
    );

    let data = load_city(&CityDataConfig::new(&config.data_dir))
        .with_context(|| format!("Failed to load city from {}", config.data_dir.display()))?;
    info!(
        "Intersections loaded: {}, vehicles loaded: {}",
        data.city.len(),
        data.vehicles.len()
    );

    let output = pipeline::run(data, &config)?;
    write_outputs(&config.output_dir, &output)?;

    info!("Results written to {}", config.output_dir.display());
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn write_outputs(dir: &Path, output: &RunOutput) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let paths = dir.join(VEHICLE_PATHS_FILE);
    write_vehicle_paths(BufWriter::new(create(&paths)?), &output.routes)
        .with_context(|| format!("Failed to write {}", paths.display()))?;
    info!("Exported paths -> {}", paths.display());

    let congestion = dir.join(EDGE_CONGESTION_FILE);
    write_edge_congestion(BufWriter::new(create(&congestion)?), &output.congestion)
        .with_context(|| format!("Failed to write {}", congestion.display()))?;
    info!("Exported congestion -> {}", congestion.display());

    let summary = dir.join(SUMMARY_FILE);
    let mut writer = BufWriter::new(create(&summary)?);
    serde_json::to_writer_pretty(&mut writer, &output.summary)
        .with_context(|| format!("Failed to write {}", summary.display()))?;
    writer.flush()?;

    Ok(())
}

fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("Cannot open file: {}", path.display()))
}
