use std::path::{Path, PathBuf};

use clap::{Args, Command, FromArgMatches as _};

use crate::config::{ConfigStore, SimulationConfig};
use crate::disease::DiseasePreset;
use crate::error::OutbreakError;
use crate::log::{info, set_log_level, LevelFilter};
use crate::report::{write_daily_csv, write_run_json};
use crate::simulation::{RunResult, RunSummary, Simulation};

pub const DAILY_REPORT_FILE: &str = "daily.csv";
pub const RUN_REPORT_FILE: &str = "run.json";

/// Default cli arguments for the outbreak runner
#[derive(Args, Debug, Clone)]
pub struct BaseArgs {
    /// Optional path for a JSON run configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seed string, overriding the configuration
    #[arg(short, long)]
    pub seed: Option<String>,

    /// Disease preset (Rubella, Covid or Measles), overriding the configuration
    #[arg(short, long)]
    pub disease: Option<DiseasePreset>,

    /// Optional directory for `daily.csv` and `run.json`
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(short, long, default_value = "off")]
    pub log_level: LevelFilter,
}

fn create_cli() -> Command {
    let cli = Command::new("grid-outbreak").about("Grid-based outbreak simulation");
    BaseArgs::augment_args(cli)
}

/// Parses the command line, runs the simulation and prints the run summary.
///
/// # Errors
/// Returns an error if argument parsing, configuration, the run or report writing fails
pub fn run_with_args() -> Result<RunResult, Box<dyn std::error::Error>> {
    let matches = create_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    set_log_level(args.log_level);
    let result = run_with_args_internal(&args)?;
    print!("{}", format_summary(&result.summary));
    Ok(result)
}

/// Loads the configuration named by `args` (or the defaults), applies the overrides and
/// normalizes the result.
///
/// # Errors
/// Returns an error if the file cannot be read or the configuration cannot be run
pub fn load_config(args: &BaseArgs) -> Result<SimulationConfig, OutbreakError> {
    let mut config = match &args.config {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            SimulationConfig::from_json_file(path)?
        }
        None => SimulationConfig::default(),
    };
    if let Some(seed) = &args.seed {
        config.seed.clone_from(seed);
    }
    if let Some(preset) = args.disease {
        config.disease = preset.profile();
    }

    let mut store = ConfigStore::new();
    store.apply(&config)?;
    Ok(store.current().clone())
}

fn write_reports(output_dir: &Path, result: &RunResult) -> Result<(), OutbreakError> {
    write_daily_csv(&output_dir.join(DAILY_REPORT_FILE), result)?;
    write_run_json(&output_dir.join(RUN_REPORT_FILE), result)
}

fn run_with_args_internal(args: &BaseArgs) -> Result<RunResult, OutbreakError> {
    let config = load_config(args)?;
    let result = Simulation::new().run(&config)?;

    // Optionally write reports
    if let Some(output_dir) = &args.output_dir {
        write_reports(output_dir, &result)?;
    }
    Ok(result)
}

/// The three headline figures, one per line.
pub fn format_summary(summary: &RunSummary) -> String {
    let last_incidence = summary
        .last_incidence_day
        .map_or_else(|| "none".to_string(), |day| day.to_string());
    format!(
        "peak prevalence: {} (day {})\npeak reproduction: {:.3}\nlast incidence day: {}\n",
        summary.peak_prevalence,
        summary.peak_prevalence_day,
        summary.peak_reproduction,
        last_incidence
    )
}
