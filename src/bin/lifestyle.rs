//! Lifestyle CLI - Command-line interface for the lifestyle stress core
//!
//! Commands:
//! - summary: Print dataset summaries and the fitted model
//! - estimate: Estimate a stress level for given screen time and caffeine
//! - validate: Load the dataset and report how many rows survive cleaning
//! - doctor: Diagnose configuration, dataset, and model health

use clap::{Args, Parser, Subcommand};
use log::debug;
use std::path::PathBuf;
use std::process::ExitCode;

use lifestyle_stress::summary::StressBand;
use lifestyle_stress::{
    Dashboard, DashboardConfig, DashboardError, DatasetLoader, Estimate, EstimatorModel,
    PRODUCER_NAME, VERSION,
};

/// Lifestyle - stress estimation and summaries for lifestyle datasets
#[derive(Parser)]
#[command(name = "lifestyle")]
#[command(version = VERSION)]
#[command(about = "Summarize lifestyle data and estimate stress levels", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Dataset path (overrides config file and LIFESTYLE_DATA_PATH)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Field delimiter
    #[arg(long, global = true)]
    delimiter: Option<char>,

    /// Output as JSON (default when stdout is not a terminal)
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print dataset summaries and the fitted model
    Summary,

    /// Estimate a stress level
    Estimate {
        /// Daily screen time (hours); defaults to the configured default
        #[arg(short, long)]
        screen_time: Option<f64>,

        /// Daily caffeine intake (mg); defaults to the configured default
        #[arg(short = 'f', long)]
        caffeine: Option<f64>,

        /// Clamp inputs to the configured ranges before predicting
        #[arg(long)]
        clamp: bool,
    },

    /// Load the dataset and report rows kept and dropped
    Validate,

    /// Diagnose configuration, dataset, and model health
    Doctor,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), LifestyleCliError> {
    let json = cli.global.json || !atty::is(atty::Stream::Stdout);

    // Doctor reports configuration problems instead of failing on them
    if let Commands::Doctor = cli.command {
        return cmd_doctor(&cli.global, json);
    }

    let config = resolve_config(&cli.global)?;
    debug!("Using dataset {}", config.data_path.display());

    match cli.command {
        Commands::Summary => cmd_summary(config, json),
        Commands::Estimate {
            screen_time,
            caffeine,
            clamp,
        } => cmd_estimate(config, screen_time, caffeine, clamp, json),
        Commands::Validate => cmd_validate(&config, json),
        Commands::Doctor => cmd_doctor(&cli.global, json),
    }
}

/// Config file, then environment, then command-line flags
fn resolve_config(global: &GlobalArgs) -> Result<DashboardConfig, LifestyleCliError> {
    let mut config = match &global.config {
        Some(path) => DashboardConfig::from_json_file(path)?,
        None => DashboardConfig::default(),
    }
    .with_env_overrides();

    if let Some(data) = &global.data {
        config.data_path = data.clone();
    }
    if let Some(delimiter) = global.delimiter {
        config.delimiter = delimiter;
    }

    config.validate()?;
    Ok(config)
}

fn cmd_summary(config: DashboardConfig, json: bool) -> Result<(), LifestyleCliError> {
    let dashboard = Dashboard::open(config)?;

    if json {
        println!("{}", dashboard.report_json(None)?);
        return Ok(());
    }

    let summary = dashboard.summary();
    let model = dashboard.model()?;
    let overview = &summary.overview;

    println!("Lifestyle & Mental Wellness Summary");
    println!("===================================");
    println!("Source:  {}", dashboard.dataset().source());
    println!(
        "Records: {} ({} dropped)",
        overview.record_count,
        dashboard.dataset().rows_dropped()
    );
    println!();
    println!("Overview");
    println!(
        "  Avg screen time: {}",
        format_opt(overview.avg_screen_time_hours, 2, " hrs")
    );
    println!(
        "  Avg caffeine:    {}",
        format_opt(overview.avg_caffeine_mg, 0, " mg")
    );
    println!(
        "  Avg stress:      {}",
        format_opt(overview.avg_stress_level, 2, "/10")
    );

    println!();
    println!("By gender");
    for group in &summary.gender_averages.groups {
        println!(
            "  {:<12} n={:<5} screen {:.2} hrs, caffeine {:.0} mg",
            group.gender, group.record_count, group.avg_screen_time_hours, group.avg_caffeine_mg
        );
    }

    println!();
    println!("Stress distribution");
    for band in StressBand::ALL {
        let entry = summary
            .stress_distribution
            .bands
            .iter()
            .find(|b| b.band == band);
        if let Some(entry) = entry {
            println!(
                "  {:<9} {:>5} ({:.1}%)",
                band.label(),
                entry.count,
                entry.percentage
            );
        }
    }
    if summary.stress_distribution.unbinned > 0 {
        println!(
            "  Outside 0-10: {}",
            summary.stress_distribution.unbinned
        );
    }

    println!();
    print_model(&model, dashboard.dataset());

    Ok(())
}

fn cmd_estimate(
    mut config: DashboardConfig,
    screen_time: Option<f64>,
    caffeine: Option<f64>,
    clamp: bool,
    json: bool,
) -> Result<(), LifestyleCliError> {
    config.clamp_inputs |= clamp;
    let screen_time = screen_time.unwrap_or(config.screen_time.default);
    let caffeine = caffeine.unwrap_or(config.caffeine.default);

    let dashboard = Dashboard::open(config)?;
    let estimate = dashboard.estimate(screen_time, caffeine)?;

    if json {
        println!("{}", dashboard.report_json(Some(&estimate))?);
    } else {
        print_estimate(&dashboard, &estimate);
    }

    Ok(())
}

fn cmd_validate(config: &DashboardConfig, json: bool) -> Result<(), LifestyleCliError> {
    let loader = DatasetLoader::with_delimiter(config.delimiter_byte()?);
    let dataset = loader.load(&config.data_path)?;

    let report = ValidationReport {
        source: dataset.source().to_string(),
        rows_read: dataset.rows_read(),
        rows_kept: dataset.len(),
        rows_dropped: dataset.rows_dropped(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Source:       {}", report.source);
        println!("Rows read:    {}", report.rows_read);
        println!("Rows kept:    {}", report.rows_kept);
        println!("Rows dropped: {}", report.rows_dropped);
    }

    if report.rows_kept == 0 {
        Err(LifestyleCliError::NoRecords)
    } else {
        Ok(())
    }
}

fn cmd_doctor(global: &GlobalArgs, json: bool) -> Result<(), LifestyleCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} version {}", PRODUCER_NAME, VERSION),
    });

    let config = match resolve_config(global) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: match &global.config {
                    Some(path) => format!("Config file {} is valid", path.display()),
                    None => "Using default configuration".to_string(),
                },
            });
            Some(config)
        }
        Err(e) => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: CliError::from(e).message,
            });
            None
        }
    };

    if let Some(config) = config {
        if !config.data_path.exists() {
            checks.push(DoctorCheck {
                name: "dataset".to_string(),
                status: CheckStatus::Error,
                message: format!("Dataset {} does not exist", config.data_path.display()),
            });
        } else {
            match Dashboard::open(config) {
                Ok(dashboard) => {
                    let dataset = dashboard.dataset();
                    checks.push(DoctorCheck {
                        name: "dataset".to_string(),
                        status: if dataset.rows_dropped() > 0 {
                            CheckStatus::Warning
                        } else {
                            CheckStatus::Ok
                        },
                        message: format!(
                            "{} records loaded, {} dropped for missing values",
                            dataset.len(),
                            dataset.rows_dropped()
                        ),
                    });
                    checks.push(DoctorCheck {
                        name: "model".to_string(),
                        status: CheckStatus::Ok,
                        message: match dashboard.model() {
                            Ok(model) => format!("Fit on {} records", model.n_samples),
                            Err(e) => e.to_string(),
                        },
                    });
                }
                Err(e) => {
                    let name = match e {
                        DashboardError::DegenerateInput(_) => "model",
                        _ => "dataset",
                    };
                    checks.push(DoctorCheck {
                        name: name.to_string(),
                        status: CheckStatus::Error,
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    let stdout_check = if atty::is(atty::Stream::Stdout) {
        "stdout is a TTY (text output)"
    } else {
        "stdout is a pipe (JSON output)"
    };
    checks.push(DoctorCheck {
        name: "stdout".to_string(),
        status: CheckStatus::Ok,
        message: stdout_check.to_string(),
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Lifestyle Doctor Report");
        println!("=======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(LifestyleCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn format_opt(value: Option<f64>, decimals: usize, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.*}{}", decimals, v, unit),
        None => "n/a".to_string(),
    }
}

fn print_model(model: &EstimatorModel, dataset: &lifestyle_stress::Dataset) {
    println!("Model (least squares, fit on {} records)", model.n_samples);
    println!(
        "  stress = {:.4} + {:.4} * screen_hours + {:.6} * caffeine_mg",
        model.intercept, model.screen_time_coef, model.caffeine_coef
    );
    if let Some(r2) = model.r_squared(dataset) {
        println!("  In-sample R^2: {:.3}", r2);
    }
}

fn print_estimate(dashboard: &Dashboard, estimate: &Estimate) {
    let config = dashboard.config();

    println!("Stress Level Estimate");
    println!("=====================");
    println!("Screen time: {:.2} hrs", estimate.screen_time_hours);
    println!("Caffeine:    {:.0} mg", estimate.caffeine_mg);
    if estimate.inputs_clamped {
        println!("(inputs clamped to configured ranges)");
    } else if !config.screen_time.contains(estimate.screen_time_hours)
        || !config.caffeine.contains(estimate.caffeine_mg)
    {
        println!("(inputs outside configured ranges; estimate is extrapolated)");
    }
    println!();
    println!("Estimated stress level: {:.2}/10", estimate.stress_level);

    println!();
    println!("Feedback");
    for item in estimate.feedback.items() {
        let icon = match item.severity {
            lifestyle_stress::feedback::Severity::Success => "[OK]",
            lifestyle_stress::feedback::Severity::Info => "[INFO]",
            lifestyle_stress::feedback::Severity::Warning => "[WARN]",
        };
        println!("  {} {}", icon, item.message);
    }
}

// Error types

#[derive(Debug)]
enum LifestyleCliError {
    Dashboard(DashboardError),
    Json(serde_json::Error),
    NoRecords,
    DoctorFailed,
}

impl From<DashboardError> for LifestyleCliError {
    fn from(e: DashboardError) -> Self {
        LifestyleCliError::Dashboard(e)
    }
}

impl From<serde_json::Error> for LifestyleCliError {
    fn from(e: serde_json::Error) -> Self {
        LifestyleCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<DashboardError> for CliError {
    fn from(e: DashboardError) -> Self {
        let (code, hint) = match &e {
            DashboardError::DataUnavailable(_) => (
                "DATA_UNAVAILABLE",
                "Check the dataset path (--data, config file, or LIFESTYLE_DATA_PATH)",
            ),
            DashboardError::SchemaError(_) => (
                "SCHEMA_ERROR",
                "The dataset needs gender, daily_screen_time_hours, caffeine_intake_mg_per_day and stress_level columns",
            ),
            DashboardError::MalformedRow { .. } => {
                ("MALFORMED_ROW", "Check the delimiter and row lengths")
            }
            DashboardError::InvalidValue { .. } => {
                ("INVALID_VALUE", "Numeric columns must hold non-negative numbers")
            }
            DashboardError::DegenerateInput(_) => (
                "DEGENERATE_INPUT",
                "The regression needs at least 3 records with varying screen time or caffeine",
            ),
            DashboardError::ModelNotFit => ("MODEL_NOT_FIT", "Fit the estimator before predicting"),
            DashboardError::ConfigError(_) => ("CONFIG_ERROR", "Review the configuration file"),
            DashboardError::JsonError(_) => ("JSON_ERROR", "Check JSON syntax"),
        };

        CliError {
            code: code.to_string(),
            message: e.to_string(),
            hint: Some(hint.to_string()),
        }
    }
}

impl From<LifestyleCliError> for CliError {
    fn from(e: LifestyleCliError) -> Self {
        match e {
            LifestyleCliError::Dashboard(e) => CliError::from(e),
            LifestyleCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            LifestyleCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No complete rows remain after cleaning".to_string(),
                hint: Some("Every row has at least one missing value".to_string()),
            },
            LifestyleCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    source: String,
    rows_read: usize,
    rows_kept: usize,
    rows_dropped: usize,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
