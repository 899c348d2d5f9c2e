use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use covid_testing_regression::config::{PipelineConfig, PopulationPolicy, ZeroOutcomePolicy};
use covid_testing_regression::error::PipelineError;
use covid_testing_regression::{logging, pipeline, report, summarize, validate};

#[derive(Parser)]
#[command(name = "covid-testing-regression")]
#[command(about = "Regress COVID-19 hospitalization and death rates on testing rates", long_about = None)]
struct Cli {
    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that every country has a single population value
    Validate {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print one summary row per country
    Summarize {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Fit both regressions and print the results
    Analyze {
        #[arg(long)]
        csv: PathBuf,
        /// Continue when a country's population varies, recording a caveat
        #[arg(long)]
        allow_inconsistent_population: bool,
        #[arg(long, value_enum, default_value_t = ZeroOutcomePolicy::WarnAndKeep)]
        zero_outcome: ZeroOutcomePolicy,
    },
    /// Write the full results listing to a file
    Report {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        allow_inconsistent_population: bool,
        #[arg(long, value_enum, default_value_t = ZeroOutcomePolicy::WarnAndKeep)]
        zero_outcome: ZeroOutcomePolicy,
        #[arg(long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn config_for(
    csv: PathBuf,
    allow_inconsistent_population: bool,
    zero_outcome: ZeroOutcomePolicy,
) -> PipelineConfig {
    let population_policy = if allow_inconsistent_population {
        PopulationPolicy::Proceed
    } else {
        PopulationPolicy::Abort
    };
    PipelineConfig::new(csv)
        .with_population_policy(population_policy)
        .with_zero_outcome_policy(zero_outcome)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    match cli.command {
        Commands::Validate { csv } => {
            let observations = pipeline::load_observations(&PipelineConfig::new(&csv))?;
            match validate::validate(&observations) {
                Ok(()) => println!(
                    "Population is constant for every country ({} observations).",
                    observations.len()
                ),
                Err(PipelineError::InconsistentPopulation(offenders)) => {
                    println!("Population varies for {} countries:", offenders.len());
                    for offender in &offenders {
                        println!("- {offender}");
                    }
                    anyhow::bail!("population validation failed for {}", csv.display());
                }
                Err(err) => return Err(err.into()),
            }
        }
        Commands::Summarize { csv, limit } => {
            let observations = pipeline::load_observations(&PipelineConfig::new(&csv))?;
            let summaries = summarize::summarize(&observations);

            if summaries.is_empty() {
                println!("No countries found in {}.", csv.display());
                return Ok(());
            }

            println!("{} countries:", summaries.len());
            for summary in summaries.iter().take(limit) {
                println!("{}", report::summary_line(summary));
            }
        }
        Commands::Analyze {
            csv,
            allow_inconsistent_population,
            zero_outcome,
        } => {
            let config = config_for(csv, allow_inconsistent_population, zero_outcome);
            let analysis = pipeline::run(&config)
                .with_context(|| format!("analysis of {} failed", config.source.display()))?;

            for outcome in [&analysis.hospitalizations, &analysis.deaths] {
                println!("{}", report::regression_line(outcome));
            }
            for anomaly in &analysis.selection.anomalies {
                println!(
                    "Warning: {} reports zero hospitalizations and deaths.",
                    anomaly.country
                );
            }
        }
        Commands::Report {
            csv,
            allow_inconsistent_population,
            zero_outcome,
            format,
            out,
        } => {
            let config = config_for(csv, allow_inconsistent_population, zero_outcome);
            let analysis = pipeline::run(&config)
                .with_context(|| format!("analysis of {} failed", config.source.display()))?;
            let rendered = match format {
                Format::Markdown => {
                    report::build_report(&analysis, &config.source.display().to_string())
                }
                Format::Json => report::build_json(&analysis).context("failed to encode report")?,
            };
            std::fs::write(&out, rendered)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
