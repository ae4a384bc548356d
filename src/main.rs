//! margincalc command-line interface.
//!
//! Reads scenario drafts as JSON, validates them, and prints the derived
//! margin metrics. Also manages the process-wide defaults file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use margincalc::{Defaults, Results, ScenarioDraft, compute, validate};

#[derive(Parser, Debug)]
#[command(name = "margincalc", version, about = "Margin modelling for staffing scenarios")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a scenario file and print its derived metrics
    Compute {
        /// Scenario draft JSON file
        file: PathBuf,

        /// Defaults file to resolve fallback values from
        #[arg(long)]
        defaults: Option<PathBuf>,

        /// Emit the results as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Print full-precision values instead of the rounded display view
        #[arg(long)]
        full_precision: bool,
    },

    /// Check a scenario file against the model invariants
    Validate {
        /// Scenario draft JSON file
        file: PathBuf,
    },

    /// Print a new draft skeleton seeded from the defaults
    New {
        /// Defaults file to seed from
        #[arg(long)]
        defaults: Option<PathBuf>,
    },

    /// View and modify the process-wide defaults
    Defaults {
        #[command(subcommand)]
        command: DefaultsCommand,
    },
}

#[derive(Subcommand, Debug, Clone)]
enum DefaultsCommand {
    /// List all defaults and their current values
    List,

    /// Get a single default value
    Get {
        /// Key (e.g. "targetMarginPercent")
        key: String,
    },

    /// Set a default value
    Set {
        /// Key (e.g. "targetMarginPercent")
        key: String,

        /// Value to set
        value: String,
    },

    /// Clear a default back to unset
    Reset {
        /// Key (e.g. "targetMarginPercent")
        key: String,
    },

    /// Show the defaults file path
    Path,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Compute {
            file,
            defaults,
            json,
            full_precision,
        } => run_compute(&file, defaults, json, full_precision),
        Command::Validate { file } => run_validate(&file),
        Command::New { defaults } => run_new(defaults),
        Command::Defaults { command } => run_defaults_command(command),
    }
}

fn run_compute(
    file: &Path,
    defaults: Option<PathBuf>,
    json: bool,
    full_precision: bool,
) -> anyhow::Result<()> {
    let draft = read_draft(file)?;
    let defaults = load_defaults(defaults)?;

    let scenario = match validate(&draft) {
        Ok(scenario) => scenario,
        Err(errors) => {
            print_field_errors(&errors);
            anyhow::bail!("scenario failed validation");
        }
    };

    let results = compute(&scenario, &defaults)?;
    let results = if full_precision {
        results
    } else {
        results.rounded()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(&scenario.project_name, &scenario.full_name, &results);
    }
    Ok(())
}

fn run_validate(file: &Path) -> anyhow::Result<()> {
    let draft = read_draft(file)?;
    match validate(&draft) {
        Ok(scenario) => {
            println!("OK: scenario {} is valid", scenario.id);
            Ok(())
        }
        Err(errors) => {
            print_field_errors(&errors);
            anyhow::bail!("scenario failed validation");
        }
    }
}

fn run_new(defaults: Option<PathBuf>) -> anyhow::Result<()> {
    let defaults = load_defaults(defaults)?;
    let draft = ScenarioDraft::seeded_from(&defaults);
    println!("{}", serde_json::to_string_pretty(&draft)?);
    Ok(())
}

fn run_defaults_command(command: DefaultsCommand) -> anyhow::Result<()> {
    let path = Defaults::default_path();
    match command {
        DefaultsCommand::List => {
            let defaults = Defaults::load();
            let all = defaults.list();
            let width = all.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
            println!("Defaults:");
            println!();
            for (key, value) in all {
                println!("  {key:width$}  {value}");
            }
            Ok(())
        }
        DefaultsCommand::Get { key } => {
            let defaults = Defaults::load();
            match defaults.get(&key) {
                Some(value) if !value.is_empty() => println!("{value}"),
                Some(_) => println!("-"),
                None => anyhow::bail!("unknown defaults key: {key}"),
            }
            Ok(())
        }
        DefaultsCommand::Set { key, value } => {
            let mut defaults = Defaults::load();
            defaults.set(&key, &value)?;
            defaults.save_to(&path)?;
            println!("Set {key} = {value}");
            Ok(())
        }
        DefaultsCommand::Reset { key } => {
            let mut defaults = Defaults::load();
            defaults.reset(&key)?;
            defaults.save_to(&path)?;
            println!("Reset {key}");
            Ok(())
        }
        DefaultsCommand::Path => {
            println!("{}", path.display());
            if !path.exists() {
                println!("  (does not exist, using empty defaults)");
            }
            Ok(())
        }
    }
}

fn read_draft(file: &Path) -> anyhow::Result<ScenarioDraft> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("reading scenario file {}", file.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing scenario file {}", file.display()))
}

fn load_defaults(path: Option<PathBuf>) -> anyhow::Result<Defaults> {
    match path {
        Some(path) => Defaults::load_from(&path)
            .with_context(|| format!("loading defaults from {}", path.display())),
        None => Ok(Defaults::load()),
    }
}

fn print_field_errors(errors: &margincalc::ValidationErrors) {
    eprintln!("Validation errors:");
    let map = errors.clone().into_map();
    let width = map.keys().map(|k| k.len()).max().unwrap_or(0);
    for (field, message) in map {
        eprintln!("  {field:width$}  {message}");
    }
}

fn print_results(project: &str, name: &str, results: &Results) {
    let dollars = |v: Decimal| format!("${v}");
    let rows: Vec<(&str, String)> = vec![
        ("Payable hours/month", results.payable_hours_per_month.to_string()),
        ("Unburdened hourly cost", dollars(results.unburdened_hourly_cost)),
        ("Burden $/hour", dollars(results.burden_dollars_per_hour)),
        ("Overhead $/hour", dollars(results.overhead_per_hour)),
        ("Burdened hourly cost", dollars(results.burdened_hourly_cost)),
        ("Effective bill rate", dollars(results.effective_bill_rate)),
        ("HUBZone fee/hour", dollars(results.hubzone_fee_per_hour)),
        ("Profit/hour", dollars(results.profit_per_hour)),
        (
            "Profit/hour (w/HUBZone)",
            dollars(results.profit_per_hour_with_hubzone),
        ),
        ("Monthly revenue", dollars(results.monthly_revenue)),
        ("Monthly margin", dollars(results.monthly_margin)),
        ("Annual revenue", dollars(results.annual_revenue)),
        ("Annual margin", dollars(results.annual_margin)),
        ("Annual margin %", format!("{}%", results.annual_margin_percent)),
        (
            "Required rate for target margin",
            dollars(results.required_client_rate_for_target_margin),
        ),
    ];

    println!("{project}: {name}");
    println!();
    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (label, value) in rows {
        println!("  {label:width$}  {value}");
    }
}
