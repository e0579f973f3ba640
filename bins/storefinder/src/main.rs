//! storefinder - find nearby stores and get directions from the terminal
//!
//! Distances, coordinate validation, geocoding with an offline gazetteer,
//! filtered store lists and platform-aware directions links.

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;
use storefinder_cli::output::print_json;
use storefinder_cli::OutputFormat;
use storefinder_core::config::Config;
use storefinder_core::error::exit_codes;
use storefinder_core::ErrorReport;
use storefinder_telemetry::TelemetryConfig;
use tracing::Instrument;

mod commands;
mod services;

use commands::{distance, geocode, navigate, stores, validate, Context};

/// Find nearby stores and get directions
#[derive(Parser)]
#[command(name = "storefinder")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Great-circle distance between two points
    Distance(distance::DistanceArgs),

    /// Validate and normalise a coordinate
    Validate(validate::ValidateArgs),

    /// Resolve addresses to coordinates
    Geocode(geocode::GeocodeArgs),

    /// List stores from a JSON file, filtered and sorted
    Stores(stores::StoresArgs),

    /// Build directions links for a destination
    Navigate(navigate::NavigateArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let config_path = cli.config.as_deref().map(|p| p.to_string_lossy().into_owned());
    let config = match Config::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            if cli.format.is_json() {
                let _ = print_json(&ErrorReport::from(&e));
            } else {
                eprintln!("{} {}", "Error:".red().bold(), e);
            }
            return exit_code(exit_codes::CONFIG_ERROR);
        }
    };

    let telemetry = TelemetryConfig::from(&config.schema.logging).with_verbosity(cli.verbose);
    if let Err(e) = storefinder_telemetry::init_with_config(&telemetry) {
        eprintln!("{} {}", "Warning:".yellow().bold(), e);
    }

    let ctx = Context {
        config: config.schema,
        format: cli.format,
    };

    let result = async {
        match cli.command {
            Commands::Distance(args) => distance::run(&ctx, args).await,
            Commands::Validate(args) => validate::run(&ctx, &args),
            Commands::Geocode(args) => geocode::run(&ctx, args).await,
            Commands::Stores(args) => stores::run(&ctx, args).await,
            Commands::Navigate(args) => navigate::run(&ctx, args).await,
        }
    }
    .instrument(storefinder_telemetry::session_span())
    .await;

    match result {
        Ok(code) => exit_code(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            exit_code(exit_codes::FAILURE)
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
