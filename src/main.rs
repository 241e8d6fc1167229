use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use dispatch_assistant::dispatch::{AssignmentError, Course, DispatchAssistant};
use dispatch_assistant::{config, credentials, input, output, scoring};

const EXIT_SUCCESS: i32 = 0;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;
const EXIT_INPUT: i32 = 5;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank drivers for a course, best first
    Suggest {
        /// JSON file with the driver pool (array of driver records)
        #[arg(long)]
        drivers: PathBuf,

        /// JSON file with the course record
        #[arg(long, conflicts_with = "pickup", required_unless_present = "pickup")]
        course: Option<PathBuf>,

        /// Pickup address, instead of a course file
        #[arg(long)]
        pickup: Option<String>,

        /// Only show the N best drivers
        #[arg(long)]
        top: Option<usize>,

        /// Tab-separated output for scripting
        #[arg(long)]
        tsv: bool,
    },
    /// Look up travel distance and time between two addresses
    Distance { origin: String, destination: String },
}

#[derive(Parser, Debug)]
#[command(name = "dispatch-assistant")]
#[command(about = "Driver assignment assistant for transport dispatch", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/dispatch-assistant/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+); a second install is harmless
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    let start_time = Instant::now();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = match config::load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = scoring::validate_scoring(&config.scoring) {
        eprintln!("Scoring config errors:");
        for error in &errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let api_key = credentials::resolve_api_key(config.maps.api_key.as_ref());

    let assistant = match DispatchAssistant::from_config(&config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Failed to create distance client: {:#}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };

    let use_colors = output::should_use_colors();

    match cli.command {
        Commands::Suggest {
            drivers,
            course,
            pickup,
            top,
            tsv,
        } => {
            let drivers = match input::load_drivers(&drivers) {
                Ok(d) => d,
                Err(e) => {
                    eprintln!("Input error: {:#}", e);
                    std::process::exit(EXIT_INPUT);
                }
            };
            let course = match (course, pickup) {
                (Some(path), _) => match input::load_course(&path) {
                    Ok(c) => c,
                    Err(e) => {
                        eprintln!("Input error: {:#}", e);
                        std::process::exit(EXIT_INPUT);
                    }
                },
                (None, Some(pickup)) => Course::new(pickup),
                // clap enforces one of the two
                (None, None) => std::process::exit(EXIT_INPUT),
            };

            let mut ranked = match assistant
                .suggest_best_driver(&drivers, &course, api_key.as_ref())
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(exit_code_for(&e));
                }
            };

            if let Some(top) = top {
                ranked.truncate(top);
            }

            if tsv {
                let lines = output::format_tsv(&ranked);
                if !lines.is_empty() {
                    println!("{}", lines);
                }
            } else if cli.verbose && !ranked.is_empty() {
                for scored in &ranked {
                    println!("{}", output::format_driver_detail(scored, use_colors));
                    println!();
                }
                println!("{}", output::format_recommendation(&ranked, use_colors));
            } else {
                println!("{}", output::format_ranked_table(&ranked, use_colors));
            }

            if cli.verbose {
                eprintln!();
                eprintln!(
                    "Total: {} drivers in {:?}",
                    drivers.len(),
                    start_time.elapsed()
                );
            }
        }
        Commands::Distance {
            origin,
            destination,
        } => {
            let result = match assistant
                .distance(&origin, &destination, api_key.as_ref())
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(exit_code_for(&e));
                }
            };

            let line = output::format_lookup(&origin, &destination, &result);
            if !result.is_success() {
                eprintln!("{}", line);
                std::process::exit(EXIT_NETWORK);
            }
            println!("{}", line);
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

fn exit_code_for(err: &AssignmentError) -> i32 {
    if err.is_configuration() {
        EXIT_CONFIG
    } else {
        EXIT_INPUT
    }
}
