//! Tubeknit CLI — the main entry point.
//!
//! Commands:
//! - `tube`      — Knit a tube plan into knitout
//! - `schedule`  — Print a width-change row schedule
//! - `config`    — Show or validate configuration
//!
//! Knitout goes to stdout (or `--output`); logs go to stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "tubeknit",
    about = "Tubeknit — knitout generator for seamless knitted tubes",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.tubeknit/config.toml
    #[arg(short, long, global = true, env = "TUBEKNIT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Knit a tube plan (TOML) into knitout
    Tube {
        /// Path to the plan file
        plan: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit the instruction list as JSON instead of knitout
        #[arg(long)]
        json: bool,
    },

    /// Print the row schedule for a width change
    Schedule {
        /// Rows available for the change
        #[arg(long)]
        rows: usize,

        /// Needles to gain or lose
        #[arg(long)]
        changes: u32,

        /// Change both edges at once
        #[arg(long)]
        both: bool,

        /// Narrow instead of widen
        #[arg(long)]
        decrease: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Validate the configuration file
    Validate,
    /// Print the default config file path
    Path,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Tube { plan, output, json } => {
            let config = commands::load_config(config_path)?;
            commands::tube::run(&config, &plan, output.as_deref(), json)?
        }
        Commands::Schedule {
            rows,
            changes,
            both,
            decrease,
        } => commands::schedule::run(rows, changes, both, decrease)?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(config_path)?,
            ConfigAction::Validate => commands::config_cmd::validate(config_path)?,
            ConfigAction::Path => commands::config_cmd::path()?,
        },
    }

    Ok(())
}
