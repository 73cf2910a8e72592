pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use ordertrack_core::config::{AppConfig, LoadOptions, LogFormat};
use ordertrack_core::ApplicationError;
use tracing::{info, Level};

#[derive(Debug, Parser)]
#[command(
    name = "ordertrack",
    about = "Order timeline operator CLI",
    long_about = "Resolve order progress timelines, badge labels and prices from order snapshots, and inspect configuration.",
    after_help = "Examples:\n  ordertrack resolve --input order.json --pretty\n  ordertrack badge --input -\n  ordertrack config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Load configuration from this file (must exist)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Resolve the progress timeline for an order snapshot JSON document")]
    Resolve {
        #[arg(long, help = "Snapshot file path, or `-` for stdin")]
        input: String,
        #[arg(long, help = "Pretty-print the resolved timeline")]
        pretty: bool,
    },
    #[command(about = "Print the summary badge label for an order snapshot")]
    Badge {
        #[arg(long, help = "Snapshot file path, or `-` for stdin")]
        input: String,
    },
    #[command(about = "Resolve the order price from payment amount and notes fallbacks")]
    Price {
        #[arg(long, help = "Price input file path, or `-` for stdin")]
        input: String,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let command = command_name(&cli.command);
    let load_options = LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config,
        ..LoadOptions::default()
    };

    let config = match AppConfig::load(load_options.clone()) {
        Ok(config) => config,
        Err(error) => {
            let result =
                commands::CommandResult::from_error(command, &ApplicationError::from(error));
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };

    if let Err(error) = init_logging(&config) {
        eprintln!("{error:#}");
    }

    let result = match cli.command {
        Command::Resolve { input, pretty } => commands::resolve::run(&config, &input, pretty),
        Command::Badge { input } => commands::badge::run(&input),
        Command::Price { input } => commands::price::run(&input),
        Command::Config => commands::config::run(&config, load_options.config_path.as_deref()),
    };

    info!(
        event_name = "cli.command.completed",
        command,
        exit_code = result.exit_code,
        "command finished"
    );

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Resolve { .. } => "resolve",
        Command::Badge { .. } => "badge",
        Command::Price { .. } => "price",
        Command::Config => "config",
    }
}

/// Logs go to stderr; stdout carries command output only.
fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(log_level);

    let installed = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|error| anyhow!("could not install log subscriber: {error}"))
}
