//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Component Resolver - Resolve component trees into a merged model
#[derive(Parser, Debug)]
#[command(name = "component-resolver")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace). `RUST_LOG` takes precedence.
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "warn",
        value_parser = ["off", "error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a component and print the resolved components in merge order
    Resolve(commands::resolve::ResolveArgs),

    /// Resolve a component and search a file or directory in the resolved components
    Find(commands::find::FindArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Resolve(args) => commands::resolve::execute(args),
            Commands::Find(args) => commands::find::execute(args),
        }
    }
}

/// Installs `env_logger`, using `RUST_LOG` when set and `level` otherwise.
fn init_logging(level: &str) {
    let mut builder = env_logger::Builder::new();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.parse_filters(level),
    };
    builder.format_timestamp(None).target(env_logger::Target::Stderr);
    // A logger may already be installed when running in-process
    let _ = builder.try_init();
}
