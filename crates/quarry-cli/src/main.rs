//! Quarry CLI - inspect Maven dependency metadata from the command line

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod resolve;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(version)]
#[command(about = "Inspect Maven artifact descriptors and dependencies", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Where descriptors come from and how they are resolved.
#[derive(Args)]
struct SourceArgs {
    /// Settings file (defaults to ./quarry.toml when present)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Repository URL or path, replacing the configured repositories (repeatable)
    #[arg(long = "repo")]
    repositories: Vec<String>,

    /// Target JDK version for profile activation
    #[arg(long)]
    jdk: Option<String>,
}

impl From<SourceArgs> for resolve::SourceOptions {
    fn from(args: SourceArgs) -> Self {
        Self {
            settings: args.settings,
            repositories: args.repositories,
            jdk: args.jdk,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dependencies of an artifact, grouped by scope
    Resolve {
        /// Artifact coordinate (group:artifact[:type[:classifier]]:version)
        coordinate: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Replace ranges and latest/release aliases with concrete versions
        #[arg(long)]
        resolved: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the effective property table of an artifact
    Properties {
        /// Artifact coordinate (group:artifact[:type[:classifier]]:version)
        coordinate: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Compare two versions under Maven ordering
    Compare {
        /// Left-hand version
        left: String,

        /// Right-hand version
        right: String,
    },

    /// Print the repository-relative path of a coordinate
    Path {
        /// Artifact coordinate
        coordinate: String,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = match cli.command {
        Commands::Resolve {
            coordinate,
            source,
            resolved,
            json,
        } => {
            let options = resolve::ResolveOptions {
                coordinate,
                source: source.into(),
                resolved,
                json,
            };
            resolve::dependencies(&options)?
        }

        Commands::Properties {
            coordinate,
            source,
            json,
        } => {
            let options = resolve::ResolveOptions {
                coordinate,
                source: source.into(),
                resolved: false,
                json,
            };
            resolve::properties(&options)?
        }

        Commands::Compare { left, right } => resolve::compare(&left, &right)?,

        Commands::Path { coordinate } => resolve::path(&coordinate)?,
    };

    println!("{output}");
    Ok(())
}
