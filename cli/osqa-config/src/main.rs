//! osqa-config: regenerate the osqa boot stub, firmware and emulator headers,
//! and the SystemVerilog configuration package from a board profile.

mod commands;
mod manifest;

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::OutputFormat;
use manifest::Project;

#[derive(Parser)]
#[command(
    name = "osqa-config",
    version,
    about = "Generate osqa configuration artifacts from a board profile"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate every artifact (the default when no command is given)
    Generate {
        /// Profile name or path (default: [profile] active in osqa.toml)
        #[arg(long)]
        profile: Option<String>,
        /// Compare instead of writing; fail if any artifact is out of date
        #[arg(long)]
        check: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Inspect and validate board profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// List available profiles
    List,
    /// Show a profile's parameters and derived values
    Describe {
        /// Profile name or path
        id: String,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Check profiles against the parameter schema and derivation rules
    Validate {
        /// Profile name or path (default: the active profile)
        id: Option<String>,
        /// Validate every profile in the profiles directory
        #[arg(long, conflicts_with = "id")]
        all: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the flags.
fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let project = Project::discover(&cwd)?;
    tracing::debug!(root = %project.root.display(), manifest = project.has_manifest, "project");

    match cli.command.unwrap_or(Commands::Generate {
        profile: None,
        check: false,
        format: OutputFormat::Text,
    }) {
        Commands::Generate {
            profile,
            check,
            format,
        } => commands::generate::run(&project, profile.as_deref(), check, format),

        Commands::Profile { action } => match action {
            ProfileAction::List => commands::profile::list(&project),
            ProfileAction::Describe { id, format } => {
                commands::profile::describe(&project, &id, format)
            }
            ProfileAction::Validate { id, all } => {
                commands::profile::validate(&project, id.as_deref(), all)
            }
        },
    }
}
