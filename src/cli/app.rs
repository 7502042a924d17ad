//! Main CLI application structure

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{build_cmd, config_cmd};

#[derive(Parser)]
#[command(name = "jql-to-plan")]
#[command(author, version, about = "Turn Jira tickets into an OmniPlan project package")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build an OmniPlan package from tickets
    Build {
        /// Project name, used for the package and the project resource
        project: String,

        /// Tickets: a Jira search export (.json) or ticket records (.jsonl)
        input: PathBuf,

        /// Epic details, in the same formats as the input
        #[arg(long)]
        epics: Option<PathBuf>,

        /// Group tasks by epic
        #[arg(long, short = 'e')]
        epic_group: bool,

        /// Add a final "Done" milestone
        #[arg(long, short = 'm')]
        milestone_done: bool,

        /// Directory to create the package in
        #[arg(long, short = 'o', default_value = ".")]
        out_dir: PathBuf,

        /// Print the plan XML instead of writing a package
        #[arg(long)]
        stdout: bool,
    },

    /// Create and edit the configuration file
    Config {
        /// Only print the config file location
        #[arg(long)]
        show_path: bool,
    },
}

/// Installs the log subscriber; diagnostics go to stderr
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let output = Output::new(cli.format);

    tracing::debug!("jql-to-plan starting");

    match cli.command {
        Commands::Build {
            project,
            input,
            epics,
            epic_group,
            milestone_done,
            out_dir,
            stdout,
        } => build_cmd::run(
            &output,
            build_cmd::BuildArgs {
                project,
                input,
                epics,
                epic_group,
                milestone_done,
                out_dir,
                stdout,
            },
        )?,

        Commands::Config { show_path } => config_cmd::run(&output, show_path)?,
    }

    tracing::debug!("command completed");
    Ok(())
}
