//! mddocs CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{LevelFilter, info};
use mddocs::commands;
use mddocs_build::BuildMode;
use mddocs_core::{ProjectConfig, to_json_string};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

/// Validate, repair and prepare list-driven Markdown documentation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project configuration (YAML). Repeat to layer files; later ones win.
    #[arg(short, long = "config", action = clap::ArgAction::Append)]
    config: Vec<PathBuf>,

    /// Verbose output: -v for debug logging, -vv to also time spans
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of worker threads, overriding `jobs` from the configuration
    #[arg(short = 'p', long)]
    jobs: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check documents or list files and report problems
    Validate {
        #[arg(value_enum)]
        target: ValidateTarget,
    },

    /// Repair broken relative links that match exactly one document
    Repair {
        #[arg(value_enum)]
        target: RepairTarget,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the table of contents of a list file
    Toc {
        lst: PathBuf,

        /// Deepest header level to include (0-6)
        #[arg(short, long, default_value_t = 6)]
        depth: u8,
    },

    /// Prepare Markdown for the renderer
    Build {
        #[arg(value_enum)]
        target: BuildTarget,

        /// Merge every document into one file
        #[arg(long)]
        single: bool,
    },

    /// Show the link graph of the documents a list file resolves to
    Graph {
        lst: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ValidateTarget {
    Markdown,
    Lst,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum RepairTarget {
    Links,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum BuildTarget {
    Html,
}

fn load_config(paths: &[PathBuf]) -> Result<Option<ProjectConfig>> {
    if paths.is_empty() {
        return Ok(None);
    }
    let config = ProjectConfig::load_merged(paths).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(Some(config))
}

fn init_logging(verbose: u8, config: Option<&ProjectConfig>) -> Result<()> {
    let level = match (verbose, config) {
        (0, Some(config)) => config.log_level.parse().unwrap_or(LevelFilter::Info),
        (0, None) => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new().filter_level(level).init();

    if verbose >= 2 {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .context("Failed to install the span subscriber")?;
    }
    Ok(())
}

fn require(config: Option<ProjectConfig>) -> Result<ProjectConfig> {
    config.context("This command needs a configuration file (--config)")
}

fn status(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    init_logging(cli.verbose, config.as_ref())?;

    if let Some(jobs) = cli.jobs.or(config.as_ref().and_then(|c| c.jobs)) {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()?;
    }

    let mut out = io::stdout().lock();
    let code = match cli.command {
        Command::Validate { target } => {
            let config = require(config)?;
            let report = match target {
                ValidateTarget::Markdown => commands::validate_markdown(&config)?,
                ValidateTarget::Lst => commands::validate_lists(&config)?,
            };
            commands::write_report(&mut out, &report)?;
            status(report.has_failures())
        }
        Command::Repair {
            target: RepairTarget::Links,
            dry_run,
        } => {
            let config = require(config)?;
            let outcome = commands::repair_links(&config, dry_run)?;
            commands::write_repairs(&mut out, &outcome)?;
            status(outcome.report.unresolved().next().is_some())
        }
        Command::Toc { lst, depth } => {
            for line in commands::toc(config.as_ref(), &lst, depth)? {
                writeln!(out, "{}", line)?;
            }
            ExitCode::SUCCESS
        }
        Command::Build {
            target: BuildTarget::Html,
            single,
        } => {
            let config = require(config)?;
            let mode = if single {
                BuildMode::Single
            } else {
                BuildMode::Html
            };
            let output = commands::build(&config, mode)?;
            if output.findings.total_issues() > 0 {
                commands::write_report(&mut out, &output.findings)?;
            }
            info!(
                "Prepared {} documents in {}",
                output.documents.len(),
                config.output.display()
            );
            ExitCode::SUCCESS
        }
        Command::Graph { lst, json } => {
            let summary = commands::graph(&lst)?;
            if json {
                writeln!(out, "{}", to_json_string(&summary, "graph")?)?;
            } else {
                commands::write_graph(&mut out, &summary)?;
            }
            ExitCode::SUCCESS
        }
    };

    out.flush()?;
    Ok(code)
}
