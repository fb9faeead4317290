//! # dartdex CLI
//!
//! The `dartdex` binary looks up collected corporate disclosure records by
//! company name and period, renders them as markdown or JSON, and serves the
//! same lookups over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! dartdex --config ./config/dartdex.toml <command>
//! dartdex --data-dir ./dart_api_data <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dartdex resolve <name> --year Y --quarter Q` | Show which record a name resolves to |
//! | `dartdex show <name> --year Y --quarter Q` | Resolve, load and render a record |
//! | `dartdex reports <name>` | List every period with a matching record |
//! | `dartdex process <file>` | Render a single record file |
//! | `dartdex periods` | Configured periods and their record counts |
//! | `dartdex sections` | The section catalog |
//! | `dartdex serve` | Start the HTTP server |
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`
//! (default `dartdex=info`).

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dartdex::dartdex_core::postprocess::HeaderMode;
use dartdex::show::OutputFormat;
use dartdex::{config, periods, process, reports, server, show};

/// dartdex: company-name lookup over collected disclosure records.
#[derive(Parser)]
#[command(name = "dartdex", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/dartdex.toml")]
    config: PathBuf,

    /// Data root, overriding `[data].base_path`.
    ///
    /// When given, a missing config file is tolerated and defaults are used.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a company name in one period without loading the record.
    ///
    /// Prints the matching tier (exact, partial or fuzzy), the chosen file,
    /// and for fuzzy matches the score and the runner-up candidates.
    Resolve {
        /// Company name as typed, e.g. `삼성전자`.
        name: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        quarter: u8,
    },

    /// Resolve, load and render a record.
    Show {
        name: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        quarter: u8,
        #[arg(long, value_enum, default_value = "markdown")]
        format: OutputFormat,
        /// Accept exact and substring matches only.
        #[arg(long)]
        direct: bool,
    },

    /// List every configured period that has a record for the company.
    Reports {
        name: String,
        /// Period to flag in the listing, e.g. `2025Q1`.
        #[arg(long)]
        target: Option<String>,
    },

    /// Render a single record file.
    Process {
        file: PathBuf,
        #[arg(long, value_enum, default_value = "markdown")]
        format: OutputFormat,
        /// Write to this path instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show configured periods, whether they exist, and how many records they hold.
    Periods,

    /// Print the section catalog (api_01..api_28).
    Sections,

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dartdex=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load(cli: &Cli) -> Result<config::Config> {
    match &cli.data_dir {
        Some(dir) => {
            let mut cfg = if cli.config.exists() {
                config::load_config(&cli.config)?
            } else {
                config::Config::with_base_path(dir)
            };
            cfg.data.base_path = dir.clone();
            Ok(cfg)
        }
        None => config::load_config(&cli.config),
    }
}

/// `process` works without a config file, but a config file that exists
/// must still parse and validate.
fn process_header_mode(cli: &Cli) -> Result<HeaderMode> {
    if cli.config.exists() {
        Ok(config::load_config(&cli.config)?.resolver.header_mode)
    } else {
        Ok(HeaderMode::default())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // Commands that don't require config
    match &cli.command {
        Commands::Sections => return periods::list_sections(),
        Commands::Process {
            file,
            format,
            output,
        } => {
            let header_mode = process_header_mode(&cli)?;
            return process::run_process(file, header_mode, *format, output.as_deref());
        }
        _ => {}
    }

    let cfg = load(&cli)?;

    match cli.command {
        Commands::Resolve {
            name,
            year,
            quarter,
        } => {
            show::run_resolve(&cfg, &name, year, quarter)?;
        }
        Commands::Show {
            name,
            year,
            quarter,
            format,
            direct,
        } => {
            show::run_show(&cfg, &name, year, quarter, format, direct)?;
        }
        Commands::Reports { name, target } => {
            reports::run_reports(&cfg, &name, target.as_deref())?;
        }
        Commands::Periods => {
            periods::list_periods(&cfg)?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Process { .. } | Commands::Sections => {
            // Handled above (before config loading)
        }
    }

    Ok(())
}
