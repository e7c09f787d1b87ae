//! stitchkit - curation tooling for the Stitcher drug knowledge graph
//!
//! Resolves product ingredients to UNIIs, diffs highest-status reports,
//! runs regression reports against a Stitcher instance, moves curations
//! between instances, and indexes ClinicalTrials.gov dumps.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "stitchkit")]
#[command(about = "Curation tooling for the Stitcher drug knowledge graph")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./stitchkit.toml or ~/.config/stitchkit/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    read_timeout: Option<u64>,

    /// Maximum retry attempts for transient failures
    #[arg(long, global = true)]
    max_retries: Option<u32>,

    /// Accept self-signed TLS certificates
    #[arg(long, global = true)]
    insecure: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve ingredient lists in a product table to UNIIs
    Resolve(cmd::resolve::ResolveArgs),
    /// Compare two highest-status reports
    Diff(cmd::diff::DiffArgs),
    /// Run clash and status reports over every stitch of a site
    Regression(cmd::regression::RegressionArgs),
    /// Dump or replay curations
    Curations(cmd::curations::CurationsArgs),
    /// Clinical-trial and MeSH helpers
    Trials(cmd::trials::TrialsArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(stitchkit_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug, spinners show activity
    //   non-TTY: info unless --debug
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    stitchkit_core::init_logging(quiet, cli.debug, multi);

    stitchkit_core::install_signal_handlers().context("Failed to install signal handlers")?;

    let config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    // Config file defaults, CLI overrides
    let http_config = stitchkit_core::HttpConfig {
        read_timeout: std::time::Duration::from_secs(
            cli.read_timeout.unwrap_or(config.http.read_timeout),
        ),
        max_retries: cli.max_retries.unwrap_or(config.http.max_retries),
        accept_invalid_certs: cli.insecure || config.http.accept_invalid_certs,
    };
    stitchkit_core::set_http_config(http_config);

    match cli.command {
        Command::Resolve(args) => cmd::resolve::run(args, &config),
        Command::Diff(args) => cmd::diff::run(args),
        Command::Regression(args) => cmd::regression::run(args, &config, &progress),
        Command::Curations(args) => cmd::curations::run(args, &config, &progress),
        Command::Trials(args) => cmd::trials::run(args, &progress),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            let http = stitchkit_core::http_config();
            table.add_row(vec![
                "UNII names",
                &config.data.unii_names.display().to_string(),
            ]);
            table.add_row(vec!["G-SRS base URL", &config.gsrs.base_url]);
            table.add_row(vec!["Stitcher site", config.stitcher.site_or_default()]);
            table.add_row(vec![
                "Page size",
                &format!(
                    "{} (max records: {})",
                    config.stitcher.top, config.stitcher.max_records
                ),
            ]);
            table.add_row(vec![
                "G-SRS source prefix",
                &config.regression.gsrs_source_prefix,
            ]);
            table.add_row(vec![
                "Orphan sources",
                &config.regression.orphan_sources.len().to_string(),
            ]);
            table.add_row(vec![
                "NME lists",
                &config
                    .regression
                    .nme_lists
                    .iter()
                    .map(|l| l.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ]);
            table.add_row(vec![
                "Read timeout",
                &format!("{}s", http.read_timeout.as_secs()),
            ]);
            table.add_row(vec!["Max retries", &http.max_retries.to_string()]);
            table.add_row(vec![
                "Invalid certs",
                if http.accept_invalid_certs {
                    "accepted"
                } else {
                    "rejected"
                },
            ]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
