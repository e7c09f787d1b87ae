//! Resolve subcommand - ingredient lists to UNIIs

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// FDA UNII Names file (default from config)
    #[arg(long)]
    pub unii_names: Option<PathBuf>,

    /// Tab-delimited product table
    #[arg(short, long)]
    pub input: PathBuf,

    /// Column holding the ingredient list
    #[arg(long, default_value = "Ingredient")]
    pub column: String,

    /// Column identifying each row in the missing report
    #[arg(long)]
    pub id_column: Option<String>,

    /// Extra NAME<TAB>UNII[|UNII] overrides
    #[arg(long)]
    pub overrides: Option<PathBuf>,

    /// Suffix tried before each bare name, e.g. " [GREEN BOOK]"
    #[arg(long)]
    pub hint: Option<String>,

    /// Output file (stdout if omitted, gzip if .gz)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Unresolved-ingredient report
    #[arg(long)]
    pub missing: Option<PathBuf>,

    /// Comma-delimited input instead of tabs
    #[arg(long)]
    pub csv: bool,
}

pub fn run(args: ResolveArgs, config: &Config) -> Result<()> {
    let resolve_config = stitchkit_resolve::Config {
        unii_names: args
            .unii_names
            .unwrap_or_else(|| config.data.unii_names.clone()),
        input: args.input,
        column: args.column,
        id_column: args.id_column,
        overrides: args.overrides,
        hint: args.hint,
        output: args.output,
        missing: args.missing,
        delimiter: if args.csv { ',' } else { '\t' },
        gsrs_base_url: config.gsrs.base_url.clone(),
    };

    log::info!("Resolving {}", resolve_config.input.display());
    let summary = stitchkit_resolve::run(&resolve_config)?;

    super::print_summary(
        "Resolve",
        &[
            (
                "Rows",
                format!("{}/{} fully resolved", summary.complete_rows, summary.rows),
            ),
            ("UNIIs", summary.uniis.to_string()),
            ("Unresolved names", summary.missing_names.to_string()),
            ("Remote lookups", summary.remote_lookups.to_string()),
            ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
        ],
    );
    Ok(())
}
