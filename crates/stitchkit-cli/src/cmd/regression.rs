//! Regression subcommand - clash and status reports over every stitch

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use stitchkit_core::SharedProgress;
use stitchkit_stitcher::Site;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct RegressionArgs {
    /// Stitcher site: prod, dev, test, local, docker or a URL (default from config)
    #[arg(short, long)]
    pub site: Option<String>,

    /// FDA UNII Names file for preferred terms (default from config)
    #[arg(long)]
    pub unii_names: Option<PathBuf>,

    /// Reports to run (comma-separated, all if omitted)
    #[arg(long, value_delimiter = ',')]
    pub reports: Vec<String>,

    /// Add product, start date and URL to highestStatus
    #[arg(long)]
    pub full: bool,

    /// Report file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the highestStatus table for `stitchkit diff`
    #[arg(long)]
    pub status_table: Option<PathBuf>,

    /// Stop after this many records
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,
}

pub fn run(args: RegressionArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let site = Site::parse(
        args.site
            .as_deref()
            .unwrap_or_else(|| config.stitcher.site_or_default()),
    )?;
    let regression = &config.regression;

    let job = stitchkit_stitcher::Config {
        site,
        unii_names: args
            .unii_names
            .unwrap_or_else(|| config.data.unii_names.clone()),
        reports: args.reports,
        full: args.full,
        output: args.output,
        status_table: args.status_table,
        nme_lists: regression.nme_lists.iter().map(Into::into).collect(),
        orphan_sources: regression.orphan_sources.clone(),
        gsrs_source_prefix: regression.gsrs_source_prefix.clone(),
        pme_source: regression.pme_source.clone(),
        drugbank_source: regression.drugbank_source.clone(),
        top: config.stitcher.top,
        max_records: args.limit.unwrap_or(config.stitcher.max_records),
    };

    log::info!("Regression against {}", job.site);
    let summary = stitchkit_stitcher::run_regression(&job, progress)?;

    super::print_summary(
        "Regression",
        &[
            (
                "Stitches",
                format!("{} ({} skipped)", summary.stitches, summary.skipped),
            ),
            ("Failed pages", summary.failed_pages.to_string()),
            ("Report rows", summary.rows.to_string()),
            ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
        ],
    );

    if summary.interrupted {
        anyhow::bail!("Interrupted, reports are partial");
    }
    Ok(())
}
