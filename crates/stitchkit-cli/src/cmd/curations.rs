//! Curations subcommand - dump curations from one site, replay them on another,
//! or post UNII swap permutations to a test instance

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use stitchkit_core::SharedProgress;
use stitchkit_stitcher::{CurationConfig, PermuteConfig, Site};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct CurationsArgs {
    #[command(subcommand)]
    pub action: CurationAction,
}

#[derive(Subcommand, Debug)]
pub enum CurationAction {
    /// Write every curation as id, source, datasource, json
    Dump {
        /// Stitcher site (default from config)
        #[arg(short, long)]
        site: Option<String>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// POST a curation dump to a site; stops at the first failure
    Apply {
        /// Stitcher site (default from config)
        #[arg(short, long)]
        site: Option<String>,

        /// Dump produced by `curations dump`
        #[arg(short, long)]
        file: PathBuf,
    },
    /// POST a UNII swap for every pair of entities in an id range (test endpoint)
    Permute {
        /// Stitcher site (default from config)
        #[arg(short, long)]
        site: Option<String>,

        /// Entity id prefix
        #[arg(long, default_value = "DB")]
        prefix: String,

        /// First id number
        #[arg(long, default_value_t = 100)]
        first: u32,

        /// Number of ids
        #[arg(long, default_value_t = 50)]
        count: u32,

        /// Member source of the ids
        #[arg(long, default_value = "DrugBank, December 2018")]
        source: String,
    },
}

fn job(site: Option<String>, file: Option<PathBuf>, config: &Config) -> Result<CurationConfig> {
    let site = Site::parse(
        site.as_deref()
            .unwrap_or_else(|| config.stitcher.site_or_default()),
    )?;
    Ok(CurationConfig {
        site,
        file,
        top: config.stitcher.top,
        max_records: config.stitcher.max_records,
    })
}

pub fn run(args: CurationsArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    match args.action {
        CurationAction::Dump { site, output } => {
            let job = job(site, output, config)?;
            let summary = stitchkit_stitcher::run_dump(&job, progress)?;
            super::print_summary(
                "Curation dump",
                &[
                    ("Entities", summary.entities.to_string()),
                    ("Curations", summary.curations.to_string()),
                    ("Failed pages", summary.failed_pages.to_string()),
                    ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
                ],
            );
            if summary.failed_pages > 0 {
                anyhow::bail!("Some pages failed, dump is incomplete");
            }
            Ok(())
        }
        CurationAction::Apply { site, file } => {
            let job = job(site, Some(file), config)?;
            let summary = stitchkit_stitcher::run_apply(&job)?;
            super::print_summary(
                "Curation apply",
                &[
                    ("Applied", summary.applied.to_string()),
                    ("Site", job.site.to_string()),
                    ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
                ],
            );
            Ok(())
        }
        CurationAction::Permute {
            site,
            prefix,
            first,
            count,
            source,
        } => {
            let job = PermuteConfig {
                site: job(site, None, config)?.site,
                prefix,
                first,
                count,
                source,
            };
            let summary = stitchkit_stitcher::run_permute(&job)?;
            let mut rows = vec![
                ("Entities", summary.entities.to_string()),
                ("Posted", summary.posted.to_string()),
            ];
            rows.extend(
                summary
                    .messages
                    .iter()
                    .map(|(message, pairs)| (message.as_str(), pairs.len().to_string())),
            );
            rows.push(("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())));
            super::print_summary("Curation permute", &rows);
            Ok(())
        }
    }
}
