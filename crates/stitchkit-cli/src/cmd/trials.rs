//! Trials subcommand - ClinicalTrials.gov index and MeSH conversion

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use stitchkit_core::SharedProgress;

#[derive(Args, Debug)]
pub struct TrialsArgs {
    #[command(subcommand)]
    pub action: TrialsAction,
}

#[derive(Subcommand, Debug)]
pub enum TrialsAction {
    /// Index an unpacked AllPublicXML dump by NCT id and alias
    Index {
        /// Directory holding NCTxxxxxxxx.xml files (searched recursively)
        #[arg(short, long)]
        dir: PathBuf,

        /// Gzip JSON index
        #[arg(short, long, default_value = "ctdata.json.gz")]
        output: PathBuf,

        /// Number of parallel parsers
        #[arg(short, long)]
        workers: Option<usize>,
    },
    /// Convert a MeSH ASCII file (d20XX.bin, c20XX.bin) to JSON keyed by UI
    Mesh {
        #[arg(short, long)]
        file: PathBuf,

        /// Output file (stdout if omitted, gzip if .gz)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(args: TrialsArgs, progress: &SharedProgress) -> Result<()> {
    match args.action {
        TrialsAction::Index { dir, output, workers } => {
            let defaults = stitchkit_trials::IndexConfig::default();
            let config = stitchkit_trials::IndexConfig {
                dir,
                output: Some(output),
                workers: workers.unwrap_or(defaults.workers).max(1),
            };
            let summary = stitchkit_trials::run_index(&config, progress)?;
            super::print_summary(
                "Trials",
                &[
                    ("Files", summary.files.to_string()),
                    ("Studies", summary.studies.to_string()),
                    ("Aliases", summary.aliases.to_string()),
                    ("Failed", summary.failed.to_string()),
                    ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
                ],
            );
            Ok(())
        }
        TrialsAction::Mesh { file, output } => {
            let summary = stitchkit_trials::run_mesh(&stitchkit_trials::MeshConfig { file, output })?;
            super::print_summary(
                "MeSH",
                &[
                    ("Records", summary.records.to_string()),
                    ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
                ],
            );
            Ok(())
        }
    }
}
