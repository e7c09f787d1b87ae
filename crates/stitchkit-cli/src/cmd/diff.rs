//! Diff subcommand - compare two highest-status reports

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Earlier report (uniis + HighestStatus columns)
    pub report1: PathBuf,

    /// Later report
    pub report2: PathBuf,

    /// Also list status changes and moves not touching a key UNII
    #[arg(short, long)]
    pub verbose: bool,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: DiffArgs) -> Result<()> {
    let config = stitchkit_diff::Config {
        report1: args.report1,
        report2: args.report2,
        verbose: args.verbose,
        output: args.output,
    };
    let summary = stitchkit_diff::run(&config)?;

    super::print_summary(
        "Diff",
        &[
            (
                "Clusters",
                format!("{} vs {}", summary.clusters1, summary.clusters2),
            ),
            ("Identical", summary.identical.to_string()),
            ("Status changes", summary.status_changes.to_string()),
            (
                "Moves",
                format!("{} ({} key)", summary.moves, summary.key_moves),
            ),
            ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
        ],
    );
    Ok(())
}
