//! Stitchkit Stitcher - regression reports and curation transfer against
//! a Stitcher REST API
//!
//! All list endpoints are walked with `top`/`skip` paging through
//! [`PageWalker`]. Every stitch is fed to each selected [`StitchReport`]
//! and the collected rows are written as one tab-delimited file.

pub mod config;
pub mod curation;
pub mod error;
pub mod output;
pub mod reports;
pub mod runner;
pub mod site;
pub mod stitch;
pub mod walker;

// Re-exports
pub use config::{Config, CurationConfig, NmeList, PermuteConfig};
pub use error::StitcherError;
pub use output::write_reports;
pub use reports::StitchReport;
pub use runner::{
    ApplySummary, DumpSummary, PermuteSummary, RegressionSummary, run_apply, run_dump,
    run_permute, run_regression,
};
pub use site::Site;
pub use stitch::{Stitch, get_name};
pub use walker::{HttpPages, PageSource, PageWalker, WalkSummary};
