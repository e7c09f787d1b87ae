//! Stitchkit Diff - compare two highest-status regression reports
//!
//! Each report row is one stitch cluster (a `|`-joined UNII list with its
//! highest development status). Clusters present unchanged in both reports
//! are dropped; the rest are diffed as two partitions of the same UNIIs to
//! find which fragments moved between clusters.

pub mod cluster;
pub mod config;
pub mod report;
pub mod runner;

// Re-exports
pub use cluster::{FragmentId, Move, clustering_diff, tie_max};
pub use config::Config;
pub use report::{StatusChange, StatusReport, StatusRow, read_status_report, split_identical, status_counts};
pub use runner::{Summary, run};
