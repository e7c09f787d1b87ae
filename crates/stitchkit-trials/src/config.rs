//! Trial job configuration

use std::path::PathBuf;

/// Index a ClinicalTrials.gov XML dump directory
#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub dir: PathBuf,
    /// Gzip JSON index (stdout if unset)
    pub output: Option<PathBuf>,
    /// Parser threads
    pub workers: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("AllPublicXML"),
            output: Some(PathBuf::from("ctdata.json.gz")),
            workers: std::thread::available_parallelism().map_or(4, |n| n.get()),
        }
    }
}

/// Convert a MeSH ASCII file to JSON keyed by UI
#[derive(Debug, Clone, Default)]
pub struct MeshConfig {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
}
