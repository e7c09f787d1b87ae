//! Report comparison configuration

use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub report1: PathBuf,
    pub report2: PathBuf,
    /// Include status changes and every move, not only those touching a key UNII
    pub verbose: bool,
    /// Diff output (stdout if unset)
    pub output: Option<PathBuf>,
}
