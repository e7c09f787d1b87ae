//! Resolution job configuration

use std::path::PathBuf;

use crate::gsrs::DEFAULT_BASE_URL;

/// Runtime configuration for an ingredient-resolution run
#[derive(Debug, Clone)]
pub struct Config {
    /// FDA UNII Names file (tab-delimited, optionally gzip)
    pub unii_names: PathBuf,
    /// Product table to resolve
    pub input: PathBuf,
    /// Input column holding the ingredient list
    pub column: String,
    /// Input column used as the context in the missing report (row number if unset)
    pub id_column: Option<String>,
    /// Extra `NAME<TAB>UNII[|UNII]` overrides on top of the built-in seed
    pub overrides: Option<PathBuf>,
    /// Suffix tried before each bare name, e.g. `" [GREEN BOOK]"`
    pub hint: Option<String>,
    /// Resolved rows (stdout if unset)
    pub output: Option<PathBuf>,
    /// Missing-ingredient report
    pub missing: Option<PathBuf>,
    /// Input field delimiter
    pub delimiter: char,
    pub gsrs_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unii_names: PathBuf::from("UNII_Names.txt"),
            input: PathBuf::new(),
            column: "Ingredient".to_string(),
            id_column: None,
            overrides: None,
            hint: None,
            output: None,
            missing: None,
            delimiter: '\t',
            gsrs_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}
