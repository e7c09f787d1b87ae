//! Regression and curation job configuration

use std::path::PathBuf;

use crate::site::Site;

pub const REPORT_NAMES: &[&str] = &[
    "nmeClashes",
    "PMEClashes",
    "DrugBankClashes",
    "activemoietyClashes",
    "uniiClashes",
    "approvedStitches",
    "highestStatus",
    "countGenerics",
    "findOrphans",
];

pub const DEFAULT_ORPHAN_SOURCES: &[&str] = &[
    "Pharmaceutical Manufacturing Encyclopedia (Third Edition)",
    "Broad Institute Drug List 2017-03-27",
    "Rancho BioSciences, August 2018",
    "DrugBank, July 2018",
    "NCATS Pharmaceutical Collection, April 2012",
    "Withdrawn and Shortage Drugs List Feb 2018",
];

/// A list of NME UNIIs: one `nmeClashes` report per list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NmeList {
    /// Report name, e.g. `nmeClashes2`
    pub name: String,
    /// Tab-delimited file with a header line
    pub path: PathBuf,
    /// 0-based column holding the UNII
    pub column: usize,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub site: Site,
    /// FDA UNII Names file for preferred terms
    pub unii_names: PathBuf,
    /// Reports to run (all of [`REPORT_NAMES`] if empty)
    pub reports: Vec<String>,
    /// `highestStatus` with product, start date and URL columns
    pub full: bool,
    /// Report output (stdout if unset)
    pub output: Option<PathBuf>,
    /// `highestStatus` table readable by the diff job
    pub status_table: Option<PathBuf>,
    pub nme_lists: Vec<NmeList>,
    pub orphan_sources: Vec<String>,
    /// Member source prefix of G-SRS records (the source name carries a release date)
    pub gsrs_source_prefix: String,
    pub pme_source: String,
    pub drugbank_source: String,
    /// Page size
    pub top: usize,
    pub max_records: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: Site::default(),
            unii_names: PathBuf::from("UNII_Names.txt"),
            reports: Vec::new(),
            full: false,
            output: None,
            status_table: None,
            nme_lists: Vec::new(),
            orphan_sources: DEFAULT_ORPHAN_SOURCES.iter().map(|s| s.to_string()).collect(),
            gsrs_source_prefix: "G-SRS".to_string(),
            pme_source: DEFAULT_ORPHAN_SOURCES[0].to_string(),
            drugbank_source: "DrugBank, July 2018".to_string(),
            top: 10,
            max_records: 300_000,
        }
    }
}

impl Config {
    /// Whether `name` was asked for (an empty list asks for everything).
    pub fn wants(&self, name: &str) -> bool {
        self.reports.is_empty() || self.reports.iter().any(|r| r.eq_ignore_ascii_case(name))
    }
}

/// Curation dump and replay
#[derive(Debug, Clone)]
pub struct CurationConfig {
    pub site: Site,
    /// Dump destination (stdout if unset) or replay source
    pub file: Option<PathBuf>,
    pub top: usize,
    pub max_records: usize,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            site: Site::default(),
            file: None,
            top: 10,
            max_records: 300_000,
        }
    }
}

/// UNII swap permutations over a numbered range of entity ids
#[derive(Debug, Clone)]
pub struct PermuteConfig {
    pub site: Site,
    /// Id prefix, followed by a zero-padded five digit number
    pub prefix: String,
    pub first: u32,
    pub count: u32,
    /// Member source the ids belong to
    pub source: String,
}

impl Default for PermuteConfig {
    fn default() -> Self {
        Self {
            site: Site::default(),
            prefix: "DB".to_string(),
            first: 100,
            count: 50,
            source: "DrugBank, December 2018".to_string(),
        }
    }
}

impl PermuteConfig {
    pub fn ids(&self) -> impl Iterator<Item = String> + '_ {
        (self.first..self.first.saturating_add(self.count)).map(|n| format!("{}{n:05}", self.prefix))
    }
}
