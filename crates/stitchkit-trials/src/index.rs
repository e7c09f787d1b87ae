//! Parallel index of a ClinicalTrials.gov XML dump

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::ctgov::{TrialRecord, parse_study};

#[derive(Debug, Default)]
pub struct TrialIndex {
    /// NCT id and alias -> study
    pub records: BTreeMap<String, TrialRecord>,
    pub studies: usize,
    pub aliases: usize,
    pub failed: usize,
}

/// Every `*.xml` below `dir`, sorted.
pub fn study_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = dir.join("**").join("*.xml");
    let pattern_str = pattern.to_string_lossy();
    let mut files: Vec<PathBuf> = glob::glob(&pattern_str)
        .context("invalid glob pattern")?
        .filter_map(|e| e.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn parse_file(path: &Path) -> Result<TrialRecord> {
    let xml = std::fs::read_to_string(path)?;
    let mut record = parse_study(&xml)?;
    if record.nct_id.is_empty() {
        // dump files are named after the study
        if let Some(stem) = path.file_stem() {
            record.nct_id = stem.to_string_lossy().into_owned();
            record.url = format!("{}{}", crate::ctgov::STUDY_URL, record.nct_id);
        }
    }
    Ok(record)
}

/// Parse `files` on the current rayon pool and index them by NCT id and alias.
///
/// Unreadable or malformed files are logged and counted, never fatal.
pub fn index_files(files: &[PathBuf], pb: &ProgressBar) -> TrialIndex {
    let done = AtomicUsize::new(0);
    let parsed: Vec<Option<TrialRecord>> = files
        .par_iter()
        .map(|path| {
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            if n % 1000 == 0 {
                pb.set_message(format!("{}/{} studies", stitchkit_core::fmt_num(n), files.len()));
            }
            match parse_file(path) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("{}: {e:#}", path.display());
                    None
                }
            }
        })
        .collect();

    let mut index = TrialIndex::default();
    for record in parsed {
        let Some(record) = record else {
            index.failed += 1;
            continue;
        };
        index.studies += 1;
        if !record.alias.is_empty() && record.alias != record.nct_id {
            index.aliases += 1;
            index.records.insert(record.alias.clone(), record.clone());
        }
        index.records.insert(record.nct_id.clone(), record);
    }
    index
}

/// JSON object keyed by NCT id; gzip when `path` ends in `.gz`.
pub fn write_index(records: &BTreeMap<String, TrialRecord>, path: Option<&Path>) -> Result<()> {
    let mut out = stitchkit_core::TextSink::create(path).context("Failed to create index output")?;
    serde_json::to_writer_pretty(&mut out, records).context("Failed to write index")?;
    writeln!(out)?;
    out.finish()?;
    Ok(())
}
