//! Regression and curation jobs

use std::collections::BTreeMap;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use rustc_hash::FxHashSet;
use serde::Deserialize;
use stitchkit_core::{ProgressContext, TabTable, fmt_num};
use stitchkit_resolve::UniiTable;

use crate::config::{Config, CurationConfig, PermuteConfig, REPORT_NAMES};
use crate::curation;
use crate::output::write_reports;
use crate::reports::{
    ActiveMoietyClashes, ApprovedStitches, CountGenerics, FindOrphans, HighestStatus, NmeClashes,
    SourceClashes, StitchReport, UniiClashes,
};
use crate::stitch::Stitch;
use crate::walker::{HttpPages, PageSource, PageWalker};

pub const STITCHES_PATH: &str = "api/stitches/v1";

#[derive(Debug)]
pub struct RegressionSummary {
    pub stitches: usize,
    /// Records that did not decode as a stitch
    pub skipped: usize,
    pub failed_pages: usize,
    pub rows: usize,
    pub interrupted: bool,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct DumpSummary {
    pub entities: usize,
    pub curations: usize,
    pub failed_pages: usize,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct ApplySummary {
    pub applied: usize,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct PermuteSummary {
    /// Entities with a UNII from the configured source
    pub entities: usize,
    pub posted: usize,
    /// `statusMessage` -> `from:to` pairs
    pub messages: BTreeMap<String, Vec<String>>,
    pub elapsed: Duration,
}

/// Distinct values of one column of a tab-delimited list with a header.
pub fn read_nme_list<R: BufRead>(reader: R, column: usize) -> std::io::Result<FxHashSet<String>> {
    let table = TabTable::read(reader, '\t', true)?;
    Ok(table
        .rows
        .into_iter()
        .filter_map(|mut row| (column < row.len()).then(|| row.swap_remove(column)))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect())
}

/// The requested reports, in output order.
pub fn build_reports(config: &Config) -> Result<Vec<Box<dyn StitchReport>>> {
    for name in &config.reports {
        let known = REPORT_NAMES
            .iter()
            .copied()
            .chain(config.nme_lists.iter().map(|l| l.name.as_str()))
            .any(|r| r.eq_ignore_ascii_case(name));
        if !known {
            bail!("Unknown report {name:?}");
        }
    }
    let asks_nme = config.reports.iter().any(|r| r.eq_ignore_ascii_case("nmeClashes"));
    if asks_nme && config.nme_lists.is_empty() {
        bail!("nmeClashes requested but no NME lists are configured");
    }

    let prefix = config.gsrs_source_prefix.as_str();
    let mut reports: Vec<Box<dyn StitchReport>> = Vec::new();
    for list in &config.nme_lists {
        if !config.wants(&list.name) && !config.wants("nmeClashes") {
            continue;
        }
        let reader = stitchkit_core::open_text(&list.path)
            .with_context(|| format!("Failed to open NME list {}", list.path.display()))?;
        let nmes = read_nme_list(reader, list.column)
            .with_context(|| format!("Failed to read NME list {}", list.path.display()))?;
        log::info!("{}: {} NMEs from {}", list.name, fmt_num(nmes.len()), list.path.display());
        reports.push(Box::new(NmeClashes::new(&list.name, prefix, nmes)));
    }
    if config.wants("PMEClashes") {
        reports.push(Box::new(SourceClashes::new("PMEClashes", &config.pme_source)));
    }
    if config.wants("DrugBankClashes") {
        reports.push(Box::new(SourceClashes::new("DrugBankClashes", &config.drugbank_source)));
    }
    if config.wants("activemoietyClashes") {
        reports.push(Box::new(ActiveMoietyClashes::new(prefix)));
    }
    if config.wants("uniiClashes") {
        reports.push(Box::new(UniiClashes::default()));
    }
    if config.wants("approvedStitches") {
        reports.push(Box::new(ApprovedStitches::new(prefix)));
    }
    if config.wants("highestStatus") || config.status_table.is_some() {
        reports.push(Box::new(HighestStatus::new(config.full, prefix)));
    }
    if config.wants("countGenerics") {
        reports.push(Box::new(CountGenerics::default()));
    }
    if config.wants("findOrphans") {
        reports.push(Box::new(FindOrphans::new(config.orphan_sources.clone())));
    }
    Ok(reports)
}

pub fn run_regression(config: &Config, progress: &ProgressContext) -> Result<RegressionSummary> {
    run_regression_with(config, progress, HttpPages)
}

/// Regression over any page source
pub fn run_regression_with<S: PageSource>(
    config: &Config,
    progress: &ProgressContext,
    source: S,
) -> Result<RegressionSummary> {
    let start = Instant::now();

    let table = UniiTable::load(&config.unii_names)
        .with_context(|| format!("Failed to read UNII names {}", config.unii_names.display()))?;
    let mut reports = build_reports(config)?;
    log::info!(
        "Running {} reports against {}",
        reports.len(),
        config.site
    );

    let pb = progress.stage_line("stitches");
    let walker = PageWalker::with_source(config.site.clone(), source)
        .top(config.top)
        .max_records(config.max_records)
        .progress(pb.clone());

    let mut stitches = 0;
    let mut skipped = 0;
    let walk = walker.walk(STITCHES_PATH, |record| match Stitch::deserialize(record) {
        Ok(stitch) => {
            stitches += 1;
            for report in reports.iter_mut() {
                report.observe(&stitch);
            }
        }
        Err(e) => {
            skipped += 1;
            log::warn!("Skipping undecodable stitch: {e}");
        }
    });
    pb.finish_and_clear();

    let mut out = stitchkit_core::TextSink::create(config.output.as_deref())
        .context("Failed to create output")?;
    let rows = write_reports(&mut out, &reports, &table)?;
    out.finish()?;

    if let Some(path) = &config.status_table {
        write_status_table(path, &reports)?;
    }

    let summary = RegressionSummary {
        stitches,
        skipped,
        failed_pages: walk.failed_pages,
        rows,
        interrupted: walk.interrupted,
        elapsed: start.elapsed(),
    };

    log::info!("=== Regression Summary ===");
    log::info!(
        "Stitches: {} ({} skipped, {} failed pages)",
        fmt_num(summary.stitches),
        summary.skipped,
        summary.failed_pages
    );
    log::info!("Report rows: {}", fmt_num(summary.rows));
    if summary.interrupted {
        log::warn!("Interrupted: reports cover a partial walk");
    }
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());

    Ok(summary)
}

fn write_status_table(path: &Path, reports: &[Box<dyn StitchReport>]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    let mut written = false;
    for report in reports {
        written |= report.write_table(&mut w)?;
    }
    if !written {
        log::warn!("No report produced a status table for {}", path.display());
    }
    w.flush()?;
    Ok(())
}

pub fn run_dump(config: &CurationConfig, progress: &ProgressContext) -> Result<DumpSummary> {
    run_dump_with(config, progress, HttpPages)
}

pub fn run_dump_with<S: PageSource>(
    config: &CurationConfig,
    progress: &ProgressContext,
    source: S,
) -> Result<DumpSummary> {
    let start = Instant::now();
    let pb = progress.stage_line("curations");
    let walker = PageWalker::with_source(config.site.clone(), source)
        .top(config.top)
        .max_records(config.max_records)
        .progress(pb.clone());

    let mut out = stitchkit_core::TextSink::create(config.file.as_deref())
        .context("Failed to create output")?;
    let (walk, curations) = curation::dump(&walker, &mut out)
        .with_context(|| format!("Failed to dump curations from {}", config.site))?;
    out.finish()?;
    pb.finish_and_clear();

    let summary = DumpSummary {
        entities: walk.records,
        curations,
        failed_pages: walk.failed_pages,
        elapsed: start.elapsed(),
    };
    log::info!("=== Curation Dump Summary ===");
    log::info!(
        "Entities: {}, curations: {}, failed pages: {}",
        fmt_num(summary.entities),
        fmt_num(summary.curations),
        summary.failed_pages
    );
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());
    Ok(summary)
}

/// Replay a curation dump against `config.site` with live POSTs.
pub fn run_apply(config: &CurationConfig) -> Result<ApplySummary> {
    run_apply_with(config, stitchkit_core::post_json)
}

pub fn run_apply_with(
    config: &CurationConfig,
    post: impl FnMut(&str, &serde_json::Value) -> Result<String, stitchkit_core::FetchError>,
) -> Result<ApplySummary> {
    let start = Instant::now();
    let Some(path) = &config.file else {
        bail!("No curation file given");
    };
    let reader = stitchkit_core::open_text(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let applied = curation::apply(&config.site, reader, post)
        .with_context(|| format!("Failed to apply {} to {}", path.display(), config.site))?;

    let summary = ApplySummary {
        applied,
        elapsed: start.elapsed(),
    };
    log::info!("=== Curation Apply Summary ===");
    log::info!("Applied: {} curations to {}", fmt_num(summary.applied), config.site);
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());
    Ok(summary)
}

/// Swap UNIIs between entities on `config.site` with live requests.
pub fn run_permute(config: &PermuteConfig) -> Result<PermuteSummary> {
    run_permute_with(
        config,
        stitchkit_core::get_json::<serde_json::Value>,
        stitchkit_core::post_json,
    )
}

pub fn run_permute_with(
    config: &PermuteConfig,
    mut fetch: impl FnMut(&str) -> Result<serde_json::Value, stitchkit_core::FetchError>,
    post: impl FnMut(&str, &serde_json::Value) -> Result<String, stitchkit_core::FetchError>,
) -> Result<PermuteSummary> {
    let start = Instant::now();
    let mut uniis = BTreeMap::new();
    for id in config.ids() {
        if stitchkit_core::is_shutdown_requested() {
            bail!("Interrupted while collecting UNIIs, nothing was posted");
        }
        let url = config.site.url(&format!("{}/{id}", curation::LATEST_PATH));
        let record = match fetch(&url) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Skipping {id}: {e}");
                continue;
            }
        };
        let stitch = match Stitch::deserialize(&record) {
            Ok(stitch) => stitch,
            Err(e) => {
                log::warn!("Skipping {id}: {e}");
                continue;
            }
        };
        match curation::member_unii(&stitch, &id, &config.source) {
            Some(unii) => {
                uniis.insert(id, unii);
            }
            None => log::debug!("{id}: no UNII from {}", config.source),
        }
    }
    log::info!("Permuting UNIIs of {} entities on {}", uniis.len(), config.site);

    let tally = curation::permute(&config.site, &uniis, &config.source, post)
        .with_context(|| format!("Permutation stopped on {}", config.site))?;

    let summary = PermuteSummary {
        entities: uniis.len(),
        posted: tally.posted,
        messages: tally.messages,
        elapsed: start.elapsed(),
    };
    log::info!("=== Curation Permute Summary ===");
    log::info!("Entities: {}, posted: {}", summary.entities, fmt_num(summary.posted));
    for (message, pairs) in &summary.messages {
        log::info!("{message}: {}", pairs.len());
        log::debug!("{message}: {}", pairs.join(", "));
    }
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NmeList;

    #[test]
    fn nme_list_column() {
        let text = "Year\tName\tX\tUNII\n2019\tA\t-\tAAAAAAAAAA\n2019\tB\t-\tAAAAAAAAAA\n2018\tC\n";
        let nmes = read_nme_list(text.as_bytes(), 3).unwrap();
        assert_eq!(nmes.len(), 1);
        assert!(nmes.contains("AAAAAAAAAA"));
    }

    #[test]
    fn unknown_report_rejected() {
        let config = Config {
            reports: vec!["bogus".into()],
            ..Config::default()
        };
        assert!(build_reports(&config).is_err());
    }

    #[test]
    fn default_builds_all_but_nme() {
        let reports = build_reports(&Config::default()).unwrap();
        let names: Vec<&str> = reports.iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec![
                "PMEClashes",
                "DrugBankClashes",
                "activemoietyClashes",
                "uniiClashes",
                "approvedStitches",
                "highestStatus",
                "countGenerics",
                "findOrphans"
            ]
        );
    }

    #[test]
    fn nme_report_needs_a_list() {
        let config = Config {
            reports: vec!["nmeClashes".into()],
            ..Config::default()
        };
        let err = build_reports(&config).err().unwrap();
        assert!(err.to_string().contains("no NME lists"));
    }

    #[test]
    fn missing_nme_list_fails() {
        let config = Config {
            nme_lists: vec![NmeList {
                name: "nmeClashes".into(),
                path: "/nonexistent/nmes.txt".into(),
                column: 0,
            }],
            ..Config::default()
        };
        assert!(build_reports(&config).is_err());
    }
}
