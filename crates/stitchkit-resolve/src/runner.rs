//! Ingredient-resolution job: product table in, UNII-annotated table out

use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};

use crate::config::Config;
use crate::gsrs::{GsrsClient, NameLookup};
use crate::ingredients::{MissingReport, parse_ingredients};
use crate::overrides::Overrides;
use crate::resolver::Resolver;
use crate::unii::UniiTable;

/// Run summary
#[derive(Debug)]
pub struct Summary {
    pub rows: usize,
    /// Rows whose every ingredient resolved
    pub complete_rows: usize,
    pub uniis: usize,
    pub missing_names: usize,
    pub remote_lookups: usize,
    pub elapsed: Duration,
}

/// Run against the live G-SRS search
pub fn run(config: &Config) -> Result<Summary> {
    run_with(config, GsrsClient::new(&config.gsrs_base_url))
}

/// Run with any name lookup backend
pub fn run_with<L: NameLookup>(config: &Config, lookup: L) -> Result<Summary> {
    let start = Instant::now();

    let table = UniiTable::load(&config.unii_names)
        .with_context(|| format!("Failed to read UNII names {}", config.unii_names.display()))?;

    let mut overrides = Overrides::builtin();
    if let Some(path) = &config.overrides {
        overrides
            .load(path)
            .with_context(|| format!("Failed to read overrides {}", path.display()))?;
    }
    let mut resolver = Resolver::new(lookup, overrides);
    if let Some(hint) = &config.hint {
        resolver = resolver.with_hint(hint.clone());
    }

    let reader = stitchkit_core::open_text(&config.input)
        .with_context(|| format!("Failed to open {}", config.input.display()))?;
    let input = stitchkit_core::TabTable::read(reader, config.delimiter, true)
        .with_context(|| format!("Failed to read {}", config.input.display()))?;
    let col = input.require_column(&config.column)?;
    let id_col = match &config.id_column {
        Some(name) => Some(input.require_column(name)?),
        None => None,
    };
    log::info!(
        "Resolving {} rows from {}",
        stitchkit_core::fmt_num(input.rows.len()),
        config.input.display()
    );

    let mut out = stitchkit_core::TextSink::create(config.output.as_deref())
        .context("Failed to create output")?;
    writeln!(out, "id\t{}\tuniis\tpreferred_terms", config.column)?;

    let mut missing = MissingReport::default();
    let mut rows = 0;
    let mut complete_rows = 0;
    let mut total_uniis = 0;
    let mut interrupted = false;

    for (i, row) in input.rows.iter().enumerate() {
        if stitchkit_core::is_shutdown_requested() {
            log::warn!("Shutdown requested, stopping after {rows} rows");
            interrupted = true;
            break;
        }
        let id = id_col
            .and_then(|c| row.get(c))
            .cloned()
            .unwrap_or_else(|| (i + 1).to_string());
        let text = row.get(col).map(String::as_str).unwrap_or("");
        let misses_before = missing.occurrences();
        let uniis = parse_ingredients(text, &id, &table, &mut resolver, &mut missing)
            .with_context(|| format!("Row {id}: {text:?}"))?;
        let misses_after = missing.occurrences();

        rows += 1;
        total_uniis += uniis.len();
        if misses_after == misses_before && !uniis.is_empty() {
            complete_rows += 1;
        }
        let terms: Vec<&str> = uniis.iter().map(|u| table.preferred_term(u)).collect();
        writeln!(out, "{id}\t{text}\t{}\t{}", uniis.join("|"), terms.join("|"))?;
    }
    out.finish()?;

    if let Some(path) = &config.missing {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut w = BufWriter::new(file);
        missing.write(&mut w)?;
        w.flush()?;
    }

    let summary = Summary {
        rows,
        complete_rows,
        uniis: total_uniis,
        missing_names: missing.len(),
        remote_lookups: resolver.stats().remote,
        elapsed: start.elapsed(),
    };

    log::info!("=== Resolve Summary ===");
    log::info!(
        "Rows: {}/{} fully resolved",
        summary.complete_rows,
        summary.rows
    );
    log::info!(
        "UNIIs: {}, unresolved names: {}, remote lookups: {}",
        summary.uniis,
        summary.missing_names,
        summary.remote_lookups
    );
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());

    if interrupted {
        bail!(
            "Interrupted after {} of {} rows, output is partial",
            summary.rows,
            input.rows.len()
        );
    }
    Ok(summary)
}
