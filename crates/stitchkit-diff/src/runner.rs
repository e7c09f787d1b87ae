//! Compare two highest-status reports

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::cluster::{Move, clustering_diff};
use crate::config::Config;
use crate::report::{StatusReport, read_status_report, split_identical, status_counts};

#[derive(Debug)]
pub struct Summary {
    pub clusters1: usize,
    pub clusters2: usize,
    pub identical: usize,
    pub status_changes: usize,
    pub moves: usize,
    /// Moves that carry a cluster's representative UNII
    pub key_moves: usize,
    pub elapsed: Duration,
}

/// Whether a move carries a representative UNII of either end's cluster.
pub fn touches_key(mv: &Move<usize>, r1: &StatusReport, r2: &StatusReport) -> bool {
    let holds = |report: &StatusReport, label: Option<usize>, unii: &str| {
        label
            .and_then(|l| report.row(l))
            .is_some_and(|row| row.keys.contains(unii))
    };
    mv.items
        .iter()
        .any(|u| holds(r1, mv.from, u) || holds(r2, mv.to, u))
}

fn label(l: Option<usize>) -> String {
    l.map_or_else(|| "-".to_string(), |l| l.to_string())
}

pub fn run(config: &Config) -> Result<Summary> {
    let start = Instant::now();

    let r1 = read_status_report(&config.report1)
        .with_context(|| format!("Failed to read {}", config.report1.display()))?;
    let r2 = read_status_report(&config.report2)
        .with_context(|| format!("Failed to read {}", config.report2.display()))?;
    log::info!(
        "Comparing {} clusters with {} clusters",
        stitchkit_core::fmt_num(r1.rows.len()),
        stitchkit_core::fmt_num(r2.rows.len())
    );

    let mut out = stitchkit_core::TextSink::create(config.output.as_deref())
        .context("Failed to create output")?;

    writeln!(out, "status\treport1\treport2")?;
    for (status, (n1, n2)) in status_counts(&r1, &r2) {
        writeln!(out, "{status}\t{n1}\t{n2}")?;
    }

    let (identical, changes) = split_identical(&r1, &r2);
    if config.verbose {
        writeln!(out)?;
        writeln!(out, "status changed\tuniis\treport1\treport2")?;
        for change in &changes {
            writeln!(
                out,
                "{}|{}\t{}\t{}\t{}",
                change.label1, change.label2, change.uniis, change.before, change.after
            )?;
        }
    }

    let p1 = r1.partition(&identical);
    let p2 = r2.partition(&identical);
    let moves = clustering_diff(&p1, &p2);

    writeln!(out)?;
    writeln!(out, "fragment\tfrom\tto\tuniis\tkey")?;
    let mut key_moves = 0;
    for (id, mv) in &moves {
        let key = touches_key(mv, &r1, &r2);
        if key {
            key_moves += 1;
        }
        if key || config.verbose {
            let items: Vec<&str> = mv.items.iter().map(String::as_str).collect();
            writeln!(
                out,
                "s{id}\t{}\t{}\t{}\t{}",
                label(mv.from),
                label(mv.to),
                items.join("|"),
                if key { "yes" } else { "no" }
            )?;
        }
    }
    out.finish()?;

    let summary = Summary {
        clusters1: r1.rows.len(),
        clusters2: r2.rows.len(),
        identical: identical.len(),
        status_changes: changes.len(),
        moves: moves.len(),
        key_moves,
        elapsed: start.elapsed(),
    };

    log::info!("=== Diff Summary ===");
    log::info!(
        "Clusters: {} vs {} ({} identical, {} status changes)",
        summary.clusters1,
        summary.clusters2,
        summary.identical,
        summary.status_changes
    );
    log::info!(
        "Moves: {} ({} touching a key UNII)",
        summary.moves,
        summary.key_moves
    );
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());

    Ok(summary)
}
