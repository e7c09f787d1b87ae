//! Trial index and MeSH conversion jobs

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use stitchkit_core::{ProgressContext, fmt_num};

use crate::config::{IndexConfig, MeshConfig};
use crate::index::{index_files, study_files, write_index};
use crate::mesh::parse_mesh_ascii;

#[derive(Debug)]
pub struct IndexSummary {
    pub files: usize,
    pub studies: usize,
    pub aliases: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct MeshSummary {
    pub records: usize,
    pub elapsed: Duration,
}

pub fn run_index(config: &IndexConfig, progress: &ProgressContext) -> Result<IndexSummary> {
    let start = Instant::now();

    if !config.dir.is_dir() {
        bail!("{} is not a directory", config.dir.display());
    }
    let files = study_files(&config.dir)?;
    log::info!(
        "Indexing {} study files with {} workers",
        fmt_num(files.len()),
        config.workers
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()
        .context("Failed to create thread pool")?;

    let pb = progress.stage_line("trials");
    let index = pool.install(|| index_files(&files, &pb));
    pb.finish_and_clear();

    write_index(&index.records, config.output.as_deref())?;

    let summary = IndexSummary {
        files: files.len(),
        studies: index.studies,
        aliases: index.aliases,
        failed: index.failed,
        elapsed: start.elapsed(),
    };

    log::info!("=== Trial Index Summary ===");
    log::info!(
        "Files: {} ({} studies, {} aliases, {} failed)",
        fmt_num(summary.files),
        fmt_num(summary.studies),
        summary.aliases,
        summary.failed
    );
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());

    Ok(summary)
}

pub fn run_mesh(config: &MeshConfig) -> Result<MeshSummary> {
    let start = Instant::now();

    let reader = stitchkit_core::open_text(&config.file)
        .with_context(|| format!("Failed to open {}", config.file.display()))?;
    let records = parse_mesh_ascii(reader)
        .with_context(|| format!("Failed to read {}", config.file.display()))?;

    let mut out = stitchkit_core::TextSink::create(config.output.as_deref())
        .context("Failed to create output")?;
    serde_json::to_writer_pretty(&mut out, &records).context("Failed to write MeSH JSON")?;
    writeln!(out)?;
    out.finish()?;

    let summary = MeshSummary {
        records: records.len(),
        elapsed: start.elapsed(),
    };
    log::info!("=== MeSH Summary ===");
    log::info!("Records: {}", fmt_num(summary.records));
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());
    Ok(summary)
}
