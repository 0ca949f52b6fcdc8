// src/preprocess.rs

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::{
    collections::HashMap,
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};

use crate::{
    config::PreprocessConfig,
    process::{read_directory, FileReport, MatchRecord, OutputRow, OUTPUT_COLUMNS},
};

/// Summary of one preprocessing run.
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessReport {
    pub output: PathBuf,
    pub rows_written: usize,
    pub files: Vec<FileReport>,
    /// `FDIndex` values shared by more than one row, sorted.
    pub duplicate_indexes: Vec<String>,
}

/// Stable sort by match date, then division.
pub fn sort_records(records: &mut [MatchRecord]) {
    records.sort_by(|a, b| {
        a.match_date
            .cmp(&b.match_date)
            .then_with(|| a.div.cmp(&b.div))
    });
}

/// Every `FDIndex` that occurs more than once.
pub fn duplicate_indexes(records: &[MatchRecord]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    for r in records {
        *counts.entry(r.fd_index.as_str()).or_default() += 1;
    }
    let mut dups: Vec<String> = counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(k, _)| k.to_string())
        .collect();
    dups.sort();
    dups
}

/// Write `records` in output column order, replacing `path`.
pub fn write_preprocessed(records: &[MatchRecord], path: &Path) -> Result<()> {
    info!("Writing preprocessed results file {}", path.display());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("creating output file {}", path.display()))?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));
    wtr.write_record(OUTPUT_COLUMNS)
        .context("writing header row")?;
    for r in records {
        wtr.serialize(OutputRow::from(r))
            .with_context(|| format!("writing row {}", r.fd_index))?;
    }
    wtr.flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

/// Read every raw file in `raw_dir`, sort, validate keys and write one output
/// file.
pub fn preprocess<P: AsRef<Path>, Q: AsRef<Path>>(raw_dir: P, output: Q) -> Result<PreprocessReport> {
    preprocess_with(&PreprocessConfig {
        raw_dir: raw_dir.as_ref().to_path_buf(),
        output: output.as_ref().to_path_buf(),
        ..PreprocessConfig::default()
    })
}

#[instrument(level = "info", skip(cfg), fields(raw_dir = %cfg.raw_dir.display(), output = %cfg.output.display()))]
pub fn preprocess_with(cfg: &PreprocessConfig) -> Result<PreprocessReport> {
    let dataset = read_directory(&cfg.raw_dir)?;
    let mut records = dataset.records;

    info!(rows = records.len(), "Sorting data");
    sort_records(&mut records);

    let dups = duplicate_indexes(&records);
    if !dups.is_empty() {
        if !cfg.allow_duplicates {
            bail!(
                "{} duplicate FDIndex values (first: {})",
                dups.len(),
                dups[0]
            );
        }
        for d in &dups {
            warn!(fd_index = %d, "duplicate FDIndex");
        }
    }

    write_preprocessed(&records, &cfg.output)?;

    let dropped: usize = dataset
        .files
        .iter()
        .map(|f| f.rows_incomplete + f.rows_malformed + f.bad_lines)
        .sum();
    info!(
        rows = records.len(),
        dropped,
        duplicates = dups.len(),
        "preprocess done"
    );

    Ok(PreprocessReport {
        output: cfg.output.clone(),
        rows_written: records.len(),
        files: dataset.files,
        duplicate_indexes: dups,
    })
}
