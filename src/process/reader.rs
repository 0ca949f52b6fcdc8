// src/process/reader.rs
use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::WINDOWS_1252;
use glob::{glob, Pattern};
use rayon::prelude::*;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, info, instrument, warn};

use super::{
    correct::correct_records,
    date_parser::parse_match_date_or_sentinel,
    record::{MatchRecord, RawMatchRecord, RAW_COLUMNS},
};

/// What happened to the rows of one raw file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file: PathBuf,
    /// Data records seen, excluding the header and blank lines.
    pub rows_read: usize,
    pub rows_kept: usize,
    /// Dropped because a required field was empty.
    pub rows_incomplete: usize,
    /// Dropped because a goals or odds field was not a number.
    pub rows_malformed: usize,
    /// Skipped because they carried more fields than the header.
    pub bad_lines: usize,
    /// Kept rows whose date fell back to the sentinel.
    pub sentinel_dates: usize,
}

#[derive(Debug)]
pub struct FileData {
    pub records: Vec<MatchRecord>,
    pub report: FileReport,
}

/// Every file of a raw directory, concatenated in file-name order.
#[derive(Debug, Default)]
pub struct Dataset {
    pub records: Vec<MatchRecord>,
    pub files: Vec<FileReport>,
}

enum RowError {
    Incomplete,
    Malformed,
}

/// Column positions of the required fields in one file's header.
struct ColumnMap([usize; RAW_COLUMNS.len()]);

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut idx = [0usize; RAW_COLUMNS.len()];
        let mut missing = Vec::new();
        for (slot, name) in idx.iter_mut().zip(RAW_COLUMNS) {
            match headers.iter().position(|h| h == name) {
                Some(pos) => *slot = pos,
                None => missing.push(name),
            }
        }
        if !missing.is_empty() {
            return Err(anyhow!("missing required columns: {}", missing.join(",")));
        }
        Ok(Self(idx))
    }

    fn fields<'r>(&self, record: &'r StringRecord) -> Result<[&'r str; RAW_COLUMNS.len()], RowError> {
        let mut out = [""; RAW_COLUMNS.len()];
        for (slot, &pos) in out.iter_mut().zip(self.0.iter()) {
            match record.get(pos) {
                Some(v) if !v.is_empty() => *slot = v,
                _ => return Err(RowError::Incomplete),
            }
        }
        Ok(out)
    }
}

fn number<T: FromStr>(s: &str) -> Result<T, RowError> {
    s.parse().map_err(|_| RowError::Malformed)
}

/// Decimal odds; `NaN` and infinities parse as `f64` but are not prices.
fn odds(s: &str) -> Result<f64, RowError> {
    let v: f64 = number(s)?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(RowError::Malformed)
    }
}

/// Turn one CSV record into a typed row. The bool is set when the date fell
/// back to the sentinel.
fn parse_row(cols: &ColumnMap, record: &StringRecord) -> Result<(RawMatchRecord, bool), RowError> {
    let [div, date, home, away, fthg, ftag, ftr, hthg, htag, htr, whh, whd, wha] =
        cols.fields(record)?;
    let (date, defaulted) = parse_match_date_or_sentinel(date);
    let row = RawMatchRecord {
        div: div.to_string(),
        date,
        home_team: home.to_string(),
        away_team: away.to_string(),
        ft_home_goals: number(fthg)?,
        ft_away_goals: number(ftag)?,
        ft_result: ftr.to_string(),
        ht_home_goals: number(hthg)?,
        ht_away_goals: number(htag)?,
        ht_result: htr.to_string(),
        odds_home_win: odds(whh)?,
        odds_draw: odds(whd)?,
        odds_away_win: odds(wha)?,
    };
    Ok((row, defaulted))
}

/// Parse already-decoded CSV text. `file` only labels the report and errors.
pub fn read_str(text: &str, file: &Path) -> Result<FileData> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = rdr
        .headers()
        .with_context(|| format!("reading header of {}", file.display()))?
        .clone();
    let cols = ColumnMap::from_headers(&headers).with_context(|| file.display().to_string())?;

    let mut report = FileReport {
        file: file.to_path_buf(),
        ..FileReport::default()
    };
    let mut rows = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        let record = result
            .with_context(|| format!("CSV parse error in {} at record {}", file.display(), idx))?;
        report.rows_read += 1;

        if record.len() > headers.len() {
            report.bad_lines += 1;
            debug!(file = %file.display(), record = idx, "skipping over-long line");
            continue;
        }
        match parse_row(&cols, &record) {
            Ok((row, defaulted)) => {
                if defaulted {
                    report.sentinel_dates += 1;
                }
                rows.push(row);
            }
            Err(RowError::Incomplete) => report.rows_incomplete += 1,
            Err(RowError::Malformed) => report.rows_malformed += 1,
        }
    }

    report.rows_kept = rows.len();
    if report.sentinel_dates > 0 {
        warn!(
            file = %file.display(),
            count = report.sentinel_dates,
            "unparseable match dates replaced with 1970-01-01"
        );
    }
    Ok(FileData {
        records: correct_records(rows),
        report,
    })
}

/// Read one raw season file (Windows-1252 / ISO-8859-1) into enriched records.
#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<FileData> {
    let path = path.as_ref();
    info!("Reading football data CSV file {}", path.display());

    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let (text, _, had_errors) = WINDOWS_1252.decode(&bytes);
    if had_errors {
        warn!(file = %path.display(), "undecodable bytes replaced");
    }

    let data = read_str(&text, path)?;
    debug!(
        kept = data.report.rows_kept,
        incomplete = data.report.rows_incomplete,
        malformed = data.report.rows_malformed,
        bad_lines = data.report.bad_lines,
        "file read"
    );
    Ok(data)
}

/// `.csv` files directly inside `dir`, sorted by name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(anyhow!("raw directory {} does not exist", dir.display()));
    }
    let pattern = format!("{}/*.csv", Pattern::escape(&dir.display().to_string()));
    let mut files: Vec<PathBuf> = glob(&pattern)
        .with_context(|| format!("Failed to read glob pattern '{}'", pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Read every `.csv` in `dir` and concatenate them in file-name order. Files
/// are parsed in parallel; any failure fails the whole directory.
#[instrument(level = "info", skip(dir), fields(dir = %dir.as_ref().display()))]
pub fn read_directory<P: AsRef<Path>>(dir: P) -> Result<Dataset> {
    let dir = dir.as_ref();
    info!("Reading football data CSV directory {}", dir.display());

    let files = list_csv_files(dir)?;
    if files.is_empty() {
        warn!("no .csv files in {}", dir.display());
    }

    let parsed: Vec<FileData> = files.par_iter().map(read_file).collect::<Result<_>>()?;

    let mut dataset = Dataset {
        records: Vec::with_capacity(parsed.iter().map(|f| f.records.len()).sum()),
        files: Vec::with_capacity(parsed.len()),
    };
    for file in parsed {
        dataset.records.extend(file.records);
        dataset.files.push(file.report);
    }
    info!(
        files = dataset.files.len(),
        rows = dataset.records.len(),
        "directory read"
    );
    Ok(dataset)
}
