// src/config.rs

use std::{path::PathBuf, time::Duration};

/// Results archive root; seasons live under `<base>/<season>/<league>.csv`.
pub const DEFAULT_BASE_URL: &str = "http://www.football-data.co.uk/mmz4281/";
pub const DEFAULT_RAW_DIR: &str = "content";
pub const DEFAULT_OUTPUT_FILE: &str = "content/preprocessed/preprocessed.csv";

/// English leagues, Premier League down to League Two.
pub const DEFAULT_LEAGUES: &[&str] = &["E0", "E1", "E2", "E3"];
pub const DEFAULT_START_YEAR: i32 = 0;
pub const DEFAULT_END_YEAR: i32 = 16;

/// Settings for downloading raw season files.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    pub raw_dir: PathBuf,
    pub leagues: Vec<String>,
    /// First season start year (inclusive).
    pub start_year: i32,
    /// Last season start year (exclusive).
    pub end_year: i32,
    /// Maximum downloads in flight. 1 downloads strictly in sequence.
    pub concurrency: usize,
    /// Extra attempts per file after the first failure.
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            raw_dir: PathBuf::from(DEFAULT_RAW_DIR),
            leagues: DEFAULT_LEAGUES.iter().map(|l| l.to_string()).collect(),
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            concurrency: 4,
            max_retries: 0,
            retry_backoff_ms: 500,
            timeout_secs: 60,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings for turning the raw directory into the preprocessed file.
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    pub raw_dir: PathBuf,
    pub output: PathBuf,
    /// Keep going (with warnings) when two rows share an `FDIndex`.
    pub allow_duplicates: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from(DEFAULT_RAW_DIR),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            allow_duplicates: false,
        }
    }
}
