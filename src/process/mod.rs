// src/process/mod.rs
pub mod correct;
pub mod date_parser;
pub mod reader;
pub mod record;

pub use correct::{correct_record, correct_records, season_year};
pub use date_parser::{parse_match_date, parse_match_date_or_sentinel, SENTINEL_DATE};
pub use reader::{read_directory, read_file, Dataset, FileData, FileReport};
pub use record::{MatchRecord, Outcome, OutputRow, RawMatchRecord, OUTPUT_COLUMNS, RAW_COLUMNS};
