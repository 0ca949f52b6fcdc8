// src/lib.rs

pub mod config;
pub mod fetch;
pub mod preprocess;
pub mod process;

pub use config::{FetchConfig, PreprocessConfig};
pub use fetch::{fetch, FetchOutcome, FetchReport};
pub use preprocess::{preprocess, PreprocessReport};
