use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use footdata::{
    config::{
        FetchConfig, PreprocessConfig, DEFAULT_BASE_URL, DEFAULT_END_YEAR, DEFAULT_OUTPUT_FILE,
        DEFAULT_RAW_DIR, DEFAULT_START_YEAR,
    },
    fetch::{self, FetchReport},
    preprocess::{self, PreprocessReport},
};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Fetch football-data.co.uk season results and build one preprocessed CSV"
)]
struct Cli {
    #[arg(long, env = "FOOTDATA_RAW_DIR", default_value = DEFAULT_RAW_DIR, global = true)]
    raw_dir: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clear the raw directory and download every league-season file
    Fetch(FetchArgs),
    /// Merge the raw directory into the preprocessed output file
    Preprocess(PreprocessArgs),
    /// Fetch, then preprocess
    Run {
        #[command(flatten)]
        fetch: FetchArgs,
        #[command(flatten)]
        preprocess: PreprocessArgs,
    },
}

#[derive(Args, Clone)]
struct FetchArgs {
    #[arg(long, value_delimiter = ',', default_values_t = ["E0".to_string(), "E1".to_string(), "E2".to_string(), "E3".to_string()])]
    leagues: Vec<String>,
    #[arg(long, default_value_t = DEFAULT_START_YEAR)]
    start_year: i32,
    #[arg(long, default_value_t = DEFAULT_END_YEAR)]
    end_year: i32,
    #[arg(long, env = "FOOTDATA_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
    #[arg(long, default_value_t = 4)]
    concurrency: usize,
    #[arg(long, default_value_t = 0)]
    max_retries: u32,
    #[arg(long, default_value_t = 500)]
    retry_backoff_ms: u64,
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,
}

#[derive(Args, Clone)]
struct PreprocessArgs {
    #[arg(long, env = "FOOTDATA_OUTPUT", default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,
    #[arg(long)]
    allow_duplicates: bool,
    /// Print the run report as JSON on stdout
    #[arg(long)]
    report_json: bool,
}

impl FetchArgs {
    fn into_config(self, raw_dir: PathBuf) -> FetchConfig {
        FetchConfig {
            base_url: self.base_url,
            raw_dir,
            leagues: self.leagues,
            start_year: self.start_year,
            end_year: self.end_year,
            concurrency: self.concurrency,
            max_retries: self.max_retries,
            retry_backoff_ms: self.retry_backoff_ms,
            timeout_secs: self.timeout_secs,
        }
    }
}

impl PreprocessArgs {
    fn to_config(&self, raw_dir: PathBuf) -> PreprocessConfig {
        PreprocessConfig {
            raw_dir,
            output: self.output.clone(),
            allow_duplicates: self.allow_duplicates,
        }
    }
}

async fn run_fetch(cfg: &FetchConfig) -> Result<FetchReport> {
    let client = fetch::build_client(cfg)?;
    let report = fetch::fetch(&client, cfg).await?;
    if !report.is_complete() {
        for failed in report.failed() {
            error!("{} {}: {}", failed.league, failed.season, failed.url);
        }
        bail!(
            "{} of {} downloads failed",
            report.failed().count(),
            report.outcomes.len()
        );
    }
    Ok(report)
}

async fn run_preprocess(cfg: PreprocessConfig) -> Result<PreprocessReport> {
    // parsing is CPU-bound; keep it off the async workers
    tokio::task::spawn_blocking(move || preprocess::preprocess_with(&cfg)).await?
}

fn print_report(report: &PreprocessReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) parse args ───────────────────────────────────────────────
    let cli = Cli::parse();
    info!(raw_dir = %cli.raw_dir.display(), "startup");

    // ─── 3) dispatch ─────────────────────────────────────────────────
    match cli.command {
        Command::Fetch(args) => {
            run_fetch(&args.into_config(cli.raw_dir)).await?;
        }
        Command::Preprocess(args) => {
            let report = run_preprocess(args.to_config(cli.raw_dir)).await?;
            if args.report_json {
                print_report(&report)?;
            }
        }
        Command::Run {
            fetch: fetch_args,
            preprocess: pre_args,
        } => {
            run_fetch(&fetch_args.into_config(cli.raw_dir.clone())).await?;
            let report = run_preprocess(pre_args.to_config(cli.raw_dir)).await?;
            if pre_args.report_json {
                print_report(&report)?;
            }
        }
    }

    info!("all done");
    Ok(())
}
