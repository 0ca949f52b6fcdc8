// src/fetch/mod.rs

use anyhow::{Context, Result};
use futures::future::join_all;
use reqwest::Client;
use serde::Serialize;
use std::{path::PathBuf, sync::Arc};
use tokio::{sync::Semaphore, time::Instant};
use tracing::{error, info, instrument};
use url::Url;

use crate::config::FetchConfig;

pub mod files;
pub mod urls;

pub use files::{delete_raw_files, download_file};
pub use urls::{plan, season_code, SeasonFile};

/// Result of downloading one league-season file.
#[derive(Debug, Clone, Serialize)]
pub struct FetchOutcome {
    pub league: String,
    pub season: String,
    pub url: String,
    pub path: PathBuf,
    /// Bytes written on success, error chain on failure.
    pub result: Result<u64, String>,
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-file outcomes of one fetch, in plan order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchReport {
    pub deleted: usize,
    pub outcomes: Vec<FetchOutcome>,
}

impl FetchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &FetchOutcome> {
        self.outcomes.iter().filter(|o| o.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FetchOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn is_complete(&self) -> bool {
        self.failed().next().is_none()
    }

    pub fn total_bytes(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .sum()
    }
}

/// Build a client carrying the configured request timeout.
pub fn build_client(cfg: &FetchConfig) -> Result<Client> {
    Client::builder()
        .timeout(cfg.timeout())
        .build()
        .context("building HTTP client")
}

/// Resolve every target against `base` so a bad URL fails before anything on
/// disk is touched.
pub fn resolve(base: &Url, targets: Vec<SeasonFile>) -> Result<Vec<(SeasonFile, Url)>> {
    targets
        .into_iter()
        .map(|t| {
            let url = t.url(base)?;
            Ok((t, url))
        })
        .collect()
}

/// Download every resolved target into `cfg.raw_dir`, at most
/// `cfg.concurrency` at a time. A failed file never stops the others.
pub async fn fetch_files(
    client: &Client,
    cfg: &FetchConfig,
    jobs: &[(SeasonFile, Url)],
) -> Result<Vec<FetchOutcome>> {
    let sem = Arc::new(Semaphore::new(cfg.concurrency.max(1)));
    let mut handles = Vec::with_capacity(jobs.len());

    for (target, url) in jobs {
        let url = url.clone();
        let path = target.local_path(&cfg.raw_dir);
        let client = client.clone();
        let sem = sem.clone();
        let (retries, backoff) = (cfg.max_retries, cfg.retry_backoff_ms);
        let (league, season) = (target.league.clone(), target.season.clone());

        handles.push(tokio::spawn(async move {
            let result = match sem.acquire_owned().await {
                Ok(_permit) => {
                    info!("Fetching {} to {}", url, path.display());
                    download_file(&client, &url, &path, retries, backoff)
                        .await
                        .map_err(|e| format!("{:#}", e))
                }
                Err(e) => Err(format!("download slot unavailable: {}", e)),
            };
            FetchOutcome {
                league,
                season,
                url: url.to_string(),
                path,
                result,
            }
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for joined in join_all(handles).await {
        outcomes.push(joined.context("download task panicked")?);
    }
    Ok(outcomes)
}

/// Clear the raw directory, then fetch every (league, season) the config
/// names. Individual download failures land in the report, not in `Err`.
#[instrument(level = "info", skip(client, cfg), fields(raw_dir = %cfg.raw_dir.display()))]
pub async fn fetch(client: &Client, cfg: &FetchConfig) -> Result<FetchReport> {
    info!(
        leagues = ?cfg.leagues,
        start_year = cfg.start_year,
        end_year = cfg.end_year,
        "Fetching files"
    );
    let start = Instant::now();

    let base = urls::parse_base_url(&cfg.base_url)?;
    let jobs = resolve(&base, plan(&cfg.leagues, cfg.start_year, cfg.end_year))?;

    let deleted = delete_raw_files(&cfg.raw_dir)?;
    let outcomes = fetch_files(client, cfg, &jobs).await?;
    let report = FetchReport { deleted, outcomes };

    for failed in report.failed() {
        if let Err(e) = &failed.result {
            error!(league = %failed.league, season = %failed.season, "{}", e);
        }
    }
    info!(
        ok = report.succeeded().count(),
        failed = report.failed().count(),
        bytes = report.total_bytes(),
        elapsed = ?start.elapsed(),
        "fetch done"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    fn outcome(league: &str, result: Result<u64, String>) -> FetchOutcome {
        FetchOutcome {
            league: league.to_string(),
            season: "1011".to_string(),
            url: format!("http://example.invalid/1011/{}.csv", league),
            path: PathBuf::from(format!("{}_1011.csv", league)),
            result,
        }
    }

    #[test]
    fn test_report_aggregates() {
        let report = FetchReport {
            deleted: 0,
            outcomes: vec![
                outcome("E0", Ok(100)),
                outcome("E1", Err("404".into())),
                outcome("E2", Ok(50)),
            ],
        };
        assert!(!report.is_complete());
        assert_eq!(report.succeeded().count(), 2);
        assert_eq!(report.failed().map(|o| o.league.as_str()).collect::<Vec<_>>(), vec!["E1"]);
        assert_eq!(report.total_bytes(), 150);
    }

    #[tokio::test]
    async fn test_fetch_reports_every_failure_in_plan_order() -> Result<()> {
        let tmp = tempdir()?;
        fs::write(tmp.path().join("E0_0910.csv"), "stale")?;

        let cfg = FetchConfig {
            base_url: "http://127.0.0.1:1/mmz4281".to_string(),
            raw_dir: tmp.path().to_path_buf(),
            leagues: vec!["E0".into(), "E1".into()],
            start_year: 10,
            end_year: 12,
            concurrency: 2,
            timeout_secs: 5,
            ..FetchConfig::default()
        };
        let client = build_client(&cfg)?;
        let report = fetch(&client, &cfg).await?;

        assert_eq!(report.deleted, 1);
        assert!(!tmp.path().join("E0_0910.csv").exists());
        let seen: Vec<String> = report
            .outcomes
            .iter()
            .map(|o| format!("{}_{}", o.league, o.season))
            .collect();
        assert_eq!(seen, vec!["E0_1011", "E1_1011", "E0_1112", "E1_1112"]);
        assert_eq!(report.failed().count(), 4);
        assert_eq!(
            report.outcomes[0].url,
            "http://127.0.0.1:1/mmz4281/1011/E0.csv"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_bad_base_url_leaves_raw_dir_alone() -> Result<()> {
        let tmp = tempdir()?;
        fs::write(tmp.path().join("E0_1011.csv"), "Div\n")?;
        let cfg = FetchConfig {
            base_url: "not a url".to_string(),
            raw_dir: tmp.path().to_path_buf(),
            ..FetchConfig::default()
        };
        let client = Client::new();
        assert!(fetch(&client, &cfg).await.is_err());
        assert!(tmp.path().join("E0_1011.csv").exists());
        Ok(())
    }

    /// Serve `body` for `hit`, 404 for every other path. One request per
    /// connection.
    async fn serve_one_file(hit: &'static str, body: &'static [u8]) -> Result<String> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match sock.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&buf);
                    let path = head.split_whitespace().nth(1).unwrap_or("");
                    let (status, payload): (&str, &[u8]) = if path == hit {
                        ("200 OK", body)
                    } else {
                        ("404 Not Found", b"missing")
                    };
                    let header = format!(
                        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        status,
                        payload.len()
                    );
                    let _ = sock.write_all(header.as_bytes()).await;
                    let _ = sock.write_all(payload).await;
                    let _ = sock.shutdown().await;
                });
            }
        });
        Ok(format!("http://{}/mmz4281", addr))
    }

    #[tokio::test]
    async fn test_fetch_writes_body_and_reports_404() -> Result<()> {
        const BODY: &[u8] = b"Div,Date,HomeTeam\nE0,14/08/10,Arsenal\n";
        let base_url = serve_one_file("/mmz4281/1011/E0.csv", BODY).await?;
        let tmp = tempdir()?;
        let cfg = FetchConfig {
            base_url,
            raw_dir: tmp.path().to_path_buf(),
            leagues: vec!["E0".into(), "E1".into()],
            start_year: 10,
            end_year: 11,
            concurrency: 2,
            timeout_secs: 5,
            ..FetchConfig::default()
        };
        let client = build_client(&cfg)?;
        let report = fetch(&client, &cfg).await?;

        assert_eq!(report.outcomes.len(), 2);
        let (e0, e1) = (&report.outcomes[0], &report.outcomes[1]);
        assert_eq!((e0.league.as_str(), e1.league.as_str()), ("E0", "E1"));
        assert_eq!(e0.result, Ok(BODY.len() as u64));
        assert_eq!(fs::read(tmp.path().join("E0_1011.csv"))?, BODY);
        assert!(e1.result.as_ref().is_err_and(|e| e.contains("404 Not Found")));
        assert!(!tmp.path().join("E1_1011.csv").exists());
        assert_eq!(report.total_bytes(), BODY.len() as u64);
        Ok(())
    }
}
