// src/fetch/urls.rs
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// One league-season file to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonFile {
    pub league: String,
    /// Two concatenated two-digit years, e.g. `"1011"`.
    pub season: String,
}

impl SeasonFile {
    pub fn new(league: impl Into<String>, start_year: i32) -> Self {
        Self {
            league: league.into(),
            season: season_code(start_year),
        }
    }

    pub fn url(&self, base: &Url) -> Result<Url> {
        season_url(base, &self.season, &self.league)
    }

    pub fn local_path(&self, raw_dir: &Path) -> PathBuf {
        raw_dir.join(raw_file_name(&self.league, &self.season))
    }
}

/// `2010` (or `10`) → `"1011"`, `1999` → `"9900"`.
pub fn season_code(start_year: i32) -> String {
    let yy = start_year.rem_euclid(100);
    format!("{:02}{:02}", yy, (yy + 1) % 100)
}

/// Parse the archive root, making sure it joins as a directory.
pub fn parse_base_url(base: &str) -> Result<Url> {
    let normalised = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    };
    Url::parse(&normalised).with_context(|| format!("parsing base URL {}", base))
}

/// `<base>/<season>/<league>.csv`
pub fn season_url(base: &Url, season: &str, league: &str) -> Result<Url> {
    base.join(&format!("{}/{}.csv", season, league))
        .with_context(|| format!("joining {}/{}.csv onto {}", season, league, base))
}

pub fn raw_file_name(league: &str, season: &str) -> String {
    format!("{}_{}.csv", league, season)
}

/// Every (season, league) pair for start years in `[start_year, end_year)`,
/// seasons outermost.
pub fn plan<S: AsRef<str>>(leagues: &[S], start_year: i32, end_year: i32) -> Vec<SeasonFile> {
    (start_year..end_year)
        .flat_map(move |year| {
            leagues
                .iter()
                .map(move |league| SeasonFile::new(league.as_ref(), year))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_code() {
        assert_eq!(season_code(10), "1011");
        assert_eq!(season_code(2010), "1011");
        assert_eq!(season_code(0), "0001");
        assert_eq!(season_code(1999), "9900");
        assert_eq!(season_code(9), "0910");
    }

    #[test]
    fn test_season_url_and_file_name() -> Result<()> {
        let base = parse_base_url("http://www.football-data.co.uk/mmz4281")?;
        let file = SeasonFile::new("E0", 10);
        assert_eq!(
            file.url(&base)?.as_str(),
            "http://www.football-data.co.uk/mmz4281/1011/E0.csv"
        );
        assert_eq!(
            file.local_path(Path::new("raw")),
            Path::new("raw").join("E0_1011.csv")
        );
        Ok(())
    }

    #[test]
    fn test_plan_orders_seasons_then_leagues() {
        let targets = plan(&["E0", "E1"], 14, 16);
        let names: Vec<String> = targets
            .iter()
            .map(|t| raw_file_name(&t.league, &t.season))
            .collect();
        assert_eq!(
            names,
            vec!["E0_1415.csv", "E1_1415.csv", "E0_1516.csv", "E1_1516.csv"]
        );
    }

    #[test]
    fn test_plan_empty_range() {
        assert!(plan(&["E0"], 16, 16).is_empty());
        assert!(plan(&["E0"], 16, 10).is_empty());
    }
}
