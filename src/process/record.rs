// src/process/record.rs
use chrono::NaiveDate;
use serde::Serialize;

/// Raw-file column names this crate reads, in source order.
pub const RAW_COLUMNS: [&str; 13] = [
    "Div", "Date", "HomeTeam", "AwayTeam", "FTHG", "FTAG", "FTR", "HTHG", "HTAG", "HTR", "WHH",
    "WHD", "WHA",
];

/// Output header, `FDIndex` first.
pub const OUTPUT_COLUMNS: [&str; 24] = [
    "FDIndex",
    "Div",
    "MatchNo",
    "SeasonYear",
    "SeasonMatchNo",
    "MatchDate",
    "HomeTeam",
    "AwayTeam",
    "OddsHomeWin",
    "OddsDraw",
    "OddsAwayWin",
    "OddsWinDiff",
    "F_FTHomeGoals",
    "F_FTAwayGoals",
    "F_FTResult",
    "F_FTHomeWin",
    "F_FTDraw",
    "F_FTAwayWin",
    "F_HTHomeGoals",
    "F_HTAwayGoals",
    "F_HTResult",
    "F_HTHomeWin",
    "F_HTDraw",
    "F_HTAwayWin",
];

/// One row of a raw season file, already typed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMatchRecord {
    pub div: String,
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub ft_home_goals: u32,
    pub ft_away_goals: u32,
    pub ft_result: String,
    pub ht_home_goals: u32,
    pub ht_away_goals: u32,
    pub ht_result: String,
    pub odds_home_win: f64,
    pub odds_draw: f64,
    pub odds_away_win: f64,
}

/// H/D/A indicator triple; exactly one is 1 for a valid result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outcome {
    pub home_win: u8,
    pub draw: u8,
    pub away_win: u8,
}

/// A corrected, feature-enriched match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub fd_index: String,
    pub div: String,
    pub match_no: i64,
    pub season_year: i32,
    pub season_match_no: u32,
    pub match_date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub odds_home_win: f64,
    pub odds_draw: f64,
    pub odds_away_win: f64,
    pub odds_win_diff: f64,
    pub ft_home_goals: u32,
    pub ft_away_goals: u32,
    pub ft_result: String,
    pub ft: Outcome,
    pub ht_home_goals: u32,
    pub ht_away_goals: u32,
    pub ht_result: String,
    pub ht: Outcome,
}

/// Flat, serialisable view of a [`MatchRecord`] in output column order.
#[derive(Debug, Serialize)]
pub struct OutputRow<'a> {
    #[serde(rename = "FDIndex")]
    pub fd_index: &'a str,
    #[serde(rename = "Div")]
    pub div: &'a str,
    #[serde(rename = "MatchNo")]
    pub match_no: i64,
    #[serde(rename = "SeasonYear")]
    pub season_year: i32,
    #[serde(rename = "SeasonMatchNo")]
    pub season_match_no: u32,
    #[serde(rename = "MatchDate")]
    pub match_date: NaiveDate,
    #[serde(rename = "HomeTeam")]
    pub home_team: &'a str,
    #[serde(rename = "AwayTeam")]
    pub away_team: &'a str,
    #[serde(rename = "OddsHomeWin")]
    pub odds_home_win: f64,
    #[serde(rename = "OddsDraw")]
    pub odds_draw: f64,
    #[serde(rename = "OddsAwayWin")]
    pub odds_away_win: f64,
    #[serde(rename = "OddsWinDiff")]
    pub odds_win_diff: f64,
    #[serde(rename = "F_FTHomeGoals")]
    pub ft_home_goals: u32,
    #[serde(rename = "F_FTAwayGoals")]
    pub ft_away_goals: u32,
    #[serde(rename = "F_FTResult")]
    pub ft_result: &'a str,
    #[serde(rename = "F_FTHomeWin")]
    pub ft_home_win: u8,
    #[serde(rename = "F_FTDraw")]
    pub ft_draw: u8,
    #[serde(rename = "F_FTAwayWin")]
    pub ft_away_win: u8,
    #[serde(rename = "F_HTHomeGoals")]
    pub ht_home_goals: u32,
    #[serde(rename = "F_HTAwayGoals")]
    pub ht_away_goals: u32,
    #[serde(rename = "F_HTResult")]
    pub ht_result: &'a str,
    #[serde(rename = "F_HTHomeWin")]
    pub ht_home_win: u8,
    #[serde(rename = "F_HTDraw")]
    pub ht_draw: u8,
    #[serde(rename = "F_HTAwayWin")]
    pub ht_away_win: u8,
}

impl<'a> From<&'a MatchRecord> for OutputRow<'a> {
    fn from(m: &'a MatchRecord) -> Self {
        Self {
            fd_index: &m.fd_index,
            div: &m.div,
            match_no: m.match_no,
            season_year: m.season_year,
            season_match_no: m.season_match_no,
            match_date: m.match_date,
            home_team: &m.home_team,
            away_team: &m.away_team,
            odds_home_win: m.odds_home_win,
            odds_draw: m.odds_draw,
            odds_away_win: m.odds_away_win,
            odds_win_diff: m.odds_win_diff,
            ft_home_goals: m.ft_home_goals,
            ft_away_goals: m.ft_away_goals,
            ft_result: &m.ft_result,
            ft_home_win: m.ft.home_win,
            ft_draw: m.ft.draw,
            ft_away_win: m.ft.away_win,
            ht_home_goals: m.ht_home_goals,
            ht_away_goals: m.ht_away_goals,
            ht_result: &m.ht_result,
            ht_home_win: m.ht.home_win,
            ht_draw: m.ht.draw,
            ht_away_win: m.ht.away_win,
        }
    }
}
