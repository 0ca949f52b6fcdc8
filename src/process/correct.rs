// src/process/correct.rs
use chrono::{Datelike, NaiveDate};

use super::record::{MatchRecord, Outcome, RawMatchRecord};

/// Known misspellings in the raw files → canonical team name.
static TEAM_NAME_FIXES: &[(&str, &str)] = &[("Middlesboro", "Middlesbrough")];

/// Starting calendar year of the season `date` falls in. Seasons turn over on
/// 1 August.
pub fn season_year(date: NaiveDate) -> i32 {
    if date.month() < 8 {
        date.year() - 1
    } else {
        date.year()
    }
}

pub fn match_no(season_year: i32, season_match_no: u32) -> i64 {
    i64::from(season_year) * 10_000 + i64::from(season_match_no)
}

/// `"E0"` + `20100005` → `"E020100005"`
pub fn fd_index(div: &str, match_no: i64) -> String {
    format!("{}{}", div, match_no)
}

/// Only an exact `"H"`, `"D"` or `"A"` sets a flag; anything else is all zero.
pub fn outcome_flags(code: &str) -> Outcome {
    Outcome {
        home_win: u8::from(code == "H"),
        draw: u8::from(code == "D"),
        away_win: u8::from(code == "A"),
    }
}

pub fn correct_team_name(name: &str) -> String {
    TEAM_NAME_FIXES
        .iter()
        .find(|(wrong, _)| *wrong == name)
        .map(|(_, right)| right.to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Enrich one row. `season_match_no` is its 1-based position in the file.
pub fn correct_record(raw: RawMatchRecord, season_match_no: u32) -> MatchRecord {
    let season_year = season_year(raw.date);
    let match_no = match_no(season_year, season_match_no);
    let fd_index = fd_index(&raw.div, match_no);

    MatchRecord {
        fd_index,
        match_no,
        season_year,
        season_match_no,
        match_date: raw.date,
        home_team: correct_team_name(&raw.home_team),
        away_team: correct_team_name(&raw.away_team),
        odds_win_diff: (raw.odds_home_win - raw.odds_away_win).abs(),
        odds_home_win: raw.odds_home_win,
        odds_draw: raw.odds_draw,
        odds_away_win: raw.odds_away_win,
        ft_home_goals: raw.ft_home_goals,
        ft_away_goals: raw.ft_away_goals,
        ft: outcome_flags(&raw.ft_result),
        ft_result: raw.ft_result,
        ht_home_goals: raw.ht_home_goals,
        ht_away_goals: raw.ht_away_goals,
        ht: outcome_flags(&raw.ht_result),
        ht_result: raw.ht_result,
        div: raw.div,
    }
}

/// Enrich a whole file's rows, numbering them in the order given.
pub fn correct_records(rows: Vec<RawMatchRecord>) -> Vec<MatchRecord> {
    rows.into_iter()
        .zip(1u32..)
        .map(|(raw, n)| correct_record(raw, n))
        .collect()
}
