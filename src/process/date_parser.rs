use chrono::{Datelike, NaiveDate};

/// Substituted for match dates that fail to parse.
pub const SENTINEL_DATE: NaiveDate = match NaiveDate::from_ymd_opt(1970, 1, 1) {
    Some(d) => d,
    None => panic!("1970-01-01 is a valid date"),
};

/// Parse a `DD/MM/YYYY` or `DD/MM/YY` match date.
///
/// Anything longer than 8 characters is read with a four digit year, the rest
/// with a two digit year (00-68 → 20xx, 69-99 → 19xx).
pub fn parse_match_date(text: &str) -> Option<NaiveDate> {
    let s = text.trim();
    if s.len() > 8 {
        return NaiveDate::parse_from_str(s, "%d/%m/%Y").ok();
    }
    // chrono pivots at 70, POSIX strptime at 69
    let d = NaiveDate::parse_from_str(s, "%d/%m/%y").ok()?;
    if d.year() == 2069 {
        d.with_year(1969)
    } else {
        Some(d)
    }
}

/// Like [`parse_match_date`], falling back to [`SENTINEL_DATE`]. The flag is
/// `true` when the fallback was used.
pub fn parse_match_date_or_sentinel(text: &str) -> (NaiveDate, bool) {
    match parse_match_date(text) {
        Some(d) => (d, false),
        None => (SENTINEL_DATE, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_four_and_two_digit_years() {
        assert_eq!(parse_match_date("15/08/2010"), Some(ymd(2010, 8, 15)));
        assert_eq!(parse_match_date("15/08/10"), Some(ymd(2010, 8, 15)));
        assert_eq!(parse_match_date(" 01/01/99 "), Some(ymd(1999, 1, 1)));
        // single digit day/month still counts as a short date
        assert_eq!(parse_match_date("1/2/03"), Some(ymd(2003, 2, 1)));
    }

    #[test]
    fn test_two_digit_year_pivot() {
        assert_eq!(parse_match_date("15/08/68"), Some(ymd(2068, 8, 15)));
        assert_eq!(parse_match_date("15/08/69"), Some(ymd(1969, 8, 15)));
        assert_eq!(parse_match_date("15/08/70"), Some(ymd(1970, 8, 15)));
        assert_eq!(parse_match_date("29/02/2069"), None);
        assert_eq!(parse_match_date("15/08/2069"), Some(ymd(2069, 8, 15)));
    }

    #[test]
    fn test_sentinel_on_garbage() {
        assert_eq!(parse_match_date("not-a-date"), None);
        assert_eq!(parse_match_date_or_sentinel("not-a-date"), (ymd(1970, 1, 1), true));
        assert_eq!(parse_match_date_or_sentinel(""), (SENTINEL_DATE, true));
        assert_eq!(parse_match_date_or_sentinel("31/02/2010"), (SENTINEL_DATE, true));
        assert_eq!(parse_match_date_or_sentinel("15/08/2010"), (ymd(2010, 8, 15), false));
    }
}
