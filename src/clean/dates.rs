//! Date and period parsing for raw source exports.
//!
//! Sources disagree on date layout, so we accept a small, fixed set of formats
//! and keep parsing deterministic. Anything else is treated as missing.

use chrono::{Datelike, NaiveDate};

use crate::domain::{Quarter, QuarterKey};

// Two-digit-year layouts come first: `%Y` would happily read "20" as year 20.
const DATE_FORMATS: [&str; 7] = [
    "%d %b %y",
    "%d-%b-%y",
    "%d %b %Y",
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y/%m/%d",
];

/// Parse a calendar date. A trailing time part (`"1995-08-18 00:00"`) is ignored.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    // Timestamps: keep the date part only.
    let date_part = s.split(['T', ' ']).next()?;
    if date_part.len() < s.len() {
        for fmt in DATE_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(date_part, fmt) {
                return Some(d);
            }
        }
    }

    None
}

/// Parse a month label such as `"Jan 2011"` or `"2011 JAN"` to its first day.
pub fn parse_month(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(&format!("1 {s}"), "%d %b %Y")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{s} 1"), "%Y %b %d"))
        .ok()
}

/// Parse a period label to its quarter.
///
/// Accepts quarter labels (`"1989 Q1"`), month labels (`"1989 JAN"`,
/// `"Jan 1989"`) and full dates. Bare years are rejected: they carry no
/// quarter.
pub fn parse_period(s: &str) -> Option<QuarterKey> {
    let s = s.trim();

    if let Some((year, quarter)) = s.split_once(|c: char| c.is_whitespace() || c == '-') {
        let quarter = quarter.trim();
        if quarter.len() == 2 && quarter.to_ascii_uppercase().starts_with('Q') {
            let year = year.trim().parse::<i32>().ok()?;
            let quarter = Quarter::parse(quarter).ok()?;
            return Some(QuarterKey::new(year, quarter));
        }
    }

    let date = parse_month(s).or_else(|| parse_date(s))?;
    date_to_key(date)
}

pub fn date_to_key(date: NaiveDate) -> Option<QuarterKey> {
    let quarter = Quarter::from_month(date.month()).ok()?;
    Some(QuarterKey::new(date.year(), quarter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_in_common_layouts() {
        let d = NaiveDate::from_ymd_opt(2020, 2, 3).unwrap();
        assert_eq!(parse_date("2020-02-03"), Some(d));
        assert_eq!(parse_date("03/02/2020"), Some(d));
        assert_eq!(parse_date("03 Feb 2020"), Some(d));
        assert_eq!(parse_date("03 Feb 20"), Some(d));
        assert_eq!(parse_date("2020-02-03 00:00"), Some(d));
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn months_in_both_orders() {
        let d = NaiveDate::from_ymd_opt(2011, 1, 1).unwrap();
        assert_eq!(parse_month("Jan 2011"), Some(d));
        assert_eq!(parse_month("2011 JAN"), Some(d));
        assert_eq!(parse_month("2011"), None);
    }

    #[test]
    fn periods_map_to_quarters() {
        assert_eq!(parse_period("1989 Q3"), Some(QuarterKey::new(1989, Quarter::Q3)));
        assert_eq!(parse_period("1989 MAY"), Some(QuarterKey::new(1989, Quarter::Q2)));
        assert_eq!(parse_period("Dec 2011"), Some(QuarterKey::new(2011, Quarter::Q4)));
        assert_eq!(parse_period("2015-08-01"), Some(QuarterKey::new(2015, Quarter::Q3)));
        assert_eq!(parse_period("1989"), None);
        assert_eq!(parse_period("1989 Q7"), None);
    }
}
