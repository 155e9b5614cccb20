//! Field Parsing Module
//! Mixed-format date parsing (day-first) and comma-grouped number normalization.

use chrono::NaiveDate;

/// Unambiguous year-first layouts.
const YEAR_FIRST_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

/// Day-first layouts. Two-digit-year variants come first: `%Y` would happily
/// read "13" as the year 13.
const DAY_FIRST_FORMATS: [&str; 12] = [
    "%d/%m/%y",
    "%d-%m-%y",
    "%d.%m.%y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%B-%Y",
    "%d %b, %Y",
];

/// Month-first fallbacks for values that cannot be read day-first (e.g. "12/31/2013").
const MONTH_FIRST_FORMATS: [&str; 9] = [
    "%m/%d/%y",
    "%m-%d-%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%b-%d-%Y",
];

/// Parse a date string written in any supported layout.
///
/// Ambiguous numeric dates are read day-first ("05/03/2013" is 5 March 2013).
/// A trailing time of day ("2013-03-05 14:30:00", "2013-03-05T00:00:00") is
/// accepted and discarded.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = strip_time_of_day(raw.trim());
    if value.is_empty() {
        return None;
    }

    // Only a four-digit leading group may be read as a year ("05/03/13" is not 0005-03-13).
    let year_first = value.len() > 4 && value.chars().take(4).all(|c| c.is_ascii_digit());
    let year_first_formats: &[&str] = if year_first { &YEAR_FIRST_FORMATS } else { &[] };

    year_first_formats
        .iter()
        .chain(DAY_FIRST_FORMATS.iter())
        .chain(MONTH_FIRST_FORMATS.iter())
        .find_map(|fmt| NaiveDate::parse_from_str(&value, fmt).ok())
}

fn strip_time_of_day(value: &str) -> String {
    if let Some((date, time)) = value.split_once('T') {
        if time.contains(':') && date.chars().all(|c| c.is_ascii_digit() || c == '-') {
            return date.to_string();
        }
    }

    value
        .split_whitespace()
        .filter(|token| {
            !token.contains(':')
                && !token.eq_ignore_ascii_case("AM")
                && !token.eq_ignore_ascii_case("PM")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a numeric field stored as text: drop thousands separators and
/// whitespace, then parse as `f64`.
///
/// Empty, non-numeric and non-finite values yield `None`; callers turn that
/// into a parse error rather than a default.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ambiguous_dates_are_day_first() {
        assert_eq!(parse_date("05/03/2013"), Some(ymd(2013, 3, 5)));
        assert_eq!(parse_date("05-03-2013"), Some(ymd(2013, 3, 5)));
        assert_eq!(parse_date("5/3/13"), Some(ymd(2013, 3, 5)));
    }

    #[test]
    fn iso_dates_are_unambiguous() {
        assert_eq!(parse_date("2013-03-05"), Some(ymd(2013, 3, 5)));
        assert_eq!(parse_date("2013-03-05 00:00:00"), Some(ymd(2013, 3, 5)));
        assert_eq!(parse_date("2013-03-05T08:15:00"), Some(ymd(2013, 3, 5)));
    }

    #[test]
    fn mixed_layouts_in_one_column() {
        let column = ["31-07-2012", "1/1/2011", "14 March 2014", "12/31/2013"];
        let parsed: Vec<_> = column.iter().map(|v| parse_date(v)).collect();
        assert_eq!(
            parsed,
            vec![
                Some(ymd(2012, 7, 31)),
                Some(ymd(2011, 1, 1)),
                Some(ymd(2014, 3, 14)),
                Some(ymd(2013, 12, 31)),
            ]
        );
    }

    #[test]
    fn garbage_dates_are_rejected() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("32/13/2013"), None);
        assert_eq!(parse_date("2013-02-30"), None);
    }

    #[test]
    fn numbers_drop_thousands_separators() {
        assert_eq!(parse_number("1,200"), Some(1200.0));
        assert_eq!(parse_number(" 1,234,567.89 "), Some(1_234_567.89));
        assert_eq!(parse_number("-50"), Some(-50.0));
        assert_eq!(parse_number("0.1"), Some(0.1));
    }

    #[test]
    fn non_numeric_residue_is_rejected() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("12a"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }
}
