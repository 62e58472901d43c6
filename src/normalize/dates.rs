use chrono::NaiveDate;

/// Format of a complete source date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Use the start of a date range when no exact date is given
pub fn fill_missing_date(when: Option<&str>, from: Option<&str>) -> Option<String> {
    match when.map(str::trim).filter(|w| !w.is_empty()) {
        Some(when) => Some(when.to_string()),
        None => from
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string),
    }
}

/// Pad a year or year-month date with the first month and day
///
/// `1803` becomes `1803-01-01`, `1803-05` becomes `1803-05-01`. Dates that
/// still do not parse after two paddings are returned as padded.
pub fn complete_partial_date(date: &str) -> String {
    let mut date = date.trim().to_string();
    for _ in 0..2 {
        if parse_date(&date).is_some() {
            break;
        }
        date.push_str("-01");
    }
    date
}

/// Parse a complete date, `None` when it is not a valid calendar date
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()
}

/// Fill, pad and parse the date of a record in one step
pub fn resolve_date(when: Option<&str>, from: Option<&str>) -> Option<NaiveDate> {
    fill_missing_date(when, from).and_then(|date| parse_date(&complete_partial_date(&date)))
}
