use chrono::{DateTime, Datelike, Months, NaiveDate};

use crate::models::MouRecord;

pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|datetime| datetime.date_naive())
}

pub fn months_between(end: NaiveDate, as_of: NaiveDate) -> i32 {
    if end < as_of {
        return -months_between(as_of, end);
    }
    let mut months =
        (end.year() - as_of.year()) * 12 + (end.month() as i32 - as_of.month() as i32);
    if months > 0 {
        let stepped = as_of.checked_add_months(Months::new(months as u32));
        if stepped.is_some_and(|date| date > end) {
            months -= 1;
        }
    }
    months
}

pub fn months_remaining(record: &MouRecord, as_of: NaiveDate) -> Option<i32> {
    parse_iso_date(&record.end_date).map(|end| months_between(end, as_of))
}

pub fn is_expiring(record: &MouRecord, as_of: NaiveDate) -> bool {
    months_remaining(record, as_of).is_some_and(|months| months <= 1)
}

/// Unlike `is_expiring`, rows a full month or more past their end date are out.
pub fn needs_renewal_notice(record: &MouRecord, as_of: NaiveDate) -> bool {
    months_remaining(record, as_of).is_some_and(|months| (0..=1).contains(&months))
}
