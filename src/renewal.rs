use chrono::{Months, NaiveDate};
use thiserror::Error;

use crate::expiry::{is_expiring, parse_iso_date};
use crate::models::MouRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenewalError {
    #[error("row {index} is out of range for {len} records")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("row {index} has an unparseable end date {value:?}")]
    MalformedDate { index: usize, value: String },
    #[error("row {index} cannot be extended by {months} months")]
    ExtensionOutOfRange { index: usize, months: u32 },
}

pub fn select_expiring(records: &[MouRecord], as_of: NaiveDate) -> Vec<MouRecord> {
    records
        .iter()
        .filter(|record| is_expiring(record, as_of))
        .cloned()
        .collect()
}

/// The extension applies to the stored end date, so repeat renewals compound.
pub fn renew(
    records: &[MouRecord],
    target_index: usize,
    extension_months: u32,
) -> Result<Vec<MouRecord>, RenewalError> {
    let target = records
        .get(target_index)
        .ok_or(RenewalError::IndexOutOfRange {
            index: target_index,
            len: records.len(),
        })?;
    let current_end =
        parse_iso_date(&target.end_date).ok_or_else(|| RenewalError::MalformedDate {
            index: target_index,
            value: target.end_date.clone(),
        })?;

    let months = extension_months.max(1);
    let new_end = current_end
        .checked_add_months(Months::new(months))
        .ok_or(RenewalError::ExtensionOutOfRange {
            index: target_index,
            months,
        })?;
    let mut updated = records.to_vec();
    updated[target_index].end_date = new_end.format("%Y-%m-%d").to_string();
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn record(institute: &str, end_date: &str) -> MouRecord {
        MouRecord::from_row(
            0,
            &[
                institute.to_string(),
                "2024-01-01".to_string(),
                end_date.to_string(),
                "Dr. Smith".to_string(),
            ],
        )
    }

    #[test]
    fn renew_extends_by_one_month() {
        let records = vec![record("Sample University", "2025-01-15")];
        let updated = renew(&records, 0, 1).unwrap();
        assert_eq!(updated[0].end_date, "2025-02-15");
    }

    #[test]
    fn renew_compounds_on_repeat() {
        let records = vec![record("Sample University", "2025-01-15")];
        let once = renew(&records, 0, 1).unwrap();
        let twice = renew(&once, 0, 1).unwrap();
        assert_eq!(twice[0].end_date, "2025-03-15");
    }

    #[test]
    fn renew_touches_only_the_target_end_date() {
        let records = vec![
            record("Sample University", "2025-01-15"),
            record("Coastal Tech", "2025-03-01"),
            record("Northfield Polytechnic", "2026-06-30"),
        ];
        let updated = renew(&records, 1, 2).unwrap();

        assert_eq!(updated.len(), records.len());
        assert_eq!(updated[0], records[0]);
        assert_eq!(updated[2], records[2]);
        assert_eq!(updated[1].end_date, "2025-05-01");
        let mut expected = records[1].clone();
        expected.end_date = "2025-05-01".to_string();
        assert_eq!(updated[1], expected);
    }

    #[test]
    fn renew_out_of_range_fails_fast() {
        let records = vec![
            record("Sample University", "2025-01-15"),
            record("Coastal Tech", "2025-03-01"),
            record("Northfield Polytechnic", "2026-06-30"),
        ];
        let err = renew(&records, 50, 1).unwrap_err();
        assert_eq!(err, RenewalError::IndexOutOfRange { index: 50, len: 3 });
    }

    #[test]
    fn renew_rejects_unparseable_end_date() {
        let records = vec![record("Sample University", "sometime")];
        let err = renew(&records, 0, 1).unwrap_err();
        assert_eq!(
            err,
            RenewalError::MalformedDate {
                index: 0,
                value: "sometime".to_string()
            }
        );

        let records = vec![record("Sample University", "")];
        assert!(matches!(
            renew(&records, 0, 1),
            Err(RenewalError::MalformedDate { index: 0, .. })
        ));
    }

    #[test]
    fn renew_rejects_extensions_past_the_date_range() {
        let records = vec![record("Sample University", "2025-01-15")];
        let err = renew(&records, 0, u32::MAX).unwrap_err();
        assert_eq!(
            err,
            RenewalError::ExtensionOutOfRange {
                index: 0,
                months: u32::MAX
            }
        );
    }

    #[test]
    fn renew_clamps_to_month_end() {
        let records = vec![record("Sample University", "2025-01-31")];
        let updated = renew(&records, 0, 1).unwrap();
        assert_eq!(updated[0].end_date, "2025-02-28");
    }

    #[test]
    fn renew_normalizes_datetime_end_dates() {
        let records = vec![record("Sample University", "2025-01-15T00:00:00.000Z")];
        let updated = renew(&records, 0, 1).unwrap();
        assert_eq!(updated[0].end_date, "2025-02-15");
    }

    #[test]
    fn zero_extension_is_treated_as_one_month() {
        let records = vec![record("Sample University", "2025-01-15")];
        let updated = renew(&records, 0, 0).unwrap();
        assert_eq!(updated[0].end_date, "2025-02-15");
    }

    #[test]
    fn select_expiring_preserves_order_and_subsets() {
        let as_of = date(2024, 12, 20);
        let records = vec![
            record("Sample University", "2025-01-15"),
            record("Coastal Tech", "2026-06-30"),
            record("Northfield Polytechnic", "2024-10-05"),
            record("Harbor Institute", ""),
            record("Riverside College", "2025-01-05"),
        ];

        let expiring = select_expiring(&records, as_of);
        let names: Vec<&str> = expiring
            .iter()
            .map(|record| record.institute_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["Sample University", "Northfield Polytechnic", "Riverside College"]
        );
        for record in &expiring {
            assert!(records.contains(record));
        }
    }
}
