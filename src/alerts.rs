use crate::expiry::parse_iso_date;
use crate::models::{Alert, MouRecord};

pub fn build_alerts(expiring: &[MouRecord]) -> Vec<Alert> {
    expiring
        .iter()
        .filter_map(|record| {
            let end = parse_iso_date(&record.end_date)?;
            Some(Alert {
                institute_name: record.institute_name.clone(),
                message: format!(
                    "MOU with {} expires on {}",
                    record.institute_name,
                    end.format("%b %-d, %Y")
                ),
                end_date: record.end_date.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(institute: &str, end_date: &str) -> MouRecord {
        MouRecord::from_row(
            0,
            &[
                institute.to_string(),
                "2024-01-01".to_string(),
                end_date.to_string(),
            ],
        )
    }

    #[test]
    fn one_alert_per_record_in_order() {
        let expiring = vec![
            record("Sample University", "2025-01-15"),
            record("Coastal Tech", "2025-02-01"),
        ];
        let alerts = build_alerts(&expiring);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].institute_name, "Sample University");
        assert_eq!(alerts[1].institute_name, "Coastal Tech");
    }

    #[test]
    fn message_embeds_institute_and_formatted_date() {
        let alerts = build_alerts(&[record("Sample University", "2025-01-15")]);
        assert_eq!(
            alerts[0].message,
            "MOU with Sample University expires on Jan 15, 2025"
        );
        assert_eq!(alerts[0].end_date, "2025-01-15");
    }

    #[test]
    fn single_digit_days_are_not_zero_padded() {
        let alerts = build_alerts(&[record("Coastal Tech", "2025-03-05")]);
        assert_eq!(
            alerts[0].message,
            "MOU with Coastal Tech expires on Mar 5, 2025"
        );
    }

    #[test]
    fn alert_keeps_the_stored_end_date_text() {
        let alerts = build_alerts(&[record("Coastal Tech", "2025-03-05T00:00:00.000Z")]);
        assert_eq!(alerts[0].end_date, "2025-03-05T00:00:00.000Z");
        assert!(alerts[0].message.ends_with("Mar 5, 2025"));
    }

    #[test]
    fn records_without_parseable_end_dates_are_dropped() {
        let expiring = vec![
            record("Sample University", "2025-01-15"),
            record("Harbor Institute", ""),
            record("Coastal Tech", "whenever"),
        ];
        let alerts = build_alerts(&expiring);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].institute_name, "Sample University");
    }

    #[test]
    fn repeated_calls_repeat_alerts() {
        let expiring = vec![record("Sample University", "2025-01-15")];
        assert_eq!(build_alerts(&expiring), build_alerts(&expiring));
    }
}
