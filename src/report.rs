use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{DashboardStats, MouRecord};
use crate::{expiry, renewal};

pub fn dashboard_stats(records: &[MouRecord], as_of: NaiveDate) -> DashboardStats {
    let mut stats = DashboardStats {
        total: records.len(),
        active: 0,
        expiring_soon: 0,
    };

    for record in records {
        match expiry::parse_iso_date(&record.end_date) {
            Some(end) if end >= as_of => stats.active += 1,
            _ => {}
        }
        if expiry::is_expiring(record, as_of) {
            stats.expiring_soon += 1;
        }
    }

    stats
}

pub fn build_dashboard(records: &[MouRecord], as_of: NaiveDate) -> String {
    let stats = dashboard_stats(records, as_of);
    let expiring = renewal::select_expiring(records, as_of);

    let mut output = String::new();

    let _ = writeln!(output, "# MOU Tracker Dashboard");
    let _ = writeln!(output, "Generated as of {}", as_of);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Total MOUs: {}", stats.total);
    let _ = writeln!(output, "- Active: {}", stats.active);
    let _ = writeln!(output, "- Expiring within a month: {}", stats.expiring_soon);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Expiring Soon");

    if expiring.is_empty() {
        let _ = writeln!(output, "No MOUs inside the one-month window.");
    } else {
        for record in expiring.iter().take(5) {
            if let Some(end) = expiry::parse_iso_date(&record.end_date) {
                let _ = writeln!(
                    output,
                    "- row {}: {} (expires {})",
                    record.ordinal_index,
                    record.institute_name,
                    end.format("%b %-d, %Y")
                );
            }
        }
        if expiring.len() > 5 {
            let _ = writeln!(output, "...and {} more inside the window.", expiring.len() - 5);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Activity");

    if records.is_empty() {
        let _ = writeln!(output, "No MOUs recorded yet.");
    } else {
        for record in records.iter().rev().take(5) {
            let _ = writeln!(
                output,
                "- {} ({}): {} to {}",
                record.institute_name,
                record.academic_year,
                record.start_date,
                record.end_date
            );
        }
    }

    output
}
