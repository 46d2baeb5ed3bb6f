use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;
use tracing::debug;

use super::descriptive::{mean, median, safe_ratio};
use crate::record::BugFixRecord;

/// Calendar month key; orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Aggregated statistics for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStatRow {
    pub month: YearMonth,
    pub total_fixes: usize,
    pub core_fixes: usize,
    pub mean_duration: f64,
    pub median_duration: f64,
    pub mean_comments: f64,
    pub core_ratio: f64,
}

/// Group records by the calendar month of `created_at`, ascending.
///
/// Records without a creation date are skipped. When `min_samples_per_month`
/// is greater than 1, months with fewer fixes are dropped after aggregation.
pub fn aggregate_monthly(records: &[BugFixRecord], min_samples_per_month: usize) -> Vec<MonthlyStatRow> {
    let mut groups: BTreeMap<YearMonth, Vec<&BugFixRecord>> = BTreeMap::new();
    let mut undated = 0usize;

    for record in records {
        match record.created_at {
            Some(date) => groups
                .entry(YearMonth {
                    year: date.year(),
                    month: date.month(),
                })
                .or_default()
                .push(record),
            None => undated += 1,
        }
    }
    if undated > 0 {
        debug!(undated, "skipped records without a creation date");
    }

    let months_seen = groups.len();
    let rows: Vec<MonthlyStatRow> = groups
        .into_iter()
        .map(|(month, group)| month_row(month, &group))
        .filter(|row| min_samples_per_month <= 1 || row.total_fixes >= min_samples_per_month)
        .collect();

    debug!(
        months_seen,
        months_kept = rows.len(),
        min_samples_per_month,
        "aggregated monthly statistics"
    );
    rows
}

fn month_row(month: YearMonth, group: &[&BugFixRecord]) -> MonthlyStatRow {
    let durations: Vec<f64> = group.iter().map(|r| r.duration_days).collect();
    let comments: Vec<f64> = group.iter().map(|r| r.comments_count as f64).collect();
    let total_fixes = group.len();
    let core_fixes = group.iter().filter(|r| r.is_core_member).count();

    MonthlyStatRow {
        month,
        total_fixes,
        core_fixes,
        mean_duration: mean(&durations),
        median_duration: median(&durations),
        mean_comments: mean(&comments),
        core_ratio: safe_ratio(core_fixes as f64, total_fixes as f64),
    }
}
