pub mod correlation;
pub mod descriptive;
pub mod monthly;
pub mod summary;

pub use correlation::{correlate, Correlation};
pub use monthly::{aggregate_monthly, MonthlyStatRow};
pub use summary::{build_summary, SummaryRow};

use tracing::{debug, info, info_span};

use crate::record::{BugFixRecord, IssueKind};

/// Everything the reporting layer needs from one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub records: usize,
    pub monthly: Vec<MonthlyStatRow>,
    pub summary: Vec<SummaryRow>,
    pub correlation: Correlation,
}

/// Run the monthly aggregation, the summary table and the correlation in sequence.
pub fn run_all(records: &[BugFixRecord], min_fixes_per_month: usize) -> AnalysisOutput {
    let monthly = info_span!("analyze", stage = "monthly")
        .in_scope(|| aggregate_monthly(records, min_fixes_per_month));
    info!(months = monthly.len(), "monthly points used (after filtering)");

    let summary = info_span!("analyze", stage = "summary").in_scope(|| build_summary(records));
    for row in &summary {
        debug!(group = %row.group, n = row.n, "summary row");
    }

    let correlation = info_span!("analyze", stage = "correlation").in_scope(|| correlate(&monthly));
    debug!(?correlation, "correlation result");

    AnalysisOutput {
        records: records.len(),
        monthly,
        summary,
        correlation,
    }
}

/// Headline figures printed after filtering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuickStats {
    pub mean_duration: f64,
    pub median_duration: f64,
    pub mean_comments: f64,
    /// Percentage of records fixed by core members.
    pub core_share: f64,
    pub issues: usize,
    pub pull_requests: usize,
}

impl QuickStats {
    pub fn compute(records: &[BugFixRecord]) -> Self {
        let durations: Vec<f64> = records.iter().map(|r| r.duration_days).collect();
        let comments: Vec<f64> = records.iter().map(|r| r.comments_count as f64).collect();
        let core = records.iter().filter(|r| r.is_core_member).count();
        let of_kind = |kind: IssueKind| records.iter().filter(|r| r.kind == Some(kind)).count();

        QuickStats {
            mean_duration: descriptive::mean(&durations),
            median_duration: descriptive::median(&durations),
            mean_comments: descriptive::mean(&comments),
            core_share: descriptive::safe_ratio(core as f64, records.len() as f64) * 100.0,
            issues: of_kind(IssueKind::Issue),
            pull_requests: of_kind(IssueKind::Pr),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::record::dataset::parse_created_at;

    /// Helper to create a complete record created on `date` (YYYY-MM-DD).
    pub fn record_on(date: &str, is_core_member: bool, duration_days: f64, comments_count: u64) -> BugFixRecord {
        BugFixRecord {
            issue_id: 1,
            kind: Some(IssueKind::Issue),
            title: "Test bug".to_string(),
            duration_days,
            comments_count,
            fixer_login: if is_core_member { "core" } else { "guest" }.to_string(),
            is_core_member,
            created_at: parse_created_at(date),
        }
    }

    #[test]
    fn test_run_all_composes_stages() {
        let records = vec![
            record_on("2023-01-10", true, 1.0, 2),
            record_on("2023-02-10", false, 8.0, 4),
            record_on("2023-03-10", true, 2.0, 3),
            record_on("2023-03-11", false, 6.0, 1),
        ];
        let output = run_all(&records, 0);
        assert_eq!(output.records, 4);
        assert_eq!(output.monthly.len(), 3);
        assert_eq!(output.summary.len(), 3);
        assert!(output.correlation.pearson().unwrap() < 0.0);
    }

    #[test]
    fn test_run_all_with_threshold_leaves_correlation_undefined() {
        let records = vec![record_on("2023-01-10", true, 1.0, 2)];
        let output = run_all(&records, 10);
        assert!(output.monthly.is_empty());
        assert_eq!(output.summary[2].n, 1);
        assert!(matches!(output.correlation, Correlation::Undefined(_)));
    }

    #[test]
    fn test_quick_stats() {
        let mut records = vec![
            record_on("2023-01-10", true, 1.0, 2),
            record_on("2023-02-10", false, 3.0, 4),
            record_on("2023-02-11", false, 2.0, 3),
        ];
        records[1].kind = Some(IssueKind::Pr);
        records[2].kind = None;
        let stats = QuickStats::compute(&records[..2]);
        assert_eq!((stats.issues, stats.pull_requests), (1, 1));
        let untyped = QuickStats::compute(&records);
        assert_eq!(untyped.issues + untyped.pull_requests, 2);
        assert!((stats.mean_duration - 2.0).abs() < 1e-9);
        assert!((stats.mean_comments - 3.0).abs() < 1e-9);
        assert!((stats.core_share - 50.0).abs() < 1e-9);
        assert_eq!(QuickStats::compute(&[]).core_share, 0.0);
    }
}
