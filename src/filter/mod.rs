pub mod rules;

pub use rules::FilterRule;

use serde::Deserialize;
use tracing::{debug, info};

use crate::analysis::descriptive::safe_ratio;
use crate::record::RawRecord;

/// Tokens and prefixes that mark non-signal rows.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Case-insensitive substrings marking test-fixture titles.
    pub test_markers: Vec<String>,
    /// Case-sensitive title prefix added by automation.
    pub automation_prefix: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            test_markers: vec!["#99999".to_string(), "my-feature".to_string()],
            automation_prefix: "[Stitch Remote SWE]".to_string(),
        }
    }
}

/// How many rows each rule newly removed, given all earlier rules applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalReport {
    pub original: usize,
    pub test_ticket: usize,
    pub stitch: usize,
    pub zero_comments: usize,
    pub missing: usize,
    pub retained: usize,
}

impl RemovalReport {
    pub fn count(&self, rule: FilterRule) -> usize {
        match rule {
            FilterRule::TestTicket => self.test_ticket,
            FilterRule::Stitch => self.stitch,
            FilterRule::ZeroComments => self.zero_comments,
            FilterRule::Missing => self.missing,
        }
    }

    fn record(&mut self, rule: FilterRule, removed: usize) {
        let slot = match rule {
            FilterRule::TestTicket => &mut self.test_ticket,
            FilterRule::Stitch => &mut self.stitch,
            FilterRule::ZeroComments => &mut self.zero_comments,
            FilterRule::Missing => &mut self.missing,
        };
        *slot += removed;
    }

    pub fn total_removed(&self) -> usize {
        self.test_ticket + self.stitch + self.zero_comments + self.missing
    }

    /// Percentage of input rows removed; 0.0 for an empty input.
    pub fn removal_rate(&self) -> f64 {
        safe_ratio(self.total_removed() as f64, self.original as f64) * 100.0
    }
}

/// Clean records plus the audit of what was removed.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub records: Vec<RawRecord>,
    pub report: RemovalReport,
}

/// Apply the exclusion rules in order, each to the survivors of the previous one.
/// The input is left untouched.
pub fn filter(raw: &[RawRecord], config: &FilterConfig) -> FilterOutcome {
    let mut report = RemovalReport {
        original: raw.len(),
        ..RemovalReport::default()
    };
    let mut kept: Vec<&RawRecord> = raw.iter().collect();

    for rule in rules::chain(config) {
        let before = kept.len();
        kept.retain(|record| !rule.excludes(record));
        let removed = before - kept.len();
        debug!(rule = %rule.rule(), removed, remaining = kept.len(), "applied exclusion rule");
        report.record(rule.rule(), removed);
    }

    report.retained = kept.len();
    info!(
        original = report.original,
        retained = report.retained,
        removed = report.total_removed(),
        "filtered dataset"
    );

    FilterOutcome {
        records: kept.into_iter().cloned().collect(),
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(id: Option<u64>, title: Option<&str>, comments: Option<u64>, login: Option<&str>) -> RawRecord {
        RawRecord {
            issue_id: id,
            title: title.map(str::to_string),
            duration_days: Some(1.0),
            comments_count: comments,
            fixer_login: login.map(str::to_string),
            is_core_member: Some(false),
            created_at: Some("2023-01-01".to_string()),
            ..RawRecord::default()
        }
    }

    #[test]
    fn test_six_row_scenario() {
        let raw = vec![
            row(Some(1), Some("Crash in #99999"), Some(3), Some("a")),
            row(Some(2), Some("#99999 again"), Some(2), Some("b")),
            row(Some(3), Some("Regression for #99999"), Some(1), Some("c")),
            row(Some(4), Some("Silent fix"), Some(0), Some("d")),
            row(Some(5), Some("Who fixed this"), Some(4), None),
            row(Some(6), Some("Real bug"), Some(5), Some("e")),
        ];
        let outcome = filter(&raw, &FilterConfig::default());

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].issue_id, Some(6));
        assert_eq!(outcome.report.test_ticket, 3);
        assert_eq!(outcome.report.stitch, 0);
        assert_eq!(outcome.report.zero_comments, 1);
        assert_eq!(outcome.report.missing, 1);
        assert_eq!(outcome.report.retained, 1);
        assert_eq!(raw.len(), 6);
    }

    #[test]
    fn test_counts_are_cumulative() {
        // Matches both the marker rule and the zero-comment rule; only the first counts it.
        let raw = vec![row(Some(1), Some("my-feature demo"), Some(0), None)];
        let report = filter(&raw, &FilterConfig::default()).report;
        assert_eq!(report.test_ticket, 1);
        assert_eq!(report.zero_comments, 0);
        assert_eq!(report.missing, 0);
    }

    #[test]
    fn test_automation_rule_counts() {
        let raw = vec![
            row(Some(1), Some("[Stitch Remote SWE] sync"), Some(2), Some("bot")),
            row(Some(2), Some("Proper fix"), Some(2), Some("dev")),
        ];
        let outcome = filter(&raw, &FilterConfig::default());
        assert_eq!(outcome.report.stitch, 1);
        assert_eq!(outcome.report.count(FilterRule::Stitch), 1);
        assert_eq!(outcome.records.len(), 1);
    }

    #[test]
    fn test_null_title_reaches_missing_rule() {
        let raw = vec![row(Some(1), None, Some(2), Some("dev"))];
        let report = filter(&raw, &FilterConfig::default()).report;
        assert_eq!(report.test_ticket, 0);
        assert_eq!(report.stitch, 0);
        assert_eq!(report.missing, 1);
    }

    #[test]
    fn test_empty_input() {
        let outcome = filter(&[], &FilterConfig::default());
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.report, RemovalReport::default());
        assert_eq!(outcome.report.removal_rate(), 0.0);
    }

    #[test]
    fn test_removal_rate() {
        let raw = vec![
            row(Some(1), Some("ok"), Some(0), Some("a")),
            row(Some(2), Some("ok"), Some(1), Some("a")),
            row(Some(3), Some("ok"), Some(1), Some("a")),
            row(Some(4), Some("ok"), Some(1), Some("a")),
        ];
        let report = filter(&raw, &FilterConfig::default()).report;
        assert!((report.removal_rate() - 25.0).abs() < 1e-9);
    }

    fn arb_record() -> impl Strategy<Value = RawRecord> {
        (
            proptest::option::of(0u64..1000),
            proptest::option::of(prop_oneof![
                Just("Normal fix".to_string()),
                Just("Bump #99999".to_string()),
                Just("[Stitch Remote SWE] auto".to_string()),
                Just("MY-FEATURE toggle".to_string()),
                "[a-z ]{0,12}",
            ]),
            proptest::option::of(0u64..4),
            proptest::option::of("[a-z]{1,6}"),
        )
            .prop_map(|(id, title, comments, login)| RawRecord {
                issue_id: id,
                title,
                comments_count: comments,
                fixer_login: login,
                ..RawRecord::default()
            })
    }

    proptest! {
        #[test]
        fn filter_accounts_for_every_row(raw in prop::collection::vec(arb_record(), 0..40)) {
            let outcome = filter(&raw, &FilterConfig::default());
            prop_assert_eq!(outcome.records.len() + outcome.report.total_removed(), raw.len());
            prop_assert_eq!(outcome.report.retained, outcome.records.len());
        }

        #[test]
        fn filter_is_idempotent(raw in prop::collection::vec(arb_record(), 0..40)) {
            let first = filter(&raw, &FilterConfig::default());
            let second = filter(&first.records, &FilterConfig::default());
            prop_assert_eq!(second.report.total_removed(), 0);
            prop_assert_eq!(second.records, first.records);
        }
    }
}
