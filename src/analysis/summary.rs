use serde::Serialize;

use super::descriptive::{mean, median, quantile, round2};
use crate::record::{BugFixRecord, MemberType};

/// Row label of the summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryGroup {
    Member(MemberType),
    Overall,
}

impl SummaryGroup {
    /// Rows in table order.
    pub const ORDER: [SummaryGroup; 3] = [
        SummaryGroup::Member(MemberType::Core),
        SummaryGroup::Member(MemberType::Community),
        SummaryGroup::Overall,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SummaryGroup::Member(member) => member.label(),
            SummaryGroup::Overall => "Overall",
        }
    }
}

impl std::fmt::Display for SummaryGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for SummaryGroup {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Descriptive statistics for one group. Statistics of an empty group are NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "Group")]
    pub group: SummaryGroup,
    #[serde(rename = "N")]
    pub n: usize,
    #[serde(rename = "Duration_mean")]
    pub duration_mean: f64,
    #[serde(rename = "Duration_median")]
    pub duration_median: f64,
    #[serde(rename = "Duration_Q1")]
    pub duration_q1: f64,
    #[serde(rename = "Duration_Q3")]
    pub duration_q3: f64,
    #[serde(rename = "Comments_mean")]
    pub comments_mean: f64,
    #[serde(rename = "Comments_median")]
    pub comments_median: f64,
    #[serde(rename = "Comments_Q1")]
    pub comments_q1: f64,
    #[serde(rename = "Comments_Q3")]
    pub comments_q3: f64,
}

impl SummaryRow {
    pub const HEADERS: [&'static str; 10] = [
        "Group",
        "N",
        "Duration_mean",
        "Duration_median",
        "Duration_Q1",
        "Duration_Q3",
        "Comments_mean",
        "Comments_median",
        "Comments_Q1",
        "Comments_Q3",
    ];

    fn compute(group: SummaryGroup, records: &[&BugFixRecord]) -> Self {
        let durations: Vec<f64> = records.iter().map(|r| r.duration_days).collect();
        let comments: Vec<f64> = records.iter().map(|r| r.comments_count as f64).collect();

        SummaryRow {
            group,
            n: records.len(),
            duration_mean: mean(&durations),
            duration_median: median(&durations),
            duration_q1: quantile(&durations, 0.25),
            duration_q3: quantile(&durations, 0.75),
            comments_mean: mean(&comments),
            comments_median: median(&comments),
            comments_q1: quantile(&comments, 0.25),
            comments_q3: quantile(&comments, 0.75),
        }
    }

    /// The statistics in header order, excluding Group and N.
    pub fn values(&self) -> [f64; 8] {
        [
            self.duration_mean,
            self.duration_median,
            self.duration_q1,
            self.duration_q3,
            self.comments_mean,
            self.comments_median,
            self.comments_q1,
            self.comments_q3,
        ]
    }

    /// Copy with every statistic rounded to two decimals, for display.
    pub fn rounded(&self) -> Self {
        SummaryRow {
            group: self.group,
            n: self.n,
            duration_mean: round2(self.duration_mean),
            duration_median: round2(self.duration_median),
            duration_q1: round2(self.duration_q1),
            duration_q3: round2(self.duration_q3),
            comments_mean: round2(self.comments_mean),
            comments_median: round2(self.comments_median),
            comments_q1: round2(self.comments_q1),
            comments_q3: round2(self.comments_q3),
        }
    }
}

/// Build the three-row table: Core Member, Community Contributor, Overall.
pub fn build_summary(records: &[BugFixRecord]) -> Vec<SummaryRow> {
    SummaryGroup::ORDER
        .iter()
        .map(|&group| {
            let members: Vec<&BugFixRecord> = match group {
                SummaryGroup::Member(member) => records
                    .iter()
                    .filter(|r| r.member_type() == member)
                    .collect(),
                SummaryGroup::Overall => records.iter().collect(),
            };
            SummaryRow::compute(group, &members)
        })
        .collect()
}
