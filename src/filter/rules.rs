use crate::record::RawRecord;

use super::FilterConfig;

/// Identifies one exclusion rule in the removal report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRule {
    TestTicket,
    Stitch,
    ZeroComments,
    Missing,
}

impl FilterRule {
    /// Order in which the rules are applied.
    pub const ORDER: [FilterRule; 4] = [
        FilterRule::TestTicket,
        FilterRule::Stitch,
        FilterRule::ZeroComments,
        FilterRule::Missing,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FilterRule::TestTicket => "test_ticket",
            FilterRule::Stitch => "stitch",
            FilterRule::ZeroComments => "zero_comments",
            FilterRule::Missing => "missing",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterRule::TestTicket => "Test ticket markers",
            FilterRule::Stitch => "Automation-tagged PRs",
            FilterRule::ZeroComments => "Zero-comment records",
            FilterRule::Missing => "Missing key fields",
        }
    }
}

impl std::fmt::Display for FilterRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A predicate that marks raw records as non-signal.
pub trait ExclusionRule: Send + Sync {
    fn rule(&self) -> FilterRule;

    /// True when the record must be removed.
    fn excludes(&self, record: &RawRecord) -> bool;
}

/// Titles containing a known test-fixture token (case-insensitive).
pub struct TestTicketRule {
    markers: Vec<String>,
}

impl TestTicketRule {
    pub fn new(markers: &[String]) -> Self {
        Self {
            markers: markers
                .iter()
                .filter(|m| !m.is_empty())
                .map(|m| m.to_lowercase())
                .collect(),
        }
    }
}

impl ExclusionRule for TestTicketRule {
    fn rule(&self) -> FilterRule {
        FilterRule::TestTicket
    }

    fn excludes(&self, record: &RawRecord) -> bool {
        let Some(title) = record.title.as_deref() else {
            return false;
        };
        let title = title.to_lowercase();
        self.markers.iter().any(|m| title.contains(m.as_str()))
    }
}

/// Titles opening with the automation tag (exact, case-sensitive prefix).
pub struct AutomationTagRule {
    prefix: String,
}

impl AutomationTagRule {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }
}

impl ExclusionRule for AutomationTagRule {
    fn rule(&self) -> FilterRule {
        FilterRule::Stitch
    }

    fn excludes(&self, record: &RawRecord) -> bool {
        !self.prefix.is_empty()
            && record
                .title
                .as_deref()
                .is_some_and(|t| t.starts_with(self.prefix.as_str()))
    }
}

/// Records without discussion. An absent count is treated as zero.
pub struct ZeroCommentsRule;

impl ExclusionRule for ZeroCommentsRule {
    fn rule(&self) -> FilterRule {
        FilterRule::ZeroComments
    }

    fn excludes(&self, record: &RawRecord) -> bool {
        record.comments_count.unwrap_or(0) == 0
    }
}

/// Records missing issue_id, title or fixer_login.
pub struct MissingFieldsRule;

impl ExclusionRule for MissingFieldsRule {
    fn rule(&self) -> FilterRule {
        FilterRule::Missing
    }

    fn excludes(&self, record: &RawRecord) -> bool {
        record.issue_id.is_none() || record.title.is_none() || record.fixer_login.is_none()
    }
}

/// Build the rule chain in application order.
pub fn chain(config: &FilterConfig) -> Vec<Box<dyn ExclusionRule>> {
    vec![
        Box::new(TestTicketRule::new(&config.test_markers)),
        Box::new(AutomationTagRule::new(&config.automation_prefix)),
        Box::new(ZeroCommentsRule),
        Box::new(MissingFieldsRule),
    ]
}
