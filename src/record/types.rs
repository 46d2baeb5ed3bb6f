use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dataset::lenient;

/// Whether a closed item was filed as a plain issue or as a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    Issue,
    #[serde(rename = "PR")]
    Pr,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueKind::Issue => write!(f, "Issue"),
            IssueKind::Pr => write!(f, "PR"),
        }
    }
}

/// Contributor class of the person who closed a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberType {
    Core,
    Community,
}

impl MemberType {
    pub fn from_core_flag(is_core_member: bool) -> Self {
        if is_core_member {
            MemberType::Core
        } else {
            MemberType::Community
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MemberType::Core => "Core Member",
            MemberType::Community => "Community Contributor",
        }
    }
}

impl std::fmt::Display for MemberType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The dataset columns this tool understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    IssueId,
    Kind,
    Title,
    DurationDays,
    CommentsCount,
    FixerLogin,
    IsCoreMember,
    CreatedAt,
}

impl Field {
    /// CSV header name.
    pub fn column(self) -> &'static str {
        match self {
            Field::IssueId => "issue_id",
            Field::Kind => "type",
            Field::Title => "title",
            Field::DurationDays => "duration_days",
            Field::CommentsCount => "comments_count",
            Field::FixerLogin => "fixer_login",
            Field::IsCoreMember => "is_core_member",
            Field::CreatedAt => "created_at",
        }
    }

    /// Human-readable label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Field::IssueId => "Issue",
            Field::Kind => "Type",
            Field::Title => "Title",
            Field::DurationDays => "Duration (Days)",
            Field::CommentsCount => "Number of Comments",
            Field::FixerLogin => "Fixer",
            Field::IsCoreMember => "Contributor Type",
            Field::CreatedAt => "Created",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// One row of the dataset exactly as read from CSV or produced by a collector.
///
/// Every column may be absent. Cells that fail to parse are treated as absent,
/// and `created_at` keeps its raw text so that a filter pass never rewrites it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, deserialize_with = "lenient::u64")]
    pub issue_id: Option<u64>,
    #[serde(rename = "type", default, deserialize_with = "lenient::kind")]
    pub kind: Option<IssueKind>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub duration_days: Option<f64>,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub comments_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fixer_login: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::flag",
        serialize_with = "lenient::serialize_flag"
    )]
    pub is_core_member: Option<bool>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub created_at: Option<String>,
}

/// A bug-fix record with every field the analysis needs.
#[derive(Debug, Clone, PartialEq)]
pub struct BugFixRecord {
    pub issue_id: u64,
    pub kind: Option<IssueKind>,
    pub title: String,
    pub duration_days: f64,
    pub comments_count: u64,
    pub fixer_login: String,
    pub is_core_member: bool,
    /// `None` when the source date was missing or unparseable.
    pub created_at: Option<NaiveDate>,
}

impl BugFixRecord {
    pub fn member_type(&self) -> MemberType {
        MemberType::from_core_flag(self.is_core_member)
    }
}

/// Components of a GitHub repository reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_type_labels() {
        assert_eq!(MemberType::from_core_flag(true).to_string(), "Core Member");
        assert_eq!(
            MemberType::from_core_flag(false).to_string(),
            "Community Contributor"
        );
    }

    #[test]
    fn test_field_columns_are_unique() {
        let all = [
            Field::IssueId,
            Field::Kind,
            Field::Title,
            Field::DurationDays,
            Field::CommentsCount,
            Field::FixerLogin,
            Field::IsCoreMember,
            Field::CreatedAt,
        ];
        let mut columns: Vec<&str> = all.iter().map(|f| f.column()).collect();
        columns.sort_unstable();
        columns.dedup();
        assert_eq!(columns.len(), all.len());
        assert_eq!(Field::Kind.to_string(), "type");
    }

    #[test]
    fn test_repo_slug_display() {
        let slug = RepoSlug {
            owner: "django".to_string(),
            repo: "django".to_string(),
        };
        assert_eq!(slug.to_string(), "django/django");
    }
}
