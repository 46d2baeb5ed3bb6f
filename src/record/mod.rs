pub mod dataset;
pub mod types;

pub use types::{BugFixRecord, Field, IssueKind, MemberType, RawRecord, RepoSlug};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Input dataset not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Failed to read or write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to access dataset file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid repository reference: {0}")]
    InvalidRepo(String),
}

/// Parse a repository reference into owner and name.
///
/// Accepts `owner/repo` or `https://github.com/owner/repo` (a trailing slash or
/// `.git` suffix is tolerated).
pub fn parse_repo_slug(input: &str) -> Result<RepoSlug, RecordError> {
    let invalid = || RecordError::InvalidRepo(input.to_string());
    let trimmed = input.trim();

    let path = if trimmed.contains("://") {
        let parsed = reqwest::Url::parse(trimmed).map_err(|_| invalid())?;
        if parsed.host_str() != Some("github.com") {
            return Err(invalid());
        }
        parsed.path().to_string()
    } else {
        trimmed.to_string()
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() != 2 {
        return Err(invalid());
    }

    let repo = segments[1].trim_end_matches(".git");
    if repo.is_empty() {
        return Err(invalid());
    }

    Ok(RepoSlug {
        owner: segments[0].to_string(),
        repo: repo.to_string(),
    })
}
