pub mod github;

pub use github::GitHubIssueSource;

use async_trait::async_trait;
use thiserror::Error;

use crate::record::{dataset, RawRecord, RecordError};

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("GitHub token not found in config or environment")]
    MissingToken,

    #[error("Failed to read records: {0}")]
    Record(#[from] RecordError),
}

/// Records gathered by one collection pass.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    pub records: Vec<RawRecord>,
    /// True when the pass stopped before the source was exhausted.
    pub interrupted: bool,
}

/// Anything that can yield bug-fix records for the pipeline.
#[async_trait]
pub trait RecordSource: Send + Sync {
    fn name(&self) -> &str;

    /// Gather up to `limit` records. An interrupted pass still returns what it has.
    async fn collect(&self, limit: usize) -> Result<Collected, CollectError>;
}

/// Serves records from CSV text held in memory, such as the bundled sample.
pub struct FixtureSource {
    csv: &'static str,
}

impl FixtureSource {
    pub fn new(csv: &'static str) -> Self {
        Self { csv }
    }

    /// The sample dataset compiled into the binary.
    pub fn sample() -> Self {
        Self::new(include_str!("../../tests/fixtures/sample_bugs.csv"))
    }
}

#[async_trait]
impl RecordSource for FixtureSource {
    fn name(&self) -> &str {
        "bundled sample"
    }

    async fn collect(&self, limit: usize) -> Result<Collected, CollectError> {
        let mut records = dataset::read_raw(self.csv.as_bytes())?;
        records.truncate(limit);
        Ok(Collected {
            records,
            interrupted: false,
        })
    }
}
