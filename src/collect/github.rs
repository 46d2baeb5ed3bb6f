use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::{CollectError, Collected, RecordSource};
use crate::record::{IssueKind, RawRecord, RepoSlug};

const API_ROOT: &str = "https://api.github.com";
const USER_AGENT: &str = "bugfix-stats";
const PAGE_SIZE: usize = 100;
/// Titles are stored truncated to this many characters.
pub const TITLE_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
struct User {
    login: String,
}

#[derive(Debug, Deserialize)]
struct Contributor {
    // anonymous contributors have no login
    login: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IssueItem {
    number: u64,
    title: String,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    comments: u64,
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct IssueDetail {
    closed_by: Option<User>,
}

/// Walks the closed, labelled issues of one GitHub repository.
pub struct GitHubIssueSource {
    client: reqwest::Client,
    slug: RepoSlug,
    token: String,
    labels: Vec<String>,
    core_top_n: usize,
}

impl GitHubIssueSource {
    pub fn new(slug: RepoSlug, token: Option<String>, labels: Vec<String>, core_top_n: usize) -> Result<Self, CollectError> {
        let token = token.ok_or(CollectError::MissingToken)?;
        Ok(Self {
            client: reqwest::Client::new(),
            slug,
            token,
            labels,
            core_top_n: core_top_n.clamp(1, PAGE_SIZE),
        })
    }

    fn repo_url(&self, tail: &str) -> String {
        format!("{}/repos/{}/{}/{}", API_ROOT, self.slug.owner, self.slug.repo, tail)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, CollectError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<T>().await?)
    }

    /// Logins of the top contributors, which define the core-member set.
    #[instrument(skip(self), fields(repo = %self.slug, top_n = self.core_top_n))]
    async fn fetch_core_members(&self) -> Result<HashSet<String>, CollectError> {
        let url = self.repo_url(&format!("contributors?per_page={}", self.core_top_n));
        let contributors: Vec<Contributor> = self.get_json(&url).await?;
        let core: HashSet<String> = contributors.into_iter().filter_map(|c| c.login).collect();
        debug!(core_members = core.len(), "fetched core member set");
        Ok(core)
    }

    async fn fetch_closed_by(&self, number: u64) -> Result<Option<String>, CollectError> {
        let detail: IssueDetail = self.get_json(&self.repo_url(&format!("issues/{number}"))).await?;
        Ok(detail.closed_by.map(|u| u.login))
    }

    /// Page through closed issues, pushing into `records` as it goes so that an
    /// interruption keeps everything gathered so far.
    async fn walk(&self, core: &HashSet<String>, limit: usize, records: &mut Vec<RawRecord>) -> Result<(), CollectError> {
        let labels = self.labels.join(",");
        let mut page = 1usize;

        while records.len() < limit {
            let url = self.repo_url(&format!(
                "issues?state=closed&labels={labels}&per_page={PAGE_SIZE}&page={page}"
            ));
            let items: Vec<IssueItem> = self.get_json(&url).await?;
            if items.is_empty() {
                debug!(page, "reached last page");
                break;
            }
            info!(page, items = items.len(), collected = records.len(), "fetched issue page");

            for item in items {
                if records.len() >= limit {
                    break;
                }
                if item.closed_at.is_none() {
                    continue;
                }
                let fixer = self.fetch_closed_by(item.number).await?;
                if let Some(record) = to_raw_record(&item, fixer, core) {
                    records.push(record);
                }
            }
            page += 1;
        }
        Ok(())
    }
}

#[async_trait]
impl RecordSource for GitHubIssueSource {
    fn name(&self) -> &str {
        "GitHub issues"
    }

    #[instrument(skip(self), fields(repo = %self.slug))]
    async fn collect(&self, limit: usize) -> Result<Collected, CollectError> {
        let core = self.fetch_core_members().await?;
        let mut records = Vec::new();

        let interrupted = tokio::select! {
            result = self.walk(&core, limit, &mut records) => match result {
                Ok(()) => false,
                Err(err) => {
                    warn!(error = %err, "collection stopped early, keeping partial results");
                    true
                }
            },
            _ = tokio::signal::ctrl_c() => {
                warn!("collection interrupted, keeping partial results");
                true
            }
        };

        info!(records = records.len(), interrupted, "collection finished");
        Ok(Collected { records, interrupted })
    }
}

/// Shape one closed issue into a dataset row. Items still open yield `None`.
fn to_raw_record(item: &IssueItem, fixer: Option<String>, core: &HashSet<String>) -> Option<RawRecord> {
    let closed_at = item.closed_at?;
    let is_core_member = fixer.as_ref().is_some_and(|login| core.contains(login));

    Some(RawRecord {
        issue_id: Some(item.number),
        kind: Some(if item.pull_request.is_some() {
            IssueKind::Pr
        } else {
            IssueKind::Issue
        }),
        title: Some(truncate_title(&item.title)),
        duration_days: Some(duration_days(item.created_at, closed_at)),
        comments_count: Some(item.comments),
        fixer_login: fixer,
        is_core_member: Some(is_core_member),
        created_at: Some(item.created_at.format("%Y-%m-%d").to_string()),
    })
}

fn truncate_title(title: &str) -> String {
    title.chars().take(TITLE_LIMIT).collect()
}

/// Elapsed days between creation and close, never negative.
fn duration_days(created: DateTime<Utc>, closed: DateTime<Utc>) -> f64 {
    let seconds = (closed - created).num_seconds() as f64;
    (seconds / 86_400.0).max(0.0)
}
