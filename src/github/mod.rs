use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigurationError, FetchError};

pub mod client;
#[cfg(test)]
pub mod fake;

pub use client::GitHubClient;

/// Extra query parameters forwarded verbatim to a commit-detail fetch.
pub type QueryParams = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks and submodules. Never matches a requested kind.
    #[serde(other)]
    Other,
}

impl FromStr for EntryKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(EntryKind::File),
            "dir" => Ok(EntryKind::Dir),
            _ => Err(ConfigurationError::InvalidEntryKind(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    #[serde(default)]
    pub filename: String,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CommitPayload")]
pub struct CommitDetail {
    pub sha: String,
    pub author_login: Option<String>,
    pub files: Vec<FileChange>,
}

#[derive(Deserialize)]
struct CommitPayload {
    sha: String,
    #[serde(default)]
    author: Option<AccountPayload>,
    #[serde(default)]
    files: Vec<FileChange>,
}

#[derive(Deserialize)]
struct AccountPayload {
    #[serde(default)]
    login: Option<String>,
}

impl From<CommitPayload> for CommitDetail {
    fn from(payload: CommitPayload) -> Self {
        Self {
            sha: payload.sha,
            author_login: payload.author.and_then(|a| a.login),
            files: payload.files,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateWindow {
    pub limit: u64,
    pub remaining: u64,
    /// Unix seconds.
    pub reset: i64,
    #[serde(default)]
    pub used: Option<u64>,
}

impl RateWindow {
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.reset, 0).single()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSnapshot {
    pub rate: RateWindow,
    #[serde(default)]
    pub resources: BTreeMap<String, RateWindow>,
}

/// Repository a call is aimed at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOwner {
    User(String),
    Organization(String),
}

impl RepoOwner {
    /// Resolve the listing owner before any request is made. An organization
    /// takes precedence over a username when both are present.
    pub fn from_options(
        username: Option<&str>,
        organization: Option<&str>,
    ) -> Result<Self, ConfigurationError> {
        let present = |s: Option<&str>| s.filter(|v| !v.trim().is_empty()).map(str::to_string);

        match (present(username), present(organization)) {
            (_, Some(org)) => Ok(RepoOwner::Organization(org)),
            (Some(user), None) => Ok(RepoOwner::User(user)),
            (None, None) => Err(ConfigurationError::MissingOwner),
        }
    }

    pub fn login(&self) -> &str {
        match self {
            RepoOwner::User(login) | RepoOwner::Organization(login) => login,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl DateWindow {
    pub fn new(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self { since, until }
    }

    pub fn parse(since: &str, until: &str) -> Result<Self, ConfigurationError> {
        Ok(Self::new(parse_datetime(since)?, parse_datetime(until)?))
    }

    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("since", self.since.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("until", self.until.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ]
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, ConfigurationError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| ConfigurationError::InvalidDate(value.to_string()))
}

/// Everything the search and aggregation layers need from the hosting service.
/// Each method is exactly one blocking round trip.
pub trait HostingApi {
    fn list_repositories(&self, owner: &RepoOwner) -> Result<Vec<RepositorySummary>, FetchError>;

    fn list_directory(
        &self,
        repo: &RepoRef,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<Vec<DirectoryEntry>, FetchError>;

    fn get_commit_detail(
        &self,
        repo: &RepoRef,
        sha: &str,
        params: &QueryParams,
    ) -> Result<CommitDetail, FetchError>;

    fn list_commits(
        &self,
        repo: &RepoRef,
        path: &str,
        window: &DateWindow,
    ) -> Result<Vec<CommitSummary>, FetchError>;

    fn get_rate_limit_status(&self) -> Result<RateLimitSnapshot, FetchError>;
}
