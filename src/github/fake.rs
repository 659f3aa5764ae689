//! In-memory hosting API for tests.
//!
//! Directories, commits and repositories are registered up front; every call
//! is appended to `calls` so tests can assert on request order and count.

use super::*;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct FakeHost {
    repositories: Vec<RepositorySummary>,
    directories: HashMap<(String, String), Vec<DirectoryEntry>>,
    failing_directories: HashSet<(String, String)>,
    commits: HashMap<String, CommitDetail>,
    commit_lists: HashMap<(String, String), Vec<String>>,
    pub calls: RefCell<Vec<String>>,
}

pub fn file(path: &str) -> (String, EntryKind) {
    (path.to_string(), EntryKind::File)
}

pub fn dir(path: &str) -> (String, EntryKind) {
    (path.to_string(), EntryKind::Dir)
}

/// Commit with `(additions, deletions, changes)` per file.
pub fn commit(sha: &str, login: Option<&str>, files: &[(u64, u64, u64)]) -> CommitDetail {
    CommitDetail {
        sha: sha.to_string(),
        author_login: login.map(str::to_string),
        files: files
            .iter()
            .enumerate()
            .map(|(i, &(additions, deletions, changes))| FileChange {
                filename: format!("file{}", i),
                additions,
                deletions,
                changes,
            })
            .collect(),
    }
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(mut self, name: &str) -> Self {
        self.repositories.push(RepositorySummary {
            name: name.to_string(),
            full_name: None,
            default_branch: Some("main".to_string()),
        });
        self
    }

    /// Register the listing for `path` in `repo`. Entries are given by their
    /// full path; the name is the last path segment.
    pub fn with_dir(mut self, repo: &str, path: &str, entries: &[(String, EntryKind)]) -> Self {
        let listing = entries
            .iter()
            .map(|(full, kind)| DirectoryEntry {
                name: full.rsplit('/').next().unwrap_or(full).to_string(),
                path: full.clone(),
                kind: *kind,
            })
            .collect();
        self.directories
            .insert((repo.to_string(), path.to_string()), listing);
        self
    }

    pub fn with_failing_dir(mut self, repo: &str, path: &str) -> Self {
        self.failing_directories
            .insert((repo.to_string(), path.to_string()));
        self
    }

    pub fn with_commit(mut self, detail: CommitDetail) -> Self {
        self.commits.insert(detail.sha.clone(), detail);
        self
    }

    pub fn with_commit_list(mut self, repo: &str, path: &str, shas: &[&str]) -> Self {
        self.commit_lists.insert(
            (repo.to_string(), path.to_string()),
            shas.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn not_found(url: String) -> FetchError {
        FetchError::Status {
            status: 404,
            url,
            message: "Not Found".to_string(),
        }
    }
}

impl HostingApi for FakeHost {
    fn list_repositories(&self, owner: &RepoOwner) -> Result<Vec<RepositorySummary>, FetchError> {
        self.record(format!("list_repositories {}", owner.login()));
        Ok(self.repositories.clone())
    }

    fn list_directory(
        &self,
        repo: &RepoRef,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<Vec<DirectoryEntry>, FetchError> {
        self.record(format!(
            "list_directory {}:{}@{}",
            repo,
            path,
            git_ref.unwrap_or("default")
        ));

        let key = (repo.name.clone(), path.to_string());
        if self.failing_directories.contains(&key) {
            return Err(FetchError::network(
                format!("{}/contents/{}", repo, path),
                "connection reset by peer",
            ));
        }
        self.directories
            .get(&key)
            .cloned()
            .ok_or_else(|| Self::not_found(format!("{}/contents/{}", repo, path)))
    }

    fn get_commit_detail(
        &self,
        repo: &RepoRef,
        sha: &str,
        params: &QueryParams,
    ) -> Result<CommitDetail, FetchError> {
        self.record(format!("get_commit_detail {}:{} {:?}", repo, sha, params));
        self.commits
            .get(sha)
            .cloned()
            .ok_or_else(|| Self::not_found(format!("{}/commits/{}", repo, sha)))
    }

    fn list_commits(
        &self,
        repo: &RepoRef,
        path: &str,
        _window: &DateWindow,
    ) -> Result<Vec<CommitSummary>, FetchError> {
        self.record(format!("list_commits {}:{}", repo, path));
        Ok(self
            .commit_lists
            .get(&(repo.name.clone(), path.to_string()))
            .map(|shas| {
                shas.iter()
                    .map(|sha| CommitSummary { sha: sha.clone() })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get_rate_limit_status(&self) -> Result<RateLimitSnapshot, FetchError> {
        self.record("get_rate_limit_status".to_string());
        Ok(RateLimitSnapshot {
            rate: RateWindow {
                limit: 5000,
                remaining: 4321,
                reset: 1_430_438_400,
                used: Some(679),
            },
            resources: BTreeMap::new(),
        })
    }
}
