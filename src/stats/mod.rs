use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::github::CommitDetail;

pub mod aggregator;

pub use aggregator::StatsAggregator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorStats {
    /// File changes folded in; a file counts once per commit it appears in.
    pub files: u64,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    pub commits: u64,
}

impl AuthorStats {
    fn add(&mut self, other: &AuthorStats) {
        self.files += other.files;
        self.additions += other.additions;
        self.deletions += other.deletions;
        self.changes += other.changes;
        self.commits += other.commits;
    }
}

/// Per-author counters keyed by login. Counters only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsTable(BTreeMap<String, AuthorStats>);

impl StatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, login: &str) -> Option<&AuthorStats> {
        self.0.get(login)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fold one commit into its author's counters. Returns `false`, leaving
    /// the table untouched, when the commit has no resolvable author.
    pub fn record_commit(&mut self, commit: &CommitDetail) -> bool {
        let Some(login) = commit.author_login.as_deref() else {
            return false;
        };

        let stats = self.0.entry(login.to_string()).or_default();
        stats.commits += 1;

        // `changes` comes from the API as-is; renames and binaries make it
        // differ from additions + deletions.
        for file in &commit.files {
            stats.files += 1;
            stats.additions += file.additions;
            stats.changes += file.changes;
            stats.deletions += file.deletions;
        }

        true
    }

    /// Authors ordered by commit count (descending), ties broken by login.
    /// A `limit` of 0 returns everyone.
    pub fn top_contributors(&self, limit: usize) -> Vec<(&String, &AuthorStats)> {
        let mut authors: Vec<_> = self.0.iter().collect();
        authors.sort_by(|a, b| b.1.commits.cmp(&a.1.commits).then_with(|| a.0.cmp(b.0)));
        if limit > 0 {
            authors.truncate(limit);
        }
        authors
    }

    pub fn totals(&self) -> AuthorStats {
        let mut total = AuthorStats::default();
        for stats in self.0.values() {
            total.add(stats);
        }
        total
    }
}
