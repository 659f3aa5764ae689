use anyhow::{Context, Result};
use fancy_regex::Regex;
use serde::{Deserialize, Serialize};

use crate::github::EntryKind;

pub mod tree;

pub use tree::TreeSearcher;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Commit, branch or tag; `None` means the repository's default branch.
    pub git_ref: Option<String>,
    /// Restrict matches to one kind of entry; `None` accepts both.
    pub entry_kind: Option<EntryKind>,
}

impl SearchOptions {
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn git_ref(mut self, git_ref: Option<String>) -> Self {
        self.git_ref = git_ref;
        self
    }

    pub fn entry_kind(mut self, entry_kind: Option<EntryKind>) -> Self {
        self.entry_kind = entry_kind;
        self
    }

    fn accepts(&self, kind: EntryKind) -> bool {
        self.entry_kind.map_or(true, |wanted| wanted == kind)
    }
}

/// Compile a name pattern. Matching is unanchored: the pattern may hit
/// anywhere in an entry name. Look-around and backreferences are accepted.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("Failed to compile search pattern: {}", pattern))
}
