use super::*;
use crate::error::SearchError;
use crate::github::{DirectoryEntry, HostingApi, RepoRef};
use tracing::debug;

/// Walks a repository's directory tree through the hosting API and collects
/// entries whose name matches a pattern.
pub struct TreeSearcher<'a, A: HostingApi> {
    api: &'a A,
    repo: &'a RepoRef,
}

impl<'a, A: HostingApi> TreeSearcher<'a, A> {
    pub fn new(api: &'a A, repo: &'a RepoRef) -> Self {
        Self { api, repo }
    }

    /// Search `path` (`""` is the repository root).
    ///
    /// Results keep listing order, depth first: the matches found inside a
    /// subdirectory come right after that subdirectory's own position. One
    /// listing call is made per directory visited. Any failed listing, or a
    /// name the pattern engine cannot decide on, aborts the whole search.
    pub fn search(
        &self,
        pattern: &Regex,
        path: &str,
        options: &SearchOptions,
    ) -> Result<Vec<DirectoryEntry>, SearchError> {
        let listing = self
            .api
            .list_directory(self.repo, path, options.git_ref.as_deref())?;

        debug!(
            "Listed {}:/{} ({} entries)",
            self.repo,
            path,
            listing.len()
        );

        let mut matches = Vec::new();
        for entry in listing {
            let descend = options.recursive && entry.kind == EntryKind::Dir;
            let sub_path = descend.then(|| entry.path.clone());

            let hit = pattern
                .is_match(&entry.name)
                .map_err(|err| SearchError::Match {
                    name: entry.name.clone(),
                    message: err.to_string(),
                })?;

            if hit && options.accepts(entry.kind) {
                matches.push(entry);
            }

            if let Some(sub_path) = sub_path {
                matches.extend(self.search(pattern, &sub_path, options)?);
            }
        }

        Ok(matches)
    }
}
