use super::*;
use crate::error::FetchError;
use crate::github::{HostingApi, QueryParams, RepoRef};
use tracing::debug;

/// Folds commit statistics fetched from the hosting API into a [`StatsTable`].
pub struct StatsAggregator<'a, A: HostingApi> {
    api: &'a A,
    repo: &'a RepoRef,
}

impl<'a, A: HostingApi> StatsAggregator<'a, A> {
    pub fn new(api: &'a A, repo: &'a RepoRef) -> Self {
        Self { api, repo }
    }

    /// Fetch commit `sha` and add its per-file counts to its author's entry
    /// in `table`.
    ///
    /// The fetch happens before the table is touched, so on error `table`
    /// still holds exactly what it held before the call. `params` go to the
    /// commit fetch untouched. A commit with no resolvable author login is
    /// logged and skipped. The fold is additive, so accumulating the same
    /// commit twice counts it twice.
    pub fn accumulate(
        &self,
        sha: &str,
        table: &mut StatsTable,
        params: &QueryParams,
    ) -> Result<(), FetchError> {
        let detail = self.api.get_commit_detail(self.repo, sha, params)?;

        if !table.record_commit(&detail) {
            debug!(
                "No author login found for commit {} in {} (params: {:?})",
                sha, self.repo, params
            );
        } else if let Some(login) = detail.author_login.as_deref() {
            let commits = table.get(login).map_or(0, |stats| stats.commits);
            debug!("{}: {} now at {} commits", self.repo, login, commits);
        }

        Ok(())
    }

    /// Like [`accumulate`](Self::accumulate), into a table of its own.
    pub fn accumulate_fresh(&self, sha: &str, params: &QueryParams) -> Result<StatsTable, FetchError> {
        let mut table = StatsTable::new();
        self.accumulate(sha, &mut table, params)?;
        Ok(table)
    }
}
