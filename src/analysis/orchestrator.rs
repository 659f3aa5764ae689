use super::*;
use crate::error::SearchError;
use crate::github::{HostingApi, QueryParams, RepoOwner, RepoRef};
use crate::search::{SearchOptions, TreeSearcher};
use crate::stats::StatsAggregator;
use indicatif::{ProgressBar, ProgressStyle};
use fancy_regex::Regex;
use tracing::{debug, info};

/// Runs the search and aggregation over every selected repository of an
/// owner, threading one [`StatsTable`] through the whole run.
pub struct Orchestrator<'a, A: HostingApi> {
    api: &'a A,
    pattern: &'a Regex,
    options: SearchOptions,
    window: DateWindow,
    show_progress: bool,
}

#[derive(Default)]
struct Tally {
    files: usize,
    commits: usize,
}

impl<'a, A: HostingApi> Orchestrator<'a, A> {
    pub fn new(api: &'a A, pattern: &'a Regex, options: SearchOptions, window: DateWindow) -> Self {
        Self {
            api,
            pattern,
            options,
            window,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// An empty `only` list selects every repository. Any fetch failure ends
    /// the run; nothing gathered so far is returned.
    pub fn run(&self, owner: &RepoOwner, only: &[String]) -> Result<RunReport, SearchError> {
        let repositories = self.api.list_repositories(owner)?;
        info!(
            "Found {} repositories for {}",
            repositories.len(),
            owner.login()
        );

        let mut table = StatsTable::new();
        let mut tally = Tally::default();
        let mut processed = Vec::new();

        for summary in repositories {
            if !only.is_empty() && !only.contains(&summary.name) {
                debug!("Skipping repository {}", summary.name);
                continue;
            }

            let repo = RepoRef::new(owner.login(), summary.name);
            self.process_repository(&repo, &mut table, &mut tally)?;
            processed.push(repo.name);
        }

        let rate_limit = if processed.is_empty() {
            None
        } else {
            Some(self.api.get_rate_limit_status()?)
        };

        info!(
            "Run complete: {} repositories, {} files, {} commits, {} authors",
            processed.len(),
            tally.files,
            tally.commits,
            table.len()
        );

        Ok(RunReport {
            owner: owner.login().to_string(),
            generated_at: Utc::now(),
            window: self.window.clone(),
            repositories: processed,
            files_matched: tally.files,
            commits_processed: tally.commits,
            stats: table,
            rate_limit,
        })
    }

    fn process_repository(
        &self,
        repo: &RepoRef,
        table: &mut StatsTable,
        tally: &mut Tally,
    ) -> Result<(), SearchError> {
        let searcher = TreeSearcher::new(self.api, repo);
        let aggregator = StatsAggregator::new(self.api, repo);

        let found = searcher.search(self.pattern, "", &self.options)?;
        info!("{}: {} matching entries", repo, found.len());

        let pb = self.progress_bar(found.len() as u64, repo);

        for entry in &found {
            let commits = self.api.list_commits(repo, &entry.path, &self.window)?;
            debug!("{}: {} commits touch {}", repo, commits.len(), entry.path);

            let mut params = QueryParams::new();
            params.insert("path".to_string(), entry.path.clone());

            for commit in &commits {
                aggregator.accumulate(&commit.sha, table, &params)?;
            }

            tally.commits += commits.len();
            pb.inc(1);
        }

        tally.files += found.len();
        pb.finish_and_clear();
        Ok(())
    }

    fn progress_bar(&self, len: u64, repo: &RepoRef) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} files {msg}",
        )
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_message(repo.to_string());
        pb
    }
}
