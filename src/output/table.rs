use crate::analysis::RunReport;
use crate::github::RateLimitSnapshot;
use crate::stats::AuthorStats;
use colored::*;
use std::fmt::Write;

const LOGIN_WIDTH: usize = 24;

/// Plain-text rendering of a [`RunReport`].
pub struct TableGenerator {
    top: usize,
}

impl TableGenerator {
    /// `top` limits the author rows; 0 shows everyone.
    pub fn new(top: usize) -> Self {
        Self { top }
    }

    pub fn generate(&self, report: &RunReport) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "{}",
            format!("Contributor stats for {}", report.owner).bright_cyan().bold()
        );
        let _ = writeln!(
            out,
            "Window: {} .. {}",
            report.window.since.format("%Y-%m-%d"),
            report.window.until.format("%Y-%m-%d")
        );
        let _ = writeln!(
            out,
            "Repositories: {} | files matched: {} | commits: {}",
            report.repositories.len(),
            report.files_matched,
            report.commits_processed
        );
        let _ = writeln!(out);

        if report.stats.is_empty() {
            let _ = writeln!(out, "{}", "No attributed commits found".yellow());
        } else {
            let _ = writeln!(out, "{}", header().bold());
            let _ = writeln!(out, "{}", "-".repeat(header().len()));
            for (login, stats) in report.stats.top_contributors(self.top) {
                let _ = writeln!(out, "{}", row(login, stats));
            }
            let _ = writeln!(out, "{}", "-".repeat(header().len()));
            let _ = writeln!(out, "{}", row("total", &report.stats.totals()).bold());
        }

        if let Some(rate) = &report.rate_limit {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", rate_line(rate).dimmed());
        }

        out
    }
}

fn header() -> String {
    format!(
        "{:<w$} {:>8} {:>8} {:>10} {:>10} {:>10}",
        "Author",
        "Commits",
        "Files",
        "Additions",
        "Deletions",
        "Changes",
        w = LOGIN_WIDTH
    )
}

fn row(login: &str, stats: &AuthorStats) -> String {
    format!(
        "{:<w$} {:>8} {:>8} {:>10} {:>10} {:>10}",
        login,
        stats.commits,
        stats.files,
        stats.additions,
        stats.deletions,
        stats.changes,
        w = LOGIN_WIDTH
    )
}

fn rate_line(rate: &RateLimitSnapshot) -> String {
    let reset = rate
        .rate
        .reset_at()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "API rate limit: {}/{} remaining, resets {}",
        rate.rate.remaining, rate.rate.limit, reset
    )
}
