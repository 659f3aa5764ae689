use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod orchestrator;

pub use orchestrator::Orchestrator;

use crate::github::{DateWindow, RateLimitSnapshot};
use crate::stats::StatsTable;

/// Everything a full run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub owner: String,
    pub generated_at: DateTime<Utc>,
    pub window: DateWindow,
    /// Repositories actually searched, in processing order.
    pub repositories: Vec<String>,
    pub files_matched: usize,
    pub commits_processed: usize,
    pub stats: StatsTable,
    /// Taken once at the end, only if at least one repository was processed.
    pub rate_limit: Option<RateLimitSnapshot>,
}
