use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing::{info, Level};

mod analysis;
mod config;
mod error;
mod github;
mod output;
mod search;
mod stats;

use analysis::Orchestrator;
use config::Config;
use github::client::Credentials;
use github::{parse_datetime, DateWindow, GitHubClient, RepoOwner};
use output::{OutputFormat, Reporter};
use search::compile_pattern;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// GitHub username; also the repository owner unless --organization is set
    #[arg(short, long, env = "GITHUB_USER")]
    user: String,

    /// GitHub password or personal access token
    #[arg(short, long, env = "GITHUB_PASSWORD", hide_env_values = true)]
    password: String,

    /// Regex matched anywhere in file names
    #[arg(short, long, alias = "search_regex")]
    search_regex: String,

    /// Only search these repositories (default: all of the owner's)
    #[arg(short, long, num_args = 1..)]
    repositories: Vec<String>,

    /// Search the organization's repositories instead of the user's
    #[arg(short, long)]
    organization: Option<String>,

    /// Start of the commit window (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    since: Option<String>,

    /// End of the commit window (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    until: Option<String>,

    /// Branch, tag or commit to search (default: repository default branch)
    #[arg(long = "ref")]
    git_ref: Option<String>,

    /// Restrict matches to files or directories (file, dir)
    #[arg(long)]
    entry_kind: Option<String>,

    /// Configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long)]
    format: Option<String>,

    /// Write the report to this file instead of stdout
    #[arg(long)]
    output_file: Option<String>,

    /// Show only the N most active authors (0 = all)
    #[arg(long)]
    top: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);

    let owner = RepoOwner::from_options(Some(cli.user.as_str()), cli.organization.as_deref())?;
    let pattern = compile_pattern(&cli.search_regex)?;
    let options = config.search_options()?;
    let window = resolve_window(&config, &cli)?;

    let format = OutputFormat::from(config.output.format.as_str());
    if format == OutputFormat::Table {
        eprintln!("{}", "ghvanity - GitHub Contributor Stats".bright_cyan().bold());
        eprintln!("Owner: {}", owner.login().bright_white());
    }

    let credentials = Credentials {
        username: cli.user.clone(),
        password: Some(cli.password.clone()),
    };
    let client = GitHubClient::new(&config.api, Some(credentials))
        .context("Failed to create GitHub client")?;

    info!(
        "Searching for '{}' between {} and {}",
        cli.search_regex, window.since, window.until
    );

    let report = Orchestrator::new(&client, &pattern, options, window)
        .with_progress(format == OutputFormat::Table || cli.output_file.is_some())
        .run(&owner, &cli.repositories)
        .context("Failed to gather contributor stats")?;

    let reporter = Reporter::new(
        &config.output.format,
        cli.output_file.as_deref(),
        config.output.top,
    );
    reporter.generate_report(&report)?;

    Ok(())
}

/// Command-line flags win over file and environment settings.
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(git_ref) = &cli.git_ref {
        config.search.git_ref = Some(git_ref.clone());
    }
    if let Some(kind) = &cli.entry_kind {
        config.search.entry_kind = Some(kind.clone());
    }
    if let Some(format) = &cli.format {
        config.output.format = format.clone();
    }
    if let Some(top) = cli.top {
        config.output.top = top;
    }
}

fn resolve_window(config: &Config, cli: &Cli) -> Result<DateWindow> {
    let mut window = config.date_window()?;
    if let Some(since) = &cli.since {
        window.since = parse_datetime(since)?;
    }
    if let Some(until) = &cli.until {
        window.until = parse_datetime(until)?;
    }
    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::EntryKind;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["ghvanity", "-u", "bob", "-p", "secret", "-s", "^test_"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn cli_flags_override_config() {
        let cli = parse(&["--ref", "develop", "--entry-kind", "dir", "-f", "json", "--top", "5"]);
        let mut config = Config::default();
        apply_overrides(&mut config, &cli);

        assert_eq!(config.search.git_ref.as_deref(), Some("develop"));
        assert_eq!(config.search_options().unwrap().entry_kind, Some(EntryKind::Dir));
        assert_eq!(config.output.format, "json");
        assert_eq!(config.output.top, 5);
    }

    #[test]
    fn window_flags_replace_configured_dates() {
        let cli = parse(&["--since", "2020-02-01"]);
        let window = resolve_window(&Config::default(), &cli).unwrap();

        assert_eq!(window.since, parse_datetime("2020-02-01").unwrap());
        assert_eq!(window.until, parse_datetime("2015-05-01").unwrap());
    }

    #[test]
    fn repositories_accept_several_names() {
        let cli = parse(&["-r", "widgets", "tools", "-o", "acme"]);
        assert_eq!(cli.repositories, vec!["widgets", "tools"]);
        assert_eq!(
            RepoOwner::from_options(Some(cli.user.as_str()), cli.organization.as_deref()).unwrap(),
            RepoOwner::Organization("acme".to_string())
        );
    }

    #[test]
    fn underscore_spelling_of_search_flag_is_accepted() {
        let cli = Cli::try_parse_from([
            "ghvanity",
            "-u",
            "bob",
            "-p",
            "secret",
            "--search_regex",
            "^test_",
        ])
        .unwrap();
        assert_eq!(cli.search_regex, "^test_");
    }

    #[test]
    fn bad_date_is_rejected() {
        let cli = parse(&["--until", "someday"]);
        assert!(resolve_window(&Config::default(), &cli).is_err());
    }
}
