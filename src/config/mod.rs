use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::github::{DateWindow, EntryKind};
use crate::search::SearchOptions;

const DEFAULT_CONFIG_NAME: &str = "ghvanity";
const ENV_PREFIX: &str = "GHVANITY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub search: SearchConfig,
    pub window: WindowConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub user_agent: String,
    /// No timeout when unset: a stalled request blocks the run.
    pub timeout_secs: Option<u64>,
    /// Forwarded on list calls; only the first page is ever read.
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub recursive: bool,
    /// "file", "dir", or unset for both.
    pub entry_kind: Option<String>,
    pub git_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub since: String,
    pub until: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: String,
    pub top: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                host: "https://api.github.com".to_string(),
                user_agent: format!("ghvanity/{}", env!("CARGO_PKG_VERSION")),
                timeout_secs: None,
                per_page: None,
            },
            search: SearchConfig {
                recursive: true,
                entry_kind: Some("file".to_string()),
                git_ref: None,
            },
            window: WindowConfig {
                since: "2015-01-01T00:00:00Z".to_string(),
                until: "2015-05-01T00:00:00Z".to_string(),
            },
            output: OutputConfig {
                format: "table".to_string(),
                top: 0,
            },
        }
    }
}

impl Config {
    /// Defaults, then the config file (`path`, or `./ghvanity.toml` if it
    /// exists), then `GHVANITY__SECTION__KEY` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = ::config::Config::try_from(&Config::default())
            .context("Failed to build default configuration")?;

        let file = match path {
            Some(p) => ::config::File::from(p).required(true),
            None => ::config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings = ::config::Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load configuration")?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn search_options(&self) -> Result<SearchOptions> {
        let entry_kind = self
            .search
            .entry_kind
            .as_deref()
            .map(str::parse::<EntryKind>)
            .transpose()?;

        Ok(SearchOptions::default()
            .recursive(self.search.recursive)
            .git_ref(self.search.git_ref.clone())
            .entry_kind(entry_kind))
    }

    pub fn date_window(&self) -> Result<DateWindow> {
        Ok(DateWindow::parse(&self.window.since, &self.window.until)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_search_files_recursively_in_early_2015() {
        let config = Config::default();
        let options = config.search_options().unwrap();
        assert!(options.recursive);
        assert_eq!(options.entry_kind, Some(EntryKind::File));
        assert_eq!(options.git_ref, None);

        let window = config.date_window().unwrap();
        assert_eq!(window.since, Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(window.until, Utc.with_ymd_and_hms(2015, 5, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[api]
host = "https://git.example.com/api/v3"
per_page = 50

[search]
recursive = false
git_ref = "develop"

[output]
format = "json"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.api.host, "https://git.example.com/api/v3");
        assert_eq!(config.api.per_page, Some(50));
        assert!(!config.search.recursive);
        assert_eq!(config.search.git_ref.as_deref(), Some("develop"));
        assert_eq!(config.search.entry_kind.as_deref(), Some("file"));
        assert_eq!(config.output.format, "json");
        assert_eq!(config.window, Config::default().window);
    }

    #[test]
    fn environment_overrides_defaults() {
        std::env::set_var("GHVANITY__OUTPUT__TOP", "7");
        let config = Config::load(None);
        std::env::remove_var("GHVANITY__OUTPUT__TOP");

        assert_eq!(config.unwrap().output.top, 7);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = Config::load(Some(Path::new("/nonexistent/ghvanity-test.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn bad_entry_kind_is_rejected() {
        let mut config = Config::default();
        config.search.entry_kind = Some("symlink".to_string());
        assert!(config.search_options().is_err());

        config.search.entry_kind = None;
        assert_eq!(config.search_options().unwrap().entry_kind, None);
    }
}
