use super::*;
use crate::config::ApiConfig;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const MAX_ERROR_BODY: usize = 200;

/// Basic credentials passed straight through to every request.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Blocking client for the GitHub REST v3 API.
#[derive(Debug)]
pub struct GitHubClient {
    http: Client,
    host: Url,
    credentials: Option<Credentials>,
    per_page: Option<u32>,
}

impl GitHubClient {
    pub fn new(settings: &ApiConfig, credentials: Option<Credentials>) -> Result<Self, FetchError> {
        let host = Url::parse(&settings.host).map_err(|e| FetchError::network(&settings.host, e))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        let http = Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .timeout(settings.timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|e| FetchError::network(&settings.host, e))?;

        debug!(
            "GitHub client for {} (authenticated: {})",
            host,
            credentials.is_some()
        );

        Ok(Self {
            http,
            host,
            credentials,
            per_page: settings.per_page,
        })
    }

    fn endpoint<'a, I>(&self, segments: I) -> Result<Url, FetchError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.host.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::network(self.host.as_str(), "host cannot be a base URL"))?
            .pop_if_empty()
            .extend(segments.into_iter().filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn repo_endpoint<'a>(&self, repo: &'a RepoRef, rest: &[&'a str]) -> Result<Url, FetchError> {
        let head = ["repos", repo.owner.as_str(), repo.name.as_str()];
        self.endpoint(head.into_iter().chain(rest.iter().copied()))
    }

    fn page_params(&self) -> Vec<(String, String)> {
        self.per_page
            .map(|n| vec![("per_page".to_string(), n.to_string())])
            .unwrap_or_default()
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(String, String)],
    ) -> Result<T, FetchError> {
        let url_text = url.to_string();
        debug!("GET {} {:?}", url_text, query);

        let mut request = self.http.get(url).query(query);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, creds.password.as_deref());
        }

        let response = request
            .send()
            .map_err(|e| FetchError::network(&url_text, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url_text,
                message: api_message(&body),
            });
        }

        let body = response
            .text()
            .map_err(|e| FetchError::decode(&url_text, e))?;
        serde_json::from_str(&body).map_err(|e| FetchError::decode(&url_text, e))
    }
}

/// GitHub reports failures as `{"message": "..."}`; fall back to the raw body.
fn api_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ApiFailure {
        message: String,
    }

    match serde_json::from_str::<ApiFailure>(body) {
        Ok(failure) => failure.message,
        Err(_) => body.trim().chars().take(MAX_ERROR_BODY).collect(),
    }
}

impl HostingApi for GitHubClient {
    fn list_repositories(&self, owner: &RepoOwner) -> Result<Vec<RepositorySummary>, FetchError> {
        let url = match owner {
            RepoOwner::User(login) => self.endpoint(["users", login.as_str(), "repos"])?,
            RepoOwner::Organization(login) => self.endpoint(["orgs", login.as_str(), "repos"])?,
        };
        self.get_json(url, &self.page_params())
    }

    fn list_directory(
        &self,
        repo: &RepoRef,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<Vec<DirectoryEntry>, FetchError> {
        let mut rest = vec!["contents"];
        rest.extend(path.split('/'));
        let url = self.repo_endpoint(repo, &rest)?;

        let query: Vec<(String, String)> = git_ref
            .map(|r| vec![("ref".to_string(), r.to_string())])
            .unwrap_or_default();
        self.get_json(url, &query)
    }

    fn get_commit_detail(
        &self,
        repo: &RepoRef,
        sha: &str,
        params: &QueryParams,
    ) -> Result<CommitDetail, FetchError> {
        let url = self.repo_endpoint(repo, &["commits", sha])?;
        let query: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.get_json(url, &query)
    }

    fn list_commits(
        &self,
        repo: &RepoRef,
        path: &str,
        window: &DateWindow,
    ) -> Result<Vec<CommitSummary>, FetchError> {
        let url = self.repo_endpoint(repo, &["commits"])?;
        let mut query = vec![("path".to_string(), path.to_string())];
        query.extend(
            window
                .query_pairs()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v)),
        );
        query.extend(self.page_params());
        self.get_json(url, &query)
    }

    fn get_rate_limit_status(&self) -> Result<RateLimitSnapshot, FetchError> {
        let url = self.endpoint(["rate_limit"])?;
        self.get_json(url, &[])
    }
}
