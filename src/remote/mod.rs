//! Remote history through the hosting provider's REST API.
//!
//! [`GitHubRepository`] replays the commits between a stored cursor and the
//! tip of a branch. It is incremental only: the full history is bootstrapped
//! from a local clone. Any transport error or non-success status aborts the
//! walk, so a run never records a partially fetched transition.

pub mod api;

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use rayon::prelude::*;
use reqwest::blocking::{Client, Response};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

use self::api::{CommitResponse, CompareResponse, FileEntry};
use crate::config::RemoteConfig;
use crate::error::{AdvocateError, Result};
use crate::history::{strip_bom, Cursor, HistorySource, RawChange, Transition};

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const PAGE_SIZE: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters escaped inside one path segment or query value.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'/')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A repository on the hosting API.
pub struct GitHubRepository {
    client: Client,
    settings: RemoteConfig,
    token: Option<String>,
}

impl std::fmt::Debug for GitHubRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubRepository")
            .field("settings", &self.settings)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl GitHubRepository {
    /// Create a client for the configured repository.
    pub fn new(settings: RemoteConfig, token: Option<String>) -> Result<Self> {
        if settings.owner.is_empty() || settings.name.is_empty() {
            return Err(AdvocateError::InvalidConfig {
                message: "remote owner and name must be set".to_string(),
            });
        }
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AdvocateError::remote_with_source(settings.api_base.clone(), e))?;
        Ok(Self {
            client,
            settings,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Settings in use.
    pub const fn settings(&self) -> &RemoteConfig {
        &self.settings
    }

    fn repo_url(&self, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.settings.api_base.trim_end_matches('/'),
            encode(&self.settings.owner),
            encode(&self.settings.name),
            tail
        )
    }

    fn get(&self, url: &str, accept: &str) -> Result<Response> {
        let mut request = self.client.get(url).header(ACCEPT, accept);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| AdvocateError::remote_with_source(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdvocateError::remote(url, format!("HTTP {status}")));
        }
        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!(url, "GET");
        self.get(url, JSON_MEDIA_TYPE)?
            .json()
            .map_err(|e| AdvocateError::remote_with_source(url, e))
    }

    /// Commits in `base...branch`, oldest first.
    fn compare(&self, base: &str) -> Result<Vec<Transition>> {
        let range = format!("{}...{}", base, self.settings.branch);
        let mut transitions = Vec::new();

        for page in 1.. {
            let url = format!(
                "{}?per_page={PAGE_SIZE}&page={page}",
                self.repo_url(&format!("compare/{}", encode(&range)))
            );
            let response: CompareResponse = self.get_json(&url)?;
            let fetched = response.commits.len();
            for commit in &response.commits {
                transitions.push(commit.to_transition()?);
            }
            if fetched == 0 || transitions.len() >= response.total_commits {
                break;
            }
        }

        Ok(transitions)
    }

    /// All changed files of one commit.
    fn commit_files(&self, sha: &str) -> Result<Vec<FileEntry>> {
        let mut files = Vec::new();

        for page in 1.. {
            let url = format!(
                "{}?per_page={PAGE_SIZE}&page={page}",
                self.repo_url(&format!("commits/{}", encode(sha)))
            );
            let response: CommitResponse = self.get_json(&url)?;
            let fetched = response.files.len();
            files.extend(response.files);
            if fetched < PAGE_SIZE {
                break;
            }
        }

        Ok(files)
    }
}

impl HistorySource for GitHubRepository {
    fn transitions(&self, since: Option<&Cursor>) -> Result<Vec<Transition>> {
        let Some(cursor) = since else {
            return Err(AdvocateError::Unsupported {
                feature: "walking the full history over the hosting API; generate from a local clone first"
                    .to_string(),
            });
        };

        let headers = self.compare(cursor.as_str())?;
        headers
            .into_par_iter()
            .map(|mut transition| {
                if transition.sole_parent().is_some() {
                    let files = self.commit_files(&transition.id)?;
                    transition.changes = files.iter().map(RawChange::from).collect();
                }
                Ok(transition)
            })
            .collect()
    }

    fn read_file(&self, revision: &str, path: &str) -> Result<String> {
        let segments: Vec<String> = path.split('/').map(encode).collect();
        let url = format!(
            "{}?ref={}",
            self.repo_url(&format!("contents/{}", segments.join("/"))),
            encode(revision)
        );
        tracing::debug!(url, "GET raw content");
        let bytes = self
            .get(&url, RAW_MEDIA_TYPE)?
            .bytes()
            .map_err(|e| AdvocateError::remote_with_source(url.as_str(), e))?;
        Ok(strip_bom(String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn describe(&self) -> String {
        format!(
            "{}/{}@{} via {}",
            self.settings.owner, self.settings.name, self.settings.branch, self.settings.api_base
        )
    }
}

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_base: &str) -> RemoteConfig {
        RemoteConfig {
            api_base: api_base.to_string(),
            ..RemoteConfig::default()
        }
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode("jane doe.yml"), "jane%20doe.yml");
        assert_eq!(encode("a/b"), "a%2Fb");
        assert_eq!(encode("abc...master"), "abc...master");
    }

    #[test]
    fn test_repo_url() {
        let repo = GitHubRepository::new(settings("https://example.test/api/"), None).unwrap();
        assert_eq!(
            repo.repo_url("commits/abc"),
            format!(
                "https://example.test/api/repos/{}/{}/commits/abc",
                RemoteConfig::default().owner,
                RemoteConfig::default().name
            )
        );
    }

    #[test]
    fn test_full_walk_is_unsupported() {
        let repo = GitHubRepository::new(settings("http://127.0.0.1:9"), None).unwrap();
        assert!(matches!(
            repo.transitions(None),
            Err(AdvocateError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_unreachable_host_is_remote_error() {
        let repo = GitHubRepository::new(settings("http://127.0.0.1:9"), None).unwrap();
        let err = repo.read_file("abc", "advocates/a.yml").unwrap_err();
        assert!(matches!(err, AdvocateError::Remote { .. }));
    }

    #[test]
    fn test_debug_redacts_token() {
        let repo =
            GitHubRepository::new(settings("http://127.0.0.1:9"), Some("ghp_secret".to_string()))
                .unwrap();
        let debug = format!("{repo:?}");
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_missing_owner_is_config_error() {
        let bad = RemoteConfig {
            owner: String::new(),
            ..RemoteConfig::default()
        };
        assert!(matches!(
            GitHubRepository::new(bad, None),
            Err(AdvocateError::InvalidConfig { .. })
        ));
    }
}
