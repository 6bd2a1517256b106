//! Configuration management for advocate-events.
//!
//! Handles:
//! - Where the profile repository lives and which subtree holds profiles
//! - The hosting API coordinates used for incremental updates
//! - Path filtering and the Twitter label mode
//! - Artifact names and location
//!
//! Credentials are never read from or written to configuration files; the
//! API token comes from the command line or the environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AdvocateError, Result};
use crate::extraction::TwitterLabel;
use crate::history::{PathFilter, DEFAULT_EXCLUSIONS, DEFAULT_EXTENSIONS, DEFAULT_PREFIX};
use crate::util::atomic_write;

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Local clone settings.
    #[serde(default)]
    pub repository: RepositoryConfig,
    /// Hosting API settings.
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Which changes count as profile changes.
    #[serde(default)]
    pub filter: FilterConfig,
    /// Persisted artifact names.
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    /// Dashboard projection options.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Project-specific configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = ".advocate-events.toml";

impl Config {
    /// Load configuration from default locations.
    pub fn load() -> Result<Self> {
        let config_path = default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration with project-specific overrides.
    ///
    /// Searches for `.advocate-events.toml` in the given directory and
    /// merges it over the global configuration.
    pub fn load_for_project(project_dir: &Path) -> Result<Self> {
        let mut config = Self::load().unwrap_or_default();

        let project_config_path = project_dir.join(PROJECT_CONFIG_FILENAME);
        if project_config_path.exists() {
            let project_config = Self::load_from(&project_config_path)?;
            config.merge_from(&project_config);
        }

        Ok(config)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AdvocateError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        toml::from_str(&content).map_err(|e| AdvocateError::InvalidConfig {
            message: format!("{}: {e}", path.display()),
        })
    }

    /// Merge another config into this one (non-default values of `other` win).
    pub fn merge_from(&mut self, other: &Config) {
        let defaults = Config::default();

        if other.repository.path != defaults.repository.path {
            self.repository.path = other.repository.path.clone();
        }
        if other.repository.revision != defaults.repository.revision {
            self.repository.revision = other.repository.revision.clone();
        }
        if other.repository.prefix != defaults.repository.prefix {
            self.repository.prefix = other.repository.prefix.clone();
        }

        if other.remote.api_base != defaults.remote.api_base {
            self.remote.api_base = other.remote.api_base.clone();
        }
        if other.remote.owner != defaults.remote.owner {
            self.remote.owner = other.remote.owner.clone();
        }
        if other.remote.name != defaults.remote.name {
            self.remote.name = other.remote.name.clone();
        }
        if other.remote.branch != defaults.remote.branch {
            self.remote.branch = other.remote.branch.clone();
        }
        if other.remote.user_agent != defaults.remote.user_agent {
            self.remote.user_agent = other.remote.user_agent.clone();
        }

        if other.filter.extensions != defaults.filter.extensions {
            self.filter.extensions = other.filter.extensions.clone();
        }
        if other.filter.exclusions != defaults.filter.exclusions {
            self.filter.exclusions = other.filter.exclusions.clone();
        }
        if other.filter.twitter_label != defaults.filter.twitter_label {
            self.filter.twitter_label = other.filter.twitter_label;
        }

        if other.artifacts.directory.is_some() {
            self.artifacts.directory = other.artifacts.directory.clone();
        }
        if other.artifacts.events != defaults.artifacts.events {
            self.artifacts.events = other.artifacts.events.clone();
        }
        if other.artifacts.current != defaults.artifacts.current {
            self.artifacts.current = other.artifacts.current.clone();
        }
        if other.artifacts.dashboard != defaults.artifacts.dashboard {
            self.artifacts.dashboard = other.artifacts.dashboard.clone();
        }
        if other.artifacts.cursor != defaults.artifacts.cursor {
            self.artifacts.cursor = other.artifacts.cursor.clone();
        }

        if other.dashboard.publishable_only != defaults.dashboard.publishable_only {
            self.dashboard.publishable_only = other.dashboard.publishable_only;
        }
    }

    /// Check values that would make every run fail.
    pub fn validate(&self) -> Result<()> {
        let names = [
            ("artifacts.events", &self.artifacts.events),
            ("artifacts.current", &self.artifacts.current),
            ("artifacts.dashboard", &self.artifacts.dashboard),
            ("artifacts.cursor", &self.artifacts.cursor),
        ];
        for (key, value) in names {
            if value.trim().is_empty() || value.contains('/') || value.contains('\\') {
                return Err(AdvocateError::InvalidConfig {
                    message: format!("{key} must be a plain file name, got '{value}'"),
                });
            }
        }
        if self.filter.extensions.iter().any(|ext| !ext.starts_with('.')) {
            return Err(AdvocateError::InvalidConfig {
                message: "filter.extensions entries must start with '.'".to_string(),
            });
        }
        Ok(())
    }

    /// The path filter described by `[repository]` and `[filter]`.
    #[must_use]
    pub fn path_filter(&self) -> PathFilter {
        PathFilter {
            prefix: self.repository.prefix.clone(),
            extensions: self.filter.extensions.clone(),
            exclusions: self.filter.exclusions.clone(),
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let config_path = default_config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to a specific path.
    ///
    /// The file is written to a temporary sibling first and then renamed
    /// over the target.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| AdvocateError::InvalidConfig {
            message: format!("Failed to serialize config: {e}"),
        })?;

        atomic_write(path, content.as_bytes())
    }
}

/// Local clone configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Path of the clone.
    #[serde(default = "default_repository_path")]
    pub path: PathBuf,
    /// Revision walked up to.
    #[serde(default = "default_revision")]
    pub revision: String,
    /// Subtree holding profile files.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            path: default_repository_path(),
            revision: default_revision(),
            prefix: default_prefix(),
        }
    }
}

/// Hosting API configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Repository owner.
    #[serde(default = "default_owner")]
    pub owner: String,
    /// Repository name.
    #[serde(default = "default_repo_name")]
    pub name: String,
    /// Branch compared against the cursor.
    #[serde(default = "default_branch")]
    pub branch: String,
    /// `User-Agent` sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            owner: default_owner(),
            name: default_repo_name(),
            branch: default_branch(),
            user_agent: default_user_agent(),
        }
    }
}

/// Path filter and extraction configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Tracked extensions, with the leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// File names that are never profiles.
    #[serde(default = "default_exclusions")]
    pub exclusions: Vec<String>,
    /// Label the first Twitter URL form is read from.
    #[serde(default)]
    pub twitter_label: TwitterLabel,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclusions: default_exclusions(),
            twitter_label: TwitterLabel::default(),
        }
    }
}

/// Artifact configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory holding the artifacts (default: the data directory).
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Event log.
    #[serde(default = "default_events_name")]
    pub events: String,
    /// Current-state projection.
    #[serde(default = "default_current_name")]
    pub current: String,
    /// Dashboard projection.
    #[serde(default = "default_dashboard_name")]
    pub dashboard: String,
    /// Cursor of the last processed transition.
    #[serde(default = "default_cursor_name")]
    pub cursor: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            directory: None,
            events: default_events_name(),
            current: default_current_name(),
            dashboard: default_dashboard_name(),
            cursor: default_cursor_name(),
        }
    }
}

/// Dashboard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Persist only rows with both an alias and a GitHub user name.
    #[serde(default = "default_true")]
    pub publishable_only: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            publishable_only: true,
        }
    }
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_repository_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_revision() -> String {
    "HEAD".to_string()
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_owner() -> String {
    "MicrosoftDocs".to_string()
}

fn default_repo_name() -> String {
    "cloud-developer-advocates".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_user_agent() -> String {
    format!("{}/{}", crate::NAME, crate::VERSION)
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect()
}

fn default_exclusions() -> Vec<String> {
    DEFAULT_EXCLUSIONS.iter().map(|s| (*s).to_string()).collect()
}

fn default_events_name() -> String {
    "all-events.json".to_string()
}

fn default_current_name() -> String {
    "current-advocates.json".to_string()
}

fn default_dashboard_name() -> String {
    "dashboard-advocates.json".to_string()
}

fn default_cursor_name() -> String {
    "last-processed-commit.txt".to_string()
}

/// Get the default configuration path.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| AdvocateError::Unsupported {
        feature: "config directory discovery".to_string(),
    })?;

    Ok(config_dir.join("advocate-events").join("config.toml"))
}

/// Get the default artifact directory.
pub fn default_store_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| AdvocateError::Unsupported {
        feature: "data directory discovery".to_string(),
    })?;

    Ok(data_dir.join("advocate-events"))
}
