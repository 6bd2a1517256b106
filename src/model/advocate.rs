//! Projection aggregates.
//!
//! These are rebuilt from scratch on every fold; nothing here is ever
//! patched in place across runs.

use serde::{Deserialize, Serialize};

use super::event::EventDate;

/// An advocate as they stand after replaying the whole log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdvocate {
    /// Stable identity.
    #[serde(rename = "UID", default)]
    pub uid: String,
    /// Current profile path.
    #[serde(rename = "FileName", default)]
    pub file_name: String,
    /// Display name.
    #[serde(rename = "Name", default)]
    pub name: String,
    /// GitHub user name.
    #[serde(rename = "GitHubUserName", default)]
    pub github_user_name: String,
    /// Team.
    #[serde(rename = "Team", default)]
    pub team: String,
    /// Corporate alias.
    #[serde(rename = "Alias", default)]
    pub alias: String,
    /// Twitter handle.
    #[serde(rename = "TwitterHandle", default)]
    pub twitter_handle: String,
}

/// Dashboard row. Removed advocates stay listed with a removal date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardAdvocate {
    /// Fold correlation key; not published.
    #[serde(skip)]
    pub uid: String,
    /// Fold correlation key; not published.
    #[serde(skip)]
    pub file_name: String,
    /// GitHub user name.
    #[serde(rename = "GitHubUserName", default)]
    pub github_user_name: String,
    /// Team.
    #[serde(rename = "Team", default)]
    pub team: String,
    /// Corporate alias.
    #[serde(rename = "Alias", default)]
    pub alias: String,
    /// Display name.
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Reddit user name. Profiles carry no such field yet, so this is empty.
    #[serde(rename = "RedditUserName", default)]
    pub reddit_user_name: String,
    /// When the advocate (last) joined.
    #[serde(rename = "AddedDate", default)]
    pub added_date: Option<EventDate>,
    /// When the advocate left, if they did.
    #[serde(rename = "RemovedDate", default)]
    pub removed_date: Option<EventDate>,
}

impl DashboardAdvocate {
    /// Whether the dashboard shows this row (alias and GitHub user both known).
    #[must_use]
    pub fn is_publishable(&self) -> bool {
        !self.alias.is_empty() && !self.github_user_name.is_empty()
    }

    /// Whether the advocate is still present in the tree.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.removed_date.is_none()
    }
}

/// Public mapping between an advocate's accounts.
///
/// Equality and hashing only consider GitHub user name, alias and team.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvocateMapping {
    /// GitHub user name.
    #[serde(rename = "GitHubUserName", default)]
    pub github_user_name: String,
    /// Corporate alias.
    #[serde(rename = "Alias", default)]
    pub alias: String,
    /// Reddit user name.
    #[serde(rename = "RedditUserName", default)]
    pub reddit_user_name: String,
    /// Team.
    #[serde(rename = "Team", default)]
    pub team: String,
    /// Display name.
    #[serde(rename = "Name", default)]
    pub name: String,
}

impl PartialEq for AdvocateMapping {
    fn eq(&self, other: &Self) -> bool {
        self.github_user_name == other.github_user_name
            && self.alias == other.alias
            && self.team == other.team
    }
}

impl Eq for AdvocateMapping {}

impl std::hash::Hash for AdvocateMapping {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.github_user_name.hash(state);
        self.alias.hash(state);
        self.team.hash(state);
    }
}

impl From<&CurrentAdvocate> for AdvocateMapping {
    fn from(advocate: &CurrentAdvocate) -> Self {
        Self {
            github_user_name: advocate.github_user_name.clone(),
            alias: advocate.alias.clone(),
            reddit_user_name: String::new(),
            team: advocate.team.clone(),
            name: advocate.name.clone(),
        }
    }
}

impl From<&DashboardAdvocate> for AdvocateMapping {
    fn from(advocate: &DashboardAdvocate) -> Self {
        Self {
            github_user_name: advocate.github_user_name.clone(),
            alias: advocate.alias.clone(),
            reddit_user_name: advocate.reddit_user_name.clone(),
            team: advocate.team.clone(),
            name: advocate.name.clone(),
        }
    }
}
