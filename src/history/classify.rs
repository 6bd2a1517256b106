//! Classification of raw provider changes into profile changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::RawChange;

/// Default subtree holding profiles.
pub const DEFAULT_PREFIX: &str = "advocates/";

/// Default tracked extensions.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".yml", ".yaml"];

/// File names under the subtree that are not individual profiles.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "index.html.yml",
    "map.yml",
    "toc.yml",
    "index.yml",
    "twitter.yml",
    "tweets.yml",
];

/// Normalized kind of a retained change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// New file.
    Added,
    /// Content changed in place.
    Modified,
    /// File removed.
    Deleted,
    /// File moved; `previous_path` holds the source.
    Renamed,
}

impl ChangeKind {
    /// Map a provider status string.
    ///
    /// Accepts git name-status letters (`A`, `M`, `D`, `R<score>`) and the
    /// hosting API's words (`added`, `modified`, `removed`, `deleted`,
    /// `renamed`). Copies, type changes and anything else are unknown.
    #[must_use]
    pub fn from_status(status: &str) -> Option<Self> {
        let status = status.trim();
        match status.to_ascii_lowercase().as_str() {
            "a" | "added" => Some(Self::Added),
            "m" | "modified" => Some(Self::Modified),
            "d" | "deleted" | "removed" => Some(Self::Deleted),
            "renamed" => Some(Self::Renamed),
            _ if is_rename_score(status) => Some(Self::Renamed),
            _ => None,
        }
    }
}

/// `R` followed by an optional similarity score, as git prints it.
fn is_rename_score(status: &str) -> bool {
    status
        .strip_prefix('R')
        .is_some_and(|score| score.chars().all(|c| c.is_ascii_digit()))
}

/// A retained profile change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathChange {
    /// Path after the change (the removed path for deletions).
    pub path: String,
    /// Source path of a rename.
    pub previous_path: Option<String>,
    /// Normalized change kind.
    pub kind: ChangeKind,
}

impl PathChange {
    /// The pre-change path, which is the path itself unless renamed.
    #[must_use]
    pub fn previous_or_current(&self) -> &str {
        self.previous_path.as_deref().unwrap_or(&self.path)
    }
}

/// Which paths count as profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathFilter {
    /// Required path prefix.
    pub prefix: String,
    /// Accepted extensions, including the dot. Case-sensitive.
    pub extensions: Vec<String>,
    /// Excluded file names.
    pub exclusions: Vec<String>,
}

impl Default for PathFilter {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
            exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl PathFilter {
    /// Whether `path` names a tracked profile.
    #[must_use]
    pub fn accepts(&self, path: &str) -> bool {
        if !path.starts_with(&self.prefix) {
            return false;
        }

        let file = Path::new(path);
        let file_name = file.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if self.exclusions.iter().any(|excluded| excluded == file_name) {
            return false;
        }

        let extension = file
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        self.extensions.iter().any(|accepted| *accepted == extension)
    }
}

/// Result of classifying one transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Retained changes, in provider order.
    pub changes: Vec<PathChange>,
    /// Changes outside the subtree, with other extensions, or excluded.
    pub filtered: usize,
    /// Changes with a status that has no event meaning.
    pub unknown: usize,
}

/// Filters and normalizes the raw changes of a transition.
#[derive(Debug, Clone, Default)]
pub struct ChangeClassifier {
    filter: PathFilter,
}

impl ChangeClassifier {
    /// Create a classifier with the given path filter.
    #[must_use]
    pub fn new(filter: PathFilter) -> Self {
        Self { filter }
    }

    /// The path filter in use.
    #[must_use]
    pub const fn filter(&self) -> &PathFilter {
        &self.filter
    }

    /// Classify the raw changes of one transition.
    #[must_use]
    pub fn classify(&self, changes: &[RawChange]) -> Classification {
        let mut result = Classification::default();

        for raw in changes {
            if !self.filter.accepts(&raw.path) {
                result.filtered += 1;
                continue;
            }

            let Some(kind) = ChangeKind::from_status(&raw.status) else {
                tracing::warn!(
                    path = %raw.path,
                    status = %raw.status,
                    "Skipping change with unsupported status"
                );
                result.unknown += 1;
                continue;
            };

            let change = match (kind, &raw.previous_path) {
                (ChangeKind::Renamed, Some(previous)) => PathChange {
                    path: raw.path.clone(),
                    previous_path: Some(previous.clone()),
                    kind,
                },
                (ChangeKind::Renamed, None) => {
                    tracing::debug!(path = %raw.path, "Rename without source path treated as addition");
                    PathChange {
                        path: raw.path.clone(),
                        previous_path: None,
                        kind: ChangeKind::Added,
                    }
                }
                (kind, _) => PathChange {
                    path: raw.path.clone(),
                    previous_path: None,
                    kind,
                },
            };
            result.changes.push(change);
        }

        result
    }
}
