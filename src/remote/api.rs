//! Wire types for the hosting API's compare, commit and contents endpoints.
//!
//! Only the fields the walker reads are modelled; everything else in the
//! responses is ignored.

use serde::Deserialize;

use crate::error::{AdvocateError, Result};
use crate::history::{RawChange, Transition};
use crate::model::EventDate;

/// `GET /repos/{owner}/{repo}/compare/{base}...{head}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CompareResponse {
    /// Commits in the range, across all pages.
    #[serde(default)]
    pub total_commits: usize,
    /// Commits on this page, oldest first.
    #[serde(default)]
    pub commits: Vec<CommitSummary>,
}

/// A commit as listed in a comparison.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitSummary {
    /// Commit SHA.
    pub sha: String,
    /// Parent commits.
    #[serde(default)]
    pub parents: Vec<ParentRef>,
    /// Git-level commit metadata.
    pub commit: GitCommit,
}

/// `GET /repos/{owner}/{repo}/commits/{sha}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitResponse {
    /// Commit SHA.
    pub sha: String,
    /// Parent commits.
    #[serde(default)]
    pub parents: Vec<ParentRef>,
    /// Git-level commit metadata.
    pub commit: GitCommit,
    /// Changed files on this page.
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// Parent reference.
#[derive(Debug, Clone, Deserialize)]
pub struct ParentRef {
    /// Parent SHA.
    pub sha: String,
}

/// Git-level commit metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct GitCommit {
    /// Committer signature.
    pub committer: Signature,
}

/// Name/date signature.
#[derive(Debug, Clone, Deserialize)]
pub struct Signature {
    /// ISO 8601 timestamp.
    pub date: String,
}

/// One changed file of a commit.
#[derive(Debug, Clone, Deserialize)]
pub struct FileEntry {
    /// Path after the change.
    pub filename: String,
    /// `added`, `removed`, `modified`, `renamed`, `copied`, `changed` or `unchanged`.
    pub status: String,
    /// Source path of a rename or copy.
    #[serde(default)]
    pub previous_filename: Option<String>,
}

impl From<&FileEntry> for RawChange {
    fn from(entry: &FileEntry) -> Self {
        Self {
            path: entry.filename.clone(),
            previous_path: entry.previous_filename.clone(),
            status: entry.status.clone(),
        }
    }
}

impl GitCommit {
    /// Parse the committer date.
    pub fn committed_at(&self, sha: &str) -> Result<EventDate> {
        chrono::DateTime::parse_from_rfc3339(&self.committer.date).map_err(|e| {
            AdvocateError::remote(
                format!("commit {sha}"),
                format!("bad committer date '{}': {e}", self.committer.date),
            )
        })
    }
}

impl CommitSummary {
    /// Header-only transition; changes are filled in separately.
    pub fn to_transition(&self) -> Result<Transition> {
        Ok(Transition {
            id: self.sha.clone(),
            parents: self.parents.iter().map(|p| p.sha.clone()).collect(),
            timestamp: self.commit.committed_at(&self.sha)?,
            changes: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const COMPARE: &str = r#"{
        "status": "ahead",
        "total_commits": 2,
        "commits": [
            {
                "sha": "aaa",
                "parents": [{"sha": "base", "url": "ignored"}],
                "commit": {"committer": {"name": "x", "date": "2022-02-02T10:00:00Z"}, "message": "m"}
            },
            {
                "sha": "bbb",
                "parents": [{"sha": "aaa"}, {"sha": "zzz"}],
                "commit": {"committer": {"date": "2022-02-03T10:00:00Z"}}
            }
        ],
        "files": []
    }"#;

    const COMMIT: &str = r#"{
        "sha": "aaa",
        "parents": [{"sha": "base"}],
        "commit": {"committer": {"date": "2022-02-02T10:00:00+02:00"}},
        "files": [
            {"filename": "advocates/a.yml", "status": "added", "additions": 10},
            {"filename": "advocates/c.yml", "status": "renamed", "previous_filename": "advocates/b.yml"},
            {"filename": "advocates/d.yml", "status": "removed"}
        ]
    }"#;

    #[test]
    fn test_compare_to_transitions() {
        let compare: CompareResponse = serde_json::from_str(COMPARE).unwrap();
        assert_eq!(compare.total_commits, 2);
        let transitions: Vec<Transition> = compare
            .commits
            .iter()
            .map(|c| c.to_transition().unwrap())
            .collect();
        assert_eq!(transitions[0].id, "aaa");
        assert_eq!(transitions[0].sole_parent(), Some("base"));
        assert_eq!(transitions[1].parents.len(), 2);
        assert!(transitions[1].sole_parent().is_none());
    }

    #[test]
    fn test_commit_files_to_raw_changes() {
        let commit: CommitResponse = serde_json::from_str(COMMIT).unwrap();
        let changes: Vec<RawChange> = commit.files.iter().map(RawChange::from).collect();
        assert_eq!(
            changes,
            vec![
                RawChange::new("added", "advocates/a.yml"),
                RawChange::new("renamed", "advocates/c.yml").with_previous("advocates/b.yml"),
                RawChange::new("removed", "advocates/d.yml"),
            ]
        );
        let date = commit.commit.committed_at(&commit.sha).unwrap();
        assert_eq!(date.offset().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn test_bad_committer_date_is_an_error() {
        let summary = CommitSummary {
            sha: "x".to_string(),
            parents: Vec::new(),
            commit: GitCommit {
                committer: Signature {
                    date: "last tuesday".to_string(),
                },
            },
        };
        assert!(summary.to_transition().is_err());
    }
}
