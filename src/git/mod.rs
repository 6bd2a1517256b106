//! Local history through the `git` executable.
//!
//! [`LocalRepository`] implements [`HistorySource`] over a clone on disk.
//! Every query is a `git` subprocess; nothing is cached between calls.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::DateTime;
use rayon::prelude::*;

use crate::error::{AdvocateError, Result};
use crate::history::{strip_bom, Cursor, HistorySource, RawChange, Transition};

/// Run git in `cwd` and return its raw stdout.
pub fn git_command(args: &[&str], cwd: &Path) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| AdvocateError::git(args.join(" "), format!("failed to execute git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AdvocateError::git(args.join(" "), stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Check if a directory is inside a git work tree.
pub fn is_git_repo(path: &Path) -> bool {
    path.exists()
        && git_command(&["rev-parse", "--is-inside-work-tree"], path)
            .is_ok_and(|out| out.trim() == "true")
}

/// A local clone walked with `git log` / `git diff-tree` / `git show`.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
    revision: String,
}

impl LocalRepository {
    /// Open the work tree containing `path`, walking up to `HEAD`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !is_git_repo(path) {
            return Err(AdvocateError::NotARepository {
                path: path.to_path_buf(),
            });
        }
        let root = git_command(&["rev-parse", "--show-toplevel"], path)?;
        Ok(Self {
            root: PathBuf::from(root.trim()),
            revision: "HEAD".to_string(),
        })
    }

    /// Walk up to `revision` instead of `HEAD`.
    #[must_use]
    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = revision.into();
        self
    }

    /// Work tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Revision walked up to.
    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// Resolve the walked revision to a commit id.
    pub fn head_commit(&self) -> Result<String> {
        let spec = format!("{}^{{commit}}", self.revision);
        git_command(&["rev-parse", "--verify", &spec], &self.root).map(|s| s.trim().to_string())
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        git_command(args, &self.root)
    }

    /// Raw changes between `parent` and `commit`, rename detection on.
    fn changes(&self, parent: &str, commit: &str) -> Result<Vec<RawChange>> {
        let output = self.git(&[
            "diff-tree",
            "-r",
            "-M",
            "-z",
            "--no-commit-id",
            "--name-status",
            parent,
            commit,
        ])?;
        Ok(parse_name_status_z(&output))
    }
}

impl HistorySource for LocalRepository {
    fn transitions(&self, since: Option<&Cursor>) -> Result<Vec<Transition>> {
        let range = match since {
            Some(cursor) => format!("{}..{}", cursor.as_str(), self.revision),
            None => self.revision.clone(),
        };
        let log = self.git(&[
            "log",
            "--topo-order",
            "--reverse",
            "--format=%H|%P|%aI",
            &range,
        ])?;

        let headers = log
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(parse_log_line)
            .collect::<Result<Vec<_>>>()?;

        headers
            .into_par_iter()
            .map(|mut transition| {
                let changes = match transition.sole_parent() {
                    Some(parent) => self.changes(parent, &transition.id)?,
                    None => Vec::new(),
                };
                transition.changes = changes;
                Ok(transition)
            })
            .collect()
    }

    fn read_file(&self, revision: &str, path: &str) -> Result<String> {
        let spec = format!("{revision}:{path}");
        self.git(&["show", &spec]).map(strip_bom)
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.root.display(), self.revision)
    }
}

/// Parse one `%H|%P|%aI` line.
fn parse_log_line(line: &str) -> Result<Transition> {
    let mut parts = line.trim().splitn(3, '|');
    let (Some(id), Some(parents), Some(date)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AdvocateError::git("log", format!("unexpected log line: {line}")));
    };

    let timestamp = DateTime::parse_from_rfc3339(date.trim())
        .map_err(|e| AdvocateError::git("log", format!("bad author date '{date}': {e}")))?;

    Ok(Transition {
        id: id.to_string(),
        parents: parents.split_whitespace().map(str::to_string).collect(),
        timestamp,
        changes: Vec::new(),
    })
}

/// Parse NUL-separated `--name-status -z` output.
///
/// Each record is a status followed by one path, or two paths (source,
/// destination) for renames and copies.
fn parse_name_status_z(output: &str) -> Vec<RawChange> {
    let mut fields = output.split('\0').filter(|f| !f.is_empty());
    let mut changes = Vec::new();

    while let Some(status) = fields.next() {
        let two_paths = status.starts_with('R') || status.starts_with('C');
        let Some(first) = fields.next() else { break };
        if two_paths {
            let Some(second) = fields.next() else { break };
            changes.push(RawChange::new(status, second).with_previous(first));
        } else {
            changes.push(RawChange::new(status, first));
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_log_line() {
        let t = parse_log_line("abc|p1 p2|2021-05-06T07:08:09-07:00").unwrap();
        assert_eq!(t.id, "abc");
        assert_eq!(t.parents, vec!["p1".to_string(), "p2".to_string()]);
        assert_eq!(t.timestamp.to_rfc3339(), "2021-05-06T07:08:09-07:00");

        let root = parse_log_line("abc||2021-05-06T07:08:09+00:00").unwrap();
        assert!(root.parents.is_empty());
    }

    #[test]
    fn test_parse_log_line_rejects_garbage() {
        assert!(parse_log_line("not a log line").is_err());
        assert!(parse_log_line("abc|p|yesterday").is_err());
    }

    #[test]
    fn test_parse_name_status_z() {
        let output = "M\0advocates/a.yml\0R100\0advocates/old.yml\0advocates/new.yml\0A\0advocates/b.yml\0";
        let changes = parse_name_status_z(output);
        assert_eq!(
            changes,
            vec![
                RawChange::new("M", "advocates/a.yml"),
                RawChange::new("R100", "advocates/new.yml").with_previous("advocates/old.yml"),
                RawChange::new("A", "advocates/b.yml"),
            ]
        );
    }

    #[test]
    fn test_parse_name_status_z_copy_and_empty() {
        assert!(parse_name_status_z("").is_empty());
        let changes = parse_name_status_z("C75\0a.yml\0b.yml\0");
        assert_eq!(changes[0].status, "C75");
        assert_eq!(changes[0].previous_path.as_deref(), Some("a.yml"));
    }

    #[test]
    fn test_open_non_repository() {
        let dir = tempfile::tempdir().unwrap();
        match LocalRepository::open(dir.path()) {
            Err(AdvocateError::NotARepository { .. }) => {}
            other => panic!("expected NotARepository, got {other:?}"),
        }
    }
}
