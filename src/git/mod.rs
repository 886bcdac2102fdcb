//! Git operations and repository management

use std::path::PathBuf;

mod error;
mod parse;
mod repository;

pub use error::{GitError, exit_code};
pub use repository::Repository;

pub(crate) use parse::parse_worktree_list;

/// Hook phases grove knows how to run.
///
/// Hooks are configured per project in `.config/grove.toml`; see
/// [`crate::config::ProjectConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum HookPhase {
    /// After a worktree has been created (blocking, fail-fast)
    PostCreate,
    /// After a worktree has been removed (background-style, best-effort)
    PostRemove,
}

/// Worktree information parsed from `git worktree list --porcelain`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Worktree {
    pub path: PathBuf,
    pub head: String,
    pub branch: Option<String>,
    pub bare: bool,
    pub detached: bool,
    pub locked: Option<String>,
    pub prunable: Option<String>,
}

impl Worktree {
    /// Directory name, used as a display fallback for detached worktrees.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// A list of worktrees with bare entries filtered out.
///
/// Git guarantees that the main worktree is listed first in
/// `git worktree list` output, so index 0 is the main worktree after
/// filtering. Construction fails if no worktrees with a working tree exist.
#[derive(Debug, Clone)]
pub struct WorktreeList {
    pub worktrees: Vec<Worktree>,
}

impl WorktreeList {
    pub(crate) fn from_raw(raw: Vec<Worktree>) -> Result<Self, GitError> {
        let worktrees: Vec<_> = raw.into_iter().filter(|wt| !wt.bare).collect();
        if worktrees.is_empty() {
            return Err(GitError::Parse("no worktrees found".into()));
        }
        Ok(Self { worktrees })
    }

    /// The main worktree (index 0).
    pub fn main(&self) -> &Worktree {
        &self.worktrees[0]
    }

    /// Linked worktrees, i.e. everything except the main one.
    pub fn linked(&self) -> &[Worktree] {
        &self.worktrees[1..]
    }

    pub fn len(&self) -> usize {
        self.worktrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worktrees.is_empty()
    }

    /// Find the worktree checked out on `branch`, if any.
    pub fn for_branch(&self, branch: &str) -> Option<&Worktree> {
        self.worktrees
            .iter()
            .find(|wt| wt.branch.as_deref() == Some(branch))
    }
}

impl IntoIterator for WorktreeList {
    type Item = Worktree;
    type IntoIter = std::vec::IntoIter<Worktree>;

    fn into_iter(self) -> Self::IntoIter {
        self.worktrees.into_iter()
    }
}

/// A branch as returned by `for-each-ref`, ordered most-recent-commit first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Local name (`fix`, not `origin/fix`)
    pub name: String,
    /// Remote the branch came from; `None` for local branches
    pub remote: Option<String>,
    /// Unix timestamp of the last commit
    pub committed_at: i64,
}
