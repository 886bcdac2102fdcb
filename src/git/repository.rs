//! Repository context for git operations.
//!
//! All git access goes through [`Repository`], which shells out to `git -C
//! <root> …` and parses the output. Values that cannot change during a
//! process run (common dir, default branch, remotes) are cached after the
//! first lookup to avoid repeated command spawns.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use once_cell::sync::OnceCell;

use super::parse::{parse_ref_line, parse_symref_head};
use super::{Branch, GitError, WorktreeList, parse_worktree_list};

/// Cached values for expensive git queries.
#[derive(Debug, Default)]
struct RepoCache {
    git_common_dir: OnceCell<PathBuf>,
    default_branch: OnceCell<String>,
    remotes: OnceCell<Vec<String>>,
}

#[derive(Debug)]
pub struct Repository {
    root: PathBuf,
    cache: RepoCache,
}

impl Repository {
    /// Resolve the repository containing `base`.
    pub fn discover(base: &Path) -> Result<Self, GitError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(base)
            .args(["rev-parse", "--show-toplevel"])
            .output()
            .map_err(|e| GitError::CommandFailed {
                command: "git rev-parse --show-toplevel".into(),
                stderr: e.to_string(),
                code: None,
            })?;

        if !output.status.success() {
            return Err(GitError::NotARepository {
                path: base.to_path_buf(),
            });
        }

        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Self::at(PathBuf::from(root)))
    }

    /// Use `path` as the repository root without validation.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            root: path.into(),
            cache: RepoCache::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Repository directory name, used in worktree path templates.
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    /// Run git with `args` in the repository root, returning trimmed stdout.
    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        run_git_in(&self.root, args)
    }

    /// Like [`Self::run`] but ignores the exit status, for probe commands.
    fn probe(&self, args: &[&str]) -> bool {
        let ok = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        debug!("$ git {} -> {}", args.join(" "), ok);
        ok
    }

    pub fn list_worktrees(&self) -> Result<WorktreeList, GitError> {
        let output = self.run(&["worktree", "list", "--porcelain"])?;
        WorktreeList::from_raw(parse_worktree_list(&output)?)
    }

    /// Local branches, most recently committed first.
    pub fn local_branches(&self) -> Result<Vec<Branch>, GitError> {
        let output = self.run(&[
            "for-each-ref",
            "--sort=-committerdate",
            "--format=%(refname:short)\t%(committerdate:unix)",
            "refs/heads",
        ])?;

        output
            .lines()
            .filter(|l| !l.is_empty())
            .map(|line| {
                let (name, committed_at) = parse_ref_line(line)?;
                Ok(Branch {
                    name,
                    remote: None,
                    committed_at,
                })
            })
            .collect()
    }

    /// Remote-tracking branches, most recently committed first.
    ///
    /// Names are local (`fix`, not `origin/fix`); symbolic `HEAD` entries are
    /// skipped.
    pub fn remote_branches(&self) -> Result<Vec<Branch>, GitError> {
        let output = self.run(&[
            "for-each-ref",
            "--sort=-committerdate",
            "--format=%(refname:short)\t%(committerdate:unix)",
            "refs/remotes",
        ])?;

        let mut branches = Vec::new();
        for line in output.lines().filter(|l| !l.is_empty()) {
            let (full, committed_at) = parse_ref_line(line)?;
            let Some((remote, name)) = full.split_once('/') else {
                continue;
            };
            if name == "HEAD" {
                continue;
            }
            branches.push(Branch {
                name: name.to_string(),
                remote: Some(remote.to_string()),
                committed_at,
            });
        }
        Ok(branches)
    }

    /// The default branch, resolved once per process.
    ///
    /// Resolution order: local `origin/HEAD` symref, then a symref query
    /// against the remote, then a local `main`/`master`, then `"main"`.
    pub fn default_branch(&self) -> String {
        self.cache
            .default_branch
            .get_or_init(|| {
                if let Ok(symref) = self.run(&["symbolic-ref", "--short", "refs/remotes/origin/HEAD"])
                {
                    if let Some((_, branch)) = symref.split_once('/') {
                        return branch.to_string();
                    }
                }
                if let Ok(output) = self.run(&["ls-remote", "--symref", "origin", "HEAD"])
                    && let Some(branch) = parse_symref_head(&output)
                {
                    return branch;
                }
                for candidate in ["main", "master"] {
                    if self.has_local_branch(candidate) {
                        return candidate.to_string();
                    }
                }
                "main".to_string()
            })
            .clone()
    }

    /// Configured remotes, cached.
    pub fn remotes(&self) -> &[String] {
        self.cache
            .remotes
            .get_or_init(|| {
                self.run(&["remote"])
                    .map(|out| out.lines().map(str::to_string).collect())
                    .unwrap_or_default()
            })
            .as_slice()
    }

    /// The primary remote (`origin` when present, else the first configured).
    pub fn primary_remote(&self) -> Option<&str> {
        let remotes = self.remotes();
        remotes
            .iter()
            .find(|r| *r == "origin")
            .or_else(|| remotes.first())
            .map(String::as_str)
    }

    pub fn fetch(&self, remote: &str) -> Result<(), GitError> {
        self.run(&["fetch", "--quiet", remote]).map(|_| ())
    }

    /// Fetch a specific refspec, e.g. a PR head ref.
    pub fn fetch_ref(&self, remote: &str, refspec: &str) -> Result<(), GitError> {
        self.run(&["fetch", "--quiet", remote, refspec]).map(|_| ())
    }

    /// The branch checked out in the repository root; `None` when detached.
    pub fn current_branch(&self) -> Option<String> {
        self.run(&["symbolic-ref", "--short", "-q", "HEAD"])
            .ok()
            .filter(|branch| !branch.is_empty())
    }

    pub fn has_local_branch(&self, branch: &str) -> bool {
        self.probe(&[
            "rev-parse",
            "--verify",
            "--quiet",
            &format!("refs/heads/{branch}"),
        ])
    }

    /// The remote that has `branch`, if any.
    pub fn remote_with_branch(&self, branch: &str) -> Option<String> {
        self.remotes()
            .iter()
            .find(|remote| {
                self.probe(&[
                    "rev-parse",
                    "--verify",
                    "--quiet",
                    &format!("refs/remotes/{remote}/{branch}"),
                ])
            })
            .cloned()
    }

    /// Create a worktree at `path` for `branch`.
    ///
    /// With `create_from`, a new branch is created off that start point;
    /// otherwise the existing branch is checked out.
    pub fn add_worktree(
        &self,
        path: &Path,
        branch: &str,
        create_from: Option<&str>,
    ) -> Result<(), GitError> {
        let path_str = path.to_string_lossy();
        match create_from {
            Some(base) => self
                .run(&["worktree", "add", "-b", branch, &*path_str, base])
                .map(|_| ()),
            None => self
                .run(&["worktree", "add", &*path_str, branch])
                .map(|_| ()),
        }
    }

    pub fn remove_worktree(&self, path: &Path, force: bool) -> Result<(), GitError> {
        let path_str = path.to_string_lossy();
        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(&*path_str);
        self.run(&args).map(|_| ())
    }

    /// Drop stale administrative entries for manually deleted worktrees.
    pub fn prune_worktrees(&self) -> Result<(), GitError> {
        self.run(&["worktree", "prune"]).map(|_| ())
    }

    /// The shared `.git` directory (common to all worktrees).
    pub fn git_common_dir(&self) -> Result<&Path, GitError> {
        self.cache
            .git_common_dir
            .get_or_try_init(|| {
                let dir = self.run(&["rev-parse", "--git-common-dir"])?;
                let dir = PathBuf::from(dir);
                // rev-parse may print a path relative to the repo root
                Ok(if dir.is_absolute() {
                    dir
                } else {
                    self.root.join(dir)
                })
            })
            .map(PathBuf::as_path)
    }

    /// URL of the primary remote, if configured.
    pub fn origin_url(&self) -> Option<String> {
        let remote = self.primary_remote()?.to_string();
        self.run(&["remote", "get-url", &remote]).ok()
    }

    /// Unix timestamp of the HEAD commit in `worktree_path`.
    pub fn head_commit_time(&self, worktree_path: &Path) -> Option<i64> {
        run_git_in(worktree_path, &["log", "-1", "--format=%ct"])
            .ok()?
            .trim()
            .parse()
            .ok()
    }
}

/// Run git with `args` in `dir`, returning trimmed stdout.
fn run_git_in(dir: &Path, args: &[&str]) -> Result<String, GitError> {
    debug!("$ git -C {} {}", dir.display(), args.join(" "));

    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .map_err(|e| GitError::CommandFailed {
            command: format!("git {}", args.join(" ")),
            stderr: e.to_string(),
            code: None,
        })?;

    if !output.status.success() {
        return Err(GitError::CommandFailed {
            command: format!("git {}", args.join(" ")),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            code: output.status.code(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
