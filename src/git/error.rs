//! Typed git-layer errors with styled display.
//!
//! `GitError` is a typed enum for domain errors that can be pattern-matched
//! and tested. Use `.into()` to convert to `anyhow::Error` while preserving
//! the type for downcasting. `Display` produces styled output for users, so
//! `main` can print the error chain directly.

use std::path::PathBuf;

use color_print::cformat;

use super::HookPhase;
use crate::styling::{error_message, hint_message};

#[derive(Debug)]
pub enum GitError {
    /// A git (or forge CLI) invocation exited non-zero.
    CommandFailed {
        command: String,
        stderr: String,
        code: Option<i32>,
    },
    /// Output from git could not be parsed.
    Parse(String),
    /// The working directory is not inside a git repository.
    NotARepository { path: PathBuf },
    /// A named branch does not exist locally or on any remote.
    BranchNotFound {
        branch: String,
        suggestion: Option<String>,
    },
    /// The branch is already checked out in another worktree.
    BranchInUse { branch: String, path: PathBuf },
    /// A configured hook command failed.
    HookFailed {
        phase: HookPhase,
        name: Option<String>,
        error: String,
        code: Option<i32>,
    },
}

impl std::fmt::Display for GitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitError::CommandFailed {
                command, stderr, ..
            } => {
                let message = error_message(cformat!("Command failed: <bold>{command}</>"));
                let stderr = stderr.trim();
                if stderr.is_empty() {
                    write!(f, "{message}")
                } else {
                    write!(f, "{message}\n{}", hint_message(stderr))
                }
            }

            GitError::Parse(message) => {
                write!(
                    f,
                    "{}",
                    error_message(format!("Unexpected git output: {message}"))
                )
            }

            GitError::NotARepository { path } => {
                write!(
                    f,
                    "{}\n{}",
                    error_message(cformat!(
                        "<bold>{}</> is not inside a git repository",
                        path.display()
                    )),
                    hint_message("Run grove from a repository, or pass -C <path>")
                )
            }

            GitError::BranchNotFound { branch, suggestion } => {
                let message = error_message(cformat!("Branch <bold>{branch}</> not found"));
                match suggestion {
                    Some(s) => write!(
                        f,
                        "{message}\n{}",
                        hint_message(cformat!("Did you mean <bright-black>{s}</>?"))
                    ),
                    None => write!(
                        f,
                        "{message}\n{}",
                        hint_message(cformat!(
                            "To create it, run <bright-black>grove checkout</> and type the new name"
                        ))
                    ),
                }
            }

            GitError::BranchInUse { branch, path } => {
                write!(
                    f,
                    "{}\n{}",
                    error_message(cformat!(
                        "Branch <bold>{branch}</> is already checked out at <bold>{}</>",
                        path.display()
                    )),
                    hint_message("Each branch can be attached to at most one worktree")
                )
            }

            GitError::HookFailed {
                phase,
                name,
                error,
                ..
            } => match name {
                Some(name) => write!(
                    f,
                    "{}",
                    error_message(cformat!("{phase} hook <bold>{name}</> failed: {error}"))
                ),
                None => write!(
                    f,
                    "{}",
                    error_message(format!("{phase} hook failed: {error}"))
                ),
            },
        }
    }
}

impl std::error::Error for GitError {}

/// Map an error chain to a process exit code.
///
/// Child-process failures propagate the child's exit code where one exists;
/// everything else is 1.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<GitError>()
        .and_then(|e| match e {
            GitError::CommandFailed { code, .. } => *code,
            GitError::HookFailed { code, .. } => *code,
            _ => None,
        })
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_display_includes_stderr() {
        let err = GitError::CommandFailed {
            command: "git fetch origin".into(),
            stderr: "fatal: could not resolve host".into(),
            code: Some(128),
        };
        let text = err.to_string();
        assert!(text.contains("git fetch origin"));
        assert!(text.contains("could not resolve host"));
    }

    #[test]
    fn branch_not_found_shows_suggestion() {
        let err = GitError::BranchNotFound {
            branch: "mian".into(),
            suggestion: Some("main".into()),
        };
        assert!(err.to_string().contains("main"));
    }

    #[test]
    fn exit_code_propagates_child_code() {
        let err: anyhow::Error = GitError::CommandFailed {
            command: "git status".into(),
            stderr: String::new(),
            code: Some(128),
        }
        .into();
        assert_eq!(exit_code(&err), 128);
    }

    #[test]
    fn exit_code_defaults_to_one() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(exit_code(&err), 1);
    }
}
