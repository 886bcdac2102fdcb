//! Hook execution pipeline.
//!
//! Hooks are plain shell command templates from the project config, expanded
//! with shell-escaped variables and run through `sh -c` in the worktree (or
//! the repo root, once a worktree is gone). `post-create` is fail-fast;
//! `post-remove` warns and keeps going.

use std::path::Path;
use std::process::Command;

use color_print::cformat;
use log::debug;

use crate::config::{HookCommand, ProjectConfig, expand_template};
use crate::git::{GitError, HookPhase, Repository};
use crate::styling::{eprintln, hint_message, progress_message, warning_message};

/// How hook failures are handled.
pub enum FailureMode {
    /// Stop at the first failure and surface it as an error.
    FailFast,
    /// Print a warning and continue with the remaining commands.
    Warn,
}

/// Everything a hook command template can reference.
pub struct HookContext<'a> {
    pub repo: &'a Repository,
    pub branch: &'a str,
    pub worktree_path: &'a Path,
    /// Directory the commands run in
    pub run_dir: &'a Path,
}

impl HookContext<'_> {
    /// Variable values for template expansion. Keys must stay in sync with
    /// [`crate::config::TEMPLATE_VARS`].
    fn variables(&self) -> Vec<(&'static str, String)> {
        let worktree_name = self
            .worktree_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        vec![
            ("repo", self.repo.name()),
            ("branch", self.branch.to_string()),
            ("worktree_name", worktree_name),
            ("repo_path", self.repo.root().display().to_string()),
            ("worktree_path", self.worktree_path.display().to_string()),
            ("default_branch", self.repo.default_branch()),
        ]
    }
}

/// Run `commands` for `phase` sequentially.
pub fn run_hooks(
    phase: HookPhase,
    commands: &[HookCommand],
    ctx: &HookContext,
    mode: FailureMode,
) -> anyhow::Result<()> {
    let variables = ctx.variables();
    let vars: Vec<(&str, &str)> = variables
        .iter()
        .map(|(key, value)| (*key, value.as_str()))
        .collect();

    for command in commands {
        let expanded = expand_template(&command.command, &vars, true)?;

        let label = super::format_command_label(&phase.to_string(), command.name.as_deref());
        eprintln!("{}", progress_message(&label));
        eprintln!("{}", hint_message(cformat!("<bright-black>{expanded}</>")));

        if let Err(error) = execute_shell(&expanded, ctx.run_dir) {
            match mode {
                FailureMode::FailFast => {
                    let code = match &error {
                        GitError::CommandFailed { code, .. } => *code,
                        _ => None,
                    };
                    return Err(GitError::HookFailed {
                        phase,
                        name: command.name.clone(),
                        error: error.to_string(),
                        code,
                    }
                    .into());
                }
                FailureMode::Warn => {
                    eprintln!(
                        "{}",
                        warning_message(cformat!(
                            "{phase} hook <bold>{}</> failed; continuing",
                            command.label()
                        ))
                    );
                }
            }
        }
    }

    Ok(())
}

/// Run one shell command in `dir`, streaming its output to the terminal.
fn execute_shell(command: &str, dir: &Path) -> Result<(), GitError> {
    debug!("$ sh -c {command:?} (in {})", dir.display());

    let status = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(dir)
        .status()
        .map_err(|e| GitError::CommandFailed {
            command: command.to_string(),
            stderr: e.to_string(),
            code: None,
        })?;

    if !status.success() {
        return Err(GitError::CommandFailed {
            command: command.to_string(),
            stderr: format!("exited with {status}"),
            code: status.code(),
        });
    }

    Ok(())
}

/// `grove hook <phase>`: run the configured hooks for the current worktree.
pub fn handle_hook(repo: &Repository, phase: HookPhase) -> anyhow::Result<()> {
    let worktrees = repo.list_worktrees()?;
    let main_root = worktrees.main().path.clone();
    let project = ProjectConfig::load(&main_root)?;
    let commands = project.hooks(phase);

    if commands.is_empty() {
        eprintln!(
            "{}",
            crate::styling::info_message(format!("No {phase} hooks configured"))
        );
        return Ok(());
    }

    // The branch of the worktree we are running in; empty when detached
    let branch = repo.current_branch().unwrap_or_default();

    let ctx = HookContext {
        repo,
        branch: &branch,
        worktree_path: repo.root(),
        run_dir: repo.root(),
    };
    let mode = match phase {
        HookPhase::PostCreate => FailureMode::FailFast,
        HookPhase::PostRemove => FailureMode::Warn,
    };
    run_hooks(phase, &commands, &ctx, mode)
}
