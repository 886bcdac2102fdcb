//! `grove prune`: multi-select worktrees to remove.
//!
//! The main worktree is listed but disabled so the list reads as a complete
//! inventory; locked worktrees are disabled with their lock reason. Removal
//! runs `post-remove` hooks best-effort and finishes with
//! `git worktree prune` to drop stale administrative entries.

use std::path::PathBuf;

use color_print::cformat;

use super::hook::{FailureMode, HookContext, run_hooks};
use crate::config::{ProjectConfig, UserConfig};
use crate::git::{HookPhase, Repository};
use crate::styling::{
    Theme, eprintln, hint_message, info_message, success_message, warning_message,
};
use crate::wizard::{ListStep, SelectOption, Wizard};

pub fn handle_prune(
    repo: &Repository,
    config: &UserConfig,
    theme: &Theme,
    force: bool,
) -> anyhow::Result<()> {
    let worktrees = repo.list_worktrees()?;
    if worktrees.linked().is_empty() {
        eprintln!("{}", info_message("No linked worktrees to prune"));
        return Ok(());
    }

    let main_root = worktrees.main().path.clone();
    let project = ProjectConfig::load(&main_root)?;
    let hooks = project.hooks(HookPhase::PostRemove);

    let mut options = vec![
        SelectOption::new(display_name(worktrees.main()))
            .with_description("primary worktree")
            .disabled(true),
    ];
    for wt in worktrees.linked() {
        let mut option = SelectOption::new(display_name(wt))
            .with_value(wt.path.display().to_string())
            .with_description(wt.path.display().to_string());
        if let Some(reason) = &wt.locked {
            let reason = if reason.is_empty() {
                "locked".to_string()
            } else {
                format!("locked: {reason}")
            };
            option = option.with_description(reason).disabled(true);
        }
        options.push(option);
    }

    let mut wizard = Wizard::new("prune");
    wizard.add_step(ListStep::new("worktrees", "Remove which worktrees?", options).multi_select());
    wizard.add_step(ListStep::new(
        "confirm",
        "Remove the selected worktrees?",
        super::confirm_options(),
    ));

    let confirm = config.confirm_prune;
    wizard.skip_when("confirm", move |_| !confirm);
    wizard.with_info_line(|w| {
        let count = w.list_step("worktrees").selected_indices().len();
        (count > 0).then(|| format!("{count} selected"))
    });

    let result = wizard.run(theme)?;
    if result.is_cancelled() {
        eprintln!("{}", hint_message("Cancelled"));
        return Ok(());
    }
    if config.confirm_prune && !result.get_bool("confirm") {
        eprintln!("{}", hint_message("Nothing removed"));
        return Ok(());
    }

    let mut removed = 0usize;
    for path in result.get_strings("worktrees") {
        let path = PathBuf::from(path);
        let branch = worktrees
            .worktrees
            .iter()
            .find(|wt| wt.path == path)
            .and_then(|wt| wt.branch.clone())
            .unwrap_or_default();

        if let Err(err) = repo.remove_worktree(&path, force) {
            eprintln!(
                "{}",
                warning_message(cformat!(
                    "Could not remove <bold>{}</>: {err}",
                    path.display()
                ))
            );
            continue;
        }
        removed += 1;
        eprintln!(
            "{}",
            success_message(cformat!("Removed <bold>{}</>", path.display()))
        );

        if !hooks.is_empty() {
            let ctx = HookContext {
                repo,
                branch: &branch,
                worktree_path: &path,
                // The worktree directory is gone; hooks run in the main one
                run_dir: &main_root,
            };
            run_hooks(HookPhase::PostRemove, &hooks, &ctx, FailureMode::Warn)?;
        }
    }

    repo.prune_worktrees()?;
    if removed > 0 {
        eprintln!(
            "{}",
            info_message(format!("{removed} worktree(s) removed"))
        );
    }
    Ok(())
}

/// Branch name when attached, directory name for detached worktrees.
fn display_name(wt: &crate::git::Worktree) -> String {
    wt.branch.clone().unwrap_or_else(|| wt.name())
}
