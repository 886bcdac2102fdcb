//! `grove checkout`: pick or create a branch and attach a worktree to it.
//!
//! Interactive flow: fetch? → pick/create branch → base branch (only when
//! creating) → pick hooks (only when configured). Answering the fetch step
//! refetches and repopulates the branch list; the base step is skipped
//! unless the branch step resolved to a create-from-filter entry.

use std::collections::HashSet;

use anyhow::bail;
use color_print::cformat;
use log::warn;

use super::hook::{FailureMode, HookContext, run_hooks};
use crate::config::{HookCommand, ProjectConfig, UserConfig};
use crate::git::{GitError, HookPhase, Repository};
use crate::styling::{Theme, eprintln, hint_message, success_message};
use crate::wizard::{ListStep, SelectOption, Wizard};

pub struct CheckoutOptions<'a> {
    /// Non-interactive: check out this branch directly.
    pub branch: Option<&'a str>,
    /// Base for a newly created branch (defaults to the default branch).
    pub base: Option<&'a str>,
    /// Skip post-create hooks.
    pub no_hooks: bool,
}

pub fn handle_checkout(
    repo: &Repository,
    config: &UserConfig,
    theme: &Theme,
    opts: CheckoutOptions,
) -> anyhow::Result<()> {
    let worktrees = repo.list_worktrees()?;
    let project = ProjectConfig::load(&worktrees.main().path)?;
    let hooks = project.hooks(HookPhase::PostCreate);

    if let Some(branch) = opts.branch {
        return checkout_named(repo, config, branch, opts.base, &hooks, opts.no_hooks);
    }

    // An empty or all-disabled list is still usable here: the branch step's
    // create-from-filter entry always offers a way out.
    let options = branch_options(repo)?;

    let mut wizard = Wizard::new("checkout");

    wizard.add_step(ListStep::new(
        "fetch",
        "Fetch from the remote first?",
        super::confirm_options(),
    ));
    wizard.add_step(
        ListStep::new("branch", "Check out which branch?", options)
            .fuzzy()
            .with_create_label(|filter| format!("create branch \"{filter}\""))
            .with_char_filter(|c| !c.is_whitespace()),
    );
    wizard.add_step(ListStep::new(
        "base",
        "Base the new branch on",
        base_options(repo)?,
    ));
    wizard.add_step(hook_step(&hooks));

    let has_remote = repo.primary_remote().is_some();
    wizard.skip_when("fetch", move |_| !has_remote);
    wizard.skip_when("base", |w| !w.list_step("branch").is_create_selected());
    let no_hooks = opts.no_hooks || hooks.is_empty();
    wizard.skip_when("hooks", move |_| no_hooks);

    // Fetching refreshes the branch list before the user picks from it.
    // This blocks the UI for the duration of the fetch, which is fine for a
    // short-lived CLI.
    let fetch_repo = Repository::at(repo.root().to_path_buf());
    let remote = repo.primary_remote().unwrap_or("origin").to_string();
    wizard.on_complete("fetch", move |w| {
        if !w.value_of("fetch").raw.as_bool().unwrap_or(false) {
            return;
        }
        if let Err(err) = fetch_repo.fetch(&remote) {
            warn!("fetch failed: {err}");
            return;
        }
        match branch_options(&fetch_repo) {
            Ok(options) => w.list_step_mut("branch").set_options(options),
            Err(err) => warn!("could not refresh branches: {err}"),
        }
    });

    wizard.with_info_line(|w| {
        if w.current_step_id() != "branch" {
            return None;
        }
        let step = w.list_step("branch");
        if step.is_create_selected() {
            Some(format!("will create \"{}\"", step.filter_text()))
        } else {
            None
        }
    });

    let result = wizard.run(theme)?;
    if result.is_cancelled() {
        eprintln!("{}", hint_message("Cancelled"));
        return Ok(());
    }

    let branch = result.get_string("branch");
    let creating = wizard.list_step("branch").is_create_selected();
    let base = if creating {
        let base = result.get_string("base");
        Some(if base.is_empty() {
            repo.default_branch()
        } else {
            base
        })
    } else if repo.has_local_branch(&branch) {
        None
    } else {
        // A remote-only branch still needs a local one created off it
        repo.remote_with_branch(&branch)
            .map(|remote| format!("{remote}/{branch}"))
    };

    let selected_hooks = selected_hooks(&hooks, &result.get_value("hooks"));
    create_worktree(repo, config, &branch, base.as_deref(), &selected_hooks)
}

/// Non-interactive `grove checkout <branch>`.
fn checkout_named(
    repo: &Repository,
    config: &UserConfig,
    branch: &str,
    base: Option<&str>,
    hooks: &[HookCommand],
    no_hooks: bool,
) -> anyhow::Result<()> {
    let worktrees = repo.list_worktrees()?;
    if let Some(existing) = worktrees.for_branch(branch) {
        return Err(GitError::BranchInUse {
            branch: branch.to_string(),
            path: existing.path.clone(),
        }
        .into());
    }

    let create_from = if repo.has_local_branch(branch) {
        if base.is_some() {
            warn!("--base ignored: branch {branch} already exists");
        }
        None
    } else if let Some(remote) = repo.remote_with_branch(branch) {
        Some(base.map(str::to_string).unwrap_or(format!("{remote}/{branch}")))
    } else if base.is_some() {
        // Creating a brand-new branch off an explicit base
        base.map(str::to_string)
    } else {
        return Err(GitError::BranchNotFound {
            branch: branch.to_string(),
            suggestion: suggest_branch(repo, branch),
        }
        .into());
    };

    let hooks = if no_hooks { &[] } else { hooks };
    create_worktree(repo, config, branch, create_from.as_deref(), hooks)
}

fn create_worktree(
    repo: &Repository,
    config: &UserConfig,
    branch: &str,
    create_from: Option<&str>,
    hooks: &[HookCommand],
) -> anyhow::Result<()> {
    let path = config.worktree_path_for(repo.root(), &repo.name(), branch)?;
    if path.exists() {
        bail!("path {} already exists", path.display());
    }

    repo.add_worktree(&path, branch, create_from)?;
    eprintln!(
        "{}",
        success_message(cformat!(
            "Created worktree for <bold>{branch}</> at <bold>{}</>",
            path.display()
        ))
    );

    if !hooks.is_empty() {
        let ctx = HookContext {
            repo,
            branch,
            worktree_path: &path,
            run_dir: &path,
        };
        run_hooks(HookPhase::PostCreate, hooks, &ctx, FailureMode::FailFast)?;
    }

    eprintln!(
        "{}",
        hint_message(cformat!("<bright-black>cd {}</>", path.display()))
    );
    Ok(())
}

/// All branches as wizard options: locals first (disabled when already
/// attached to a worktree), then remote-only branches.
fn branch_options(repo: &Repository) -> anyhow::Result<Vec<SelectOption>> {
    let worktrees = repo.list_worktrees()?;
    let mut seen = HashSet::new();
    let mut options = Vec::new();

    for branch in repo.local_branches()? {
        seen.insert(branch.name.clone());
        let option = match worktrees.for_branch(&branch.name) {
            Some(wt) => SelectOption::new(branch.name.clone())
                .with_description(format!("checked out at {}", wt.name()))
                .disabled(true),
            None => SelectOption::new(branch.name.clone()),
        };
        options.push(option);
    }

    for branch in repo.remote_branches()? {
        if seen.insert(branch.name.clone()) {
            let remote = branch.remote.unwrap_or_default();
            options.push(SelectOption::new(branch.name.clone()).with_description(remote));
        }
    }

    Ok(options)
}

/// Local branches for the base step, default branch first.
fn base_options(repo: &Repository) -> anyhow::Result<Vec<SelectOption>> {
    let default = repo.default_branch();
    let mut options = vec![SelectOption::new(default.clone()).with_description("default branch")];
    for branch in repo.local_branches()? {
        if branch.name != default {
            options.push(SelectOption::new(branch.name));
        }
    }
    Ok(options)
}

/// Multi-select over configured post-create hooks, all preselected, none
/// required (`min` explicitly 0).
fn hook_step(hooks: &[HookCommand]) -> ListStep {
    let options = hooks
        .iter()
        .enumerate()
        .map(|(index, hook)| {
            let option = SelectOption::new(hook.label()).with_value(index as u64);
            match &hook.name {
                // Named hooks show the command line as secondary text
                Some(_) => option.with_description(hook.command.clone()),
                None => option,
            }
        })
        .collect();

    let mut step = ListStep::new("hooks", "Run which post-create hooks?", options)
        .multi_select()
        .with_min_max(0, 0);
    let all: Vec<usize> = (0..hooks.len()).collect();
    step.set_selected(&all);
    step
}

/// Map the hook step's answer (option indices) back to commands. A `Null`
/// answer means the step was skipped: run nothing.
fn selected_hooks(hooks: &[HookCommand], raw: &serde_json::Value) -> Vec<HookCommand> {
    let Some(indices) = raw.as_array() else {
        return Vec::new();
    };
    indices
        .iter()
        .filter_map(|v| v.as_u64())
        .filter_map(|i| hooks.get(i as usize).cloned())
        .collect()
}

/// Closest existing branch name, for "did you mean" hints.
fn suggest_branch(repo: &Repository, wanted: &str) -> Option<String> {
    let mut names: Vec<String> = repo
        .local_branches()
        .ok()?
        .into_iter()
        .map(|b| b.name)
        .collect();
    names.extend(
        repo.remote_branches()
            .ok()?
            .into_iter()
            .map(|b| b.name),
    );

    names
        .into_iter()
        .map(|name| {
            let score = strsim::jaro_winkler(wanted, &name);
            (name, score)
        })
        .filter(|(_, score)| *score > 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::Step;

    fn hook(name: Option<&str>, command: &str) -> HookCommand {
        HookCommand {
            name: name.map(String::from),
            command: command.to_string(),
        }
    }

    #[test]
    fn selected_hooks_maps_indices() {
        let hooks = vec![hook(Some("a"), "echo a"), hook(Some("b"), "echo b")];
        let raw = serde_json::json!([1]);
        let selected = selected_hooks(&hooks, &raw);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].command, "echo b");
    }

    #[test]
    fn selected_hooks_null_means_none() {
        let hooks = vec![hook(None, "echo a")];
        assert!(selected_hooks(&hooks, &serde_json::Value::Null).is_empty());
    }

    #[test]
    fn selected_hooks_ignores_out_of_range() {
        let hooks = vec![hook(None, "echo a")];
        let raw = serde_json::json!([0, 9]);
        assert_eq!(selected_hooks(&hooks, &raw).len(), 1);
    }

    #[test]
    fn hook_step_preselects_everything() {
        let hooks = vec![hook(Some("install"), "npm install"), hook(None, "make")];
        let step = hook_step(&hooks);
        assert!(step.is_complete());
        assert_eq!(step.selected_indices(), vec![0, 1]);
    }
}
