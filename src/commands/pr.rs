//! `grove pr`: check out a pull/merge request as a worktree.
//!
//! The PR listing comes from the forge CLI through the JSON cache; the info
//! line shows how stale the listing is. Draft PRs are listed but disabled.

use anyhow::bail;
use color_print::cformat;

use super::hook::{FailureMode, HookContext, run_hooks};
use crate::config::{ProjectConfig, UserConfig};
use crate::forge::{ForgeKind, PullRequest, fetch_pull_requests, format_age};
use crate::git::{HookPhase, Repository};
use crate::styling::{Theme, eprintln, hint_message, info_message, success_message};
use crate::wizard::{ListStep, SelectOption, Wizard};

pub fn handle_pr(
    repo: &Repository,
    config: &UserConfig,
    theme: &Theme,
    number: Option<u64>,
    refresh: bool,
) -> anyhow::Result<()> {
    let Some(url) = repo.origin_url() else {
        bail!("no remote configured; grove pr needs a GitHub or GitLab remote");
    };
    let Some(kind) = ForgeKind::detect(&url) else {
        bail!("could not detect a forge from remote {url}");
    };

    let cached = fetch_pull_requests(repo, kind, config.forge.cache_ttl_minutes, refresh)?;
    let pulls = cached.pull_requests;

    if let Some(number) = number {
        let Some(pull) = pulls.iter().find(|pr| pr.number == number) else {
            bail!("no open {} {}{number}", kind.ref_word(), kind.ref_symbol());
        };
        return checkout_pull(repo, config, kind, pull);
    }

    if pulls.is_empty() {
        eprintln!(
            "{}",
            info_message(format!("No open {}s", kind.ref_word()))
        );
        return Ok(());
    }

    let options = pulls
        .iter()
        .map(|pr| {
            let label = format!("{}{} {}", kind.ref_symbol(), pr.number, pr.title);
            let mut option = SelectOption::new(label)
                .with_value(pr.number)
                .with_description(pr.author.clone());
            if pr.draft {
                option = option.with_description("draft").disabled(true);
            }
            option
        })
        .collect();

    let mut wizard = Wizard::new("pr");
    let symbol = kind.ref_symbol();
    wizard.add_step(
        ListStep::new("pr", format!("Check out which {}?", kind.ref_word()), options)
            .fuzzy()
            .with_value_label(move |option| {
                format!("{symbol}{}", option.value().as_u64().unwrap_or(0))
            }),
    );

    let age = if cached.from_cache {
        format!("listing {}; --refresh to refetch", format_age(cached.age))
    } else {
        format!("fetched just now from {}", kind.cli())
    };
    wizard.with_info_line(move |_| Some(age.clone()));

    let result = wizard.run(theme)?;
    if result.is_cancelled() {
        eprintln!("{}", hint_message("Cancelled"));
        return Ok(());
    }

    let picked = result.get_value("pr").as_u64().unwrap_or(0);
    let pull = pulls
        .iter()
        .find(|pr| pr.number == picked)
        .expect("picked PR came from this listing");
    checkout_pull(repo, config, kind, pull)
}

fn checkout_pull(
    repo: &Repository,
    config: &UserConfig,
    kind: ForgeKind,
    pull: &PullRequest,
) -> anyhow::Result<()> {
    let branch = &pull.head_ref;

    let worktrees = repo.list_worktrees()?;
    if let Some(existing) = worktrees.for_branch(branch) {
        eprintln!(
            "{}",
            info_message(cformat!(
                "{} {}{} is already checked out at <bold>{}</>",
                kind.ref_word(),
                kind.ref_symbol(),
                pull.number,
                existing.path.display()
            ))
        );
        return Ok(());
    }

    if !repo.has_local_branch(branch) {
        // The forge exposes PR heads as hidden refs, which also covers PRs
        // from forks where the source branch is not on the remote
        let refspec = match kind {
            ForgeKind::GitHub => format!("pull/{}/head:{branch}", pull.number),
            ForgeKind::GitLab => format!("merge-requests/{}/head:{branch}", pull.number),
        };
        let remote = repo.primary_remote().unwrap_or("origin").to_string();
        repo.fetch_ref(&remote, &refspec)?;
    }

    let path = config.worktree_path_for(repo.root(), &repo.name(), branch)?;
    if path.exists() {
        bail!("path {} already exists", path.display());
    }
    repo.add_worktree(&path, branch, None)?;
    eprintln!(
        "{}",
        success_message(cformat!(
            "Created worktree for {} {}{} (<bold>{branch}</>) at <bold>{}</>",
            kind.ref_word(),
            kind.ref_symbol(),
            pull.number,
            path.display()
        ))
    );

    let project = ProjectConfig::load(&worktrees.main().path)?;
    let hooks = project.hooks(HookPhase::PostCreate);
    if !hooks.is_empty() {
        let ctx = HookContext {
            repo,
            branch,
            worktree_path: &path,
            run_dir: &path,
        };
        run_hooks(HookPhase::PostCreate, &hooks, &ctx, FailureMode::FailFast)?;
    }

    eprintln!(
        "{}",
        hint_message(cformat!("<bright-black>cd {}</>", path.display()))
    );
    Ok(())
}
