//! Forge (GitHub/GitLab) integration.
//!
//! Grove never speaks HTTP itself; it shells out to the forge's own CLI
//! (`gh` or `glab`) and parses the JSON those tools emit. The forge is
//! detected from the primary remote URL.

mod cache;

pub use cache::{CachedPulls, fetch_pull_requests, pr_cache_path};
pub(crate) use cache::format_age;

use std::path::Path;
use std::process::Command;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::git::GitError;

/// Which forge the repository's primary remote points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ForgeKind {
    GitHub,
    GitLab,
}

impl ForgeKind {
    /// Detect the forge from a remote URL.
    ///
    /// Matches both SSH (`git@github.com:u/r.git`) and HTTPS forms.
    /// Self-hosted GitLab instances commonly keep `gitlab` in the host name,
    /// which is the best signal available without network access.
    pub fn detect(remote_url: &str) -> Option<Self> {
        if remote_url.contains("github.com") {
            Some(ForgeKind::GitHub)
        } else if remote_url.contains("gitlab") {
            Some(ForgeKind::GitLab)
        } else {
            None
        }
    }

    /// The CLI binary for this forge.
    pub fn cli(self) -> &'static str {
        match self {
            ForgeKind::GitHub => "gh",
            ForgeKind::GitLab => "glab",
        }
    }

    /// Short name for the forge's change requests ("PR" / "MR").
    pub fn ref_word(self) -> &'static str {
        match self {
            ForgeKind::GitHub => "PR",
            ForgeKind::GitLab => "MR",
        }
    }

    /// Number prefix symbol ("#" for PRs, "!" for MRs).
    pub fn ref_symbol(self) -> &'static str {
        match self {
            ForgeKind::GitHub => "#",
            ForgeKind::GitLab => "!",
        }
    }
}

/// An open pull/merge request, normalized across forges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub author: String,
    /// Source branch name
    pub head_ref: String,
    pub draft: bool,
    pub url: String,
}

/// List open PRs/MRs by invoking the forge CLI in `repo_root`.
pub fn list_pull_requests(kind: ForgeKind, repo_root: &Path) -> Result<Vec<PullRequest>, GitError> {
    let args: &[&str] = match kind {
        ForgeKind::GitHub => &[
            "pr",
            "list",
            "--json",
            "number,title,author,headRefName,isDraft,url",
            "--limit",
            "100",
        ],
        ForgeKind::GitLab => &["mr", "list", "--output", "json"],
    };

    debug!("$ {} {}", kind.cli(), args.join(" "));

    let output = Command::new(kind.cli())
        .args(args)
        .current_dir(repo_root)
        .output()
        .map_err(|e| GitError::CommandFailed {
            command: format!("{} {}", kind.cli(), args.join(" ")),
            stderr: e.to_string(),
            code: None,
        })?;

    if !output.status.success() {
        return Err(GitError::CommandFailed {
            command: format!("{} {}", kind.cli(), args.join(" ")),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            code: output.status.code(),
        });
    }

    parse_pull_requests(kind, &String::from_utf8_lossy(&output.stdout))
}

/// Parse the forge CLI's JSON into normalized [`PullRequest`]s.
fn parse_pull_requests(kind: ForgeKind, json: &str) -> Result<Vec<PullRequest>, GitError> {
    let items: Vec<serde_json::Value> = serde_json::from_str(json)
        .map_err(|e| GitError::Parse(format!("{} returned invalid JSON: {e}", kind.cli())))?;

    items
        .iter()
        .map(|item| match kind {
            ForgeKind::GitHub => parse_gh_item(item),
            ForgeKind::GitLab => parse_glab_item(item),
        })
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
            GitError::Parse(format!(
                "{} output is missing expected fields",
                kind.cli()
            ))
        })
}

fn parse_gh_item(item: &serde_json::Value) -> Option<PullRequest> {
    Some(PullRequest {
        number: item.get("number")?.as_u64()?,
        title: item.get("title")?.as_str()?.to_string(),
        author: item
            .get("author")
            .and_then(|a| a.get("login"))
            .and_then(|l| l.as_str())
            .unwrap_or("unknown")
            .to_string(),
        head_ref: item.get("headRefName")?.as_str()?.to_string(),
        draft: item
            .get("isDraft")
            .and_then(|d| d.as_bool())
            .unwrap_or(false),
        url: item
            .get("url")
            .and_then(|u| u.as_str())
            .unwrap_or_default()
            .to_string(),
    })
}

fn parse_glab_item(item: &serde_json::Value) -> Option<PullRequest> {
    Some(PullRequest {
        number: item.get("iid")?.as_u64()?,
        title: item.get("title")?.as_str()?.to_string(),
        author: item
            .get("author")
            .and_then(|a| a.get("username"))
            .and_then(|u| u.as_str())
            .unwrap_or("unknown")
            .to_string(),
        head_ref: item.get("source_branch")?.as_str()?.to_string(),
        draft: item
            .get("draft")
            .or_else(|| item.get("work_in_progress"))
            .and_then(|d| d.as_bool())
            .unwrap_or(false),
        url: item
            .get("web_url")
            .and_then(|u| u.as_str())
            .unwrap_or_default()
            .to_string(),
    })
}
