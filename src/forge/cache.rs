//! JSON cache for PR listings.
//!
//! Forge CLI calls take a second or two; the wizard wants to open instantly
//! on repeat runs. Listings are cached under the shared git directory
//! (`<git-common-dir>/grove/pr-cache.json`) so every worktree of a repo sees
//! the same cache. Cache read/write failures degrade to a live fetch and are
//! never surfaced as errors.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{ForgeKind, PullRequest, list_pull_requests};
use crate::git::Repository;

#[derive(Debug, Serialize, Deserialize)]
struct PrCacheFile {
    fetched_at: DateTime<Utc>,
    forge: ForgeKind,
    pull_requests: Vec<PullRequest>,
}

/// A PR listing plus where it came from.
#[derive(Debug)]
pub struct CachedPulls {
    pub pull_requests: Vec<PullRequest>,
    /// Time since the listing was fetched from the forge.
    pub age: TimeDelta,
    pub from_cache: bool,
}

/// Cache file location for `repo`.
pub fn pr_cache_path(repo: &Repository) -> anyhow::Result<PathBuf> {
    Ok(repo.git_common_dir()?.join("grove").join("pr-cache.json"))
}

/// Return the PR listing, from cache when fresh enough.
///
/// `refresh` forces a live fetch. A fetch also rewrites the cache file.
pub fn fetch_pull_requests(
    repo: &Repository,
    kind: ForgeKind,
    ttl_minutes: u64,
    refresh: bool,
) -> anyhow::Result<CachedPulls> {
    let path = pr_cache_path(repo)?;
    let ttl = TimeDelta::minutes(ttl_minutes as i64);

    if !refresh
        && let Some(cached) = load_cache(&path)
        // A remote switched to another forge invalidates the cache
        && cached.forge == kind
    {
        let age = Utc::now() - cached.fetched_at;
        if age <= ttl {
            return Ok(CachedPulls {
                pull_requests: cached.pull_requests,
                age,
                from_cache: true,
            });
        }
    }

    debug!("refreshing {kind} listing");
    let pull_requests = list_pull_requests(kind, repo.root())?;
    store_cache(
        &path,
        &PrCacheFile {
            fetched_at: Utc::now(),
            forge: kind,
            pull_requests: pull_requests.clone(),
        },
    );

    Ok(CachedPulls {
        pull_requests,
        age: TimeDelta::zero(),
        from_cache: false,
    })
}

fn load_cache(path: &Path) -> Option<PrCacheFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(cache) => Some(cache),
        Err(e) => {
            debug!("ignoring unreadable PR cache at {}: {e}", path.display());
            None
        }
    }
}

fn store_cache(path: &Path, cache: &PrCacheFile) {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(cache)?;
        std::fs::write(path, json)
    };
    if let Err(e) = write() {
        debug!("failed to write PR cache at {}: {e}", path.display());
    }
}

/// Human-readable cache age, coarse ("3m", "2h", "just fetched").
pub(crate) fn format_age(age: TimeDelta) -> String {
    let secs = age.num_seconds().max(0) as u64;
    if secs < 10 {
        return "just fetched".to_string();
    }
    // humantime prints every unit; truncate to the largest one for display
    let coarse = if secs >= 3600 {
        secs - secs % 3600
    } else if secs >= 60 {
        secs - secs % 60
    } else {
        secs
    };
    format!(
        "{} old",
        humantime::format_duration(std::time::Duration::from_secs(coarse))
    )
}
