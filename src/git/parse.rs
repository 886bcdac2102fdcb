//! Git output parsing functions

use std::path::PathBuf;

use super::{GitError, Worktree};

/// Parse `git worktree list --porcelain` output.
///
/// The porcelain format is a sequence of attribute blocks separated by blank
/// lines, each starting with a `worktree <path>` line. Boolean attributes
/// (`bare`, `detached`) have no value; `locked` and `prunable` carry an
/// optional reason.
pub(crate) fn parse_worktree_list(output: &str) -> Result<Vec<Worktree>, GitError> {
    let mut worktrees = Vec::new();
    let mut current: Option<Worktree> = None;

    for line in output.lines() {
        if line.is_empty() {
            worktrees.extend(current.take());
            continue;
        }

        let (key, value) = match line.split_once(' ') {
            Some((k, v)) => (k, Some(v)),
            None => (line, None),
        };

        if key == "worktree" {
            // A new block may start without a preceding blank line
            worktrees.extend(current.take());
            let path = value
                .ok_or_else(|| GitError::Parse("worktree line missing path".into()))?;
            current = Some(Worktree {
                path: PathBuf::from(path),
                head: String::new(),
                branch: None,
                bare: false,
                detached: false,
                locked: None,
                prunable: None,
            });
            continue;
        }

        // Attributes before the first `worktree` line are ignored
        let Some(wt) = current.as_mut() else { continue };

        match key {
            "HEAD" => {
                wt.head = value
                    .ok_or_else(|| GitError::Parse("HEAD line missing SHA".into()))?
                    .to_string();
            }
            "branch" => {
                let branch_ref =
                    value.ok_or_else(|| GitError::Parse("branch line missing ref".into()))?;
                wt.branch = Some(
                    branch_ref
                        .strip_prefix("refs/heads/")
                        .unwrap_or(branch_ref)
                        .to_string(),
                );
            }
            "bare" => wt.bare = true,
            "detached" => wt.detached = true,
            "locked" => wt.locked = Some(value.unwrap_or_default().to_string()),
            "prunable" => wt.prunable = Some(value.unwrap_or_default().to_string()),
            _ => {}
        }
    }

    // Output may not end with a blank line
    worktrees.extend(current);

    Ok(worktrees)
}

/// Parse one line of `for-each-ref --format='%(refname:short)\t%(committerdate:unix)'`.
pub(crate) fn parse_ref_line(line: &str) -> Result<(String, i64), GitError> {
    let (name, timestamp) = line
        .split_once('\t')
        .ok_or_else(|| GitError::Parse(format!("malformed ref line: {line}")))?;
    let committed_at = timestamp
        .trim()
        .parse()
        .map_err(|_| GitError::Parse(format!("bad timestamp in ref line: {line}")))?;
    Ok((name.to_string(), committed_at))
}

/// Extract the default branch from `ls-remote --symref <remote> HEAD` output.
pub(crate) fn parse_symref_head(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        line.strip_prefix("ref: ")
            .and_then(|symref| symref.split_once('\t'))
            .and_then(|(ref_path, _)| ref_path.strip_prefix("refs/heads/"))
            .map(str::to_string)
    })
}
