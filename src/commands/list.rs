//! `grove list`: aligned worktree table, or JSON for scripts.

use anstyle::Style;
use unicode_width::UnicodeWidthStr;

use crate::git::{Repository, Worktree, WorktreeList};
use crate::styling::{StyledLine, println, terminal_width, truncate_to_width};

/// Short SHA length for the HEAD column
const SHORT_SHA: usize = 8;

pub fn handle_list(repo: &Repository, json: bool) -> anyhow::Result<()> {
    let worktrees = repo.list_worktrees()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&worktrees.worktrees)?);
        return Ok(());
    }

    for line in render_table(repo, &worktrees, terminal_width()) {
        println!("{}", line.render());
    }
    Ok(())
}

fn render_table(repo: &Repository, worktrees: &WorktreeList, width: usize) -> Vec<StyledLine> {
    let dim = Style::new().dimmed();
    let rows: Vec<[String; 5]> = worktrees
        .worktrees
        .iter()
        .map(|wt| {
            [
                branch_cell(wt),
                truncate_to_width(&wt.path.display().to_string(), width.saturating_sub(40).max(20)),
                wt.head.chars().take(SHORT_SHA).collect(),
                age_cell(repo, wt),
                note_cell(wt),
            ]
        })
        .collect();

    let headers = ["BRANCH", "PATH", "HEAD", "AGE", "NOTE"];
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .map(|row| row[col].width())
                .chain(std::iter::once(header.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);

    let mut header = StyledLine::new();
    for (col, title) in headers.iter().enumerate() {
        header.push_styled(*title, dim);
        header.pad_to(padded_width(&widths, col));
    }
    lines.push(header);

    for (row, wt) in rows.iter().zip(&worktrees.worktrees) {
        let mut line = StyledLine::new();
        for (col, cell) in row.iter().enumerate() {
            // The main worktree's branch stands out
            if col == 0 && wt.path == worktrees.main().path {
                line.push_styled(cell.clone(), Style::new().bold());
            } else {
                line.push_raw(cell.clone());
            }
            line.push_raw("  ");
            line.pad_to(padded_width(&widths, col));
        }
        lines.push(line);
    }

    lines
}

/// Cumulative column offset including two-space gutters.
fn padded_width(widths: &[usize], col: usize) -> usize {
    widths[..=col].iter().map(|w| w + 2).sum()
}

fn branch_cell(wt: &Worktree) -> String {
    match &wt.branch {
        Some(branch) => branch.clone(),
        None => format!("({})", if wt.detached { "detached" } else { "no branch" }),
    }
}

fn age_cell(repo: &Repository, wt: &Worktree) -> String {
    let Some(committed_at) = repo.head_commit_time(&wt.path) else {
        return "-".to_string();
    };
    let now = chrono::Utc::now().timestamp();
    coarse_age((now - committed_at).max(0) as u64)
}

fn note_cell(wt: &Worktree) -> String {
    let mut notes = Vec::new();
    if wt.locked.is_some() {
        notes.push("locked");
    }
    if wt.prunable.is_some() {
        notes.push("prunable");
    }
    notes.join(", ")
}

/// "3m", "2h", "5d" — the largest whole unit only.
fn coarse_age(secs: u64) -> String {
    let truncated = if secs >= 86_400 {
        secs - secs % 86_400
    } else if secs >= 3_600 {
        secs - secs % 3_600
    } else if secs >= 60 {
        secs - secs % 60
    } else {
        return "now".to_string();
    };
    humantime::format_duration(std::time::Duration::from_secs(truncated)).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn wt(path: &str, branch: Option<&str>) -> Worktree {
        Worktree {
            path: PathBuf::from(path),
            head: "0123456789abcdef".into(),
            branch: branch.map(String::from),
            bare: false,
            detached: branch.is_none(),
            locked: None,
            prunable: None,
        }
    }

    #[test]
    fn branch_cell_handles_detached() {
        assert_eq!(branch_cell(&wt("/r", Some("main"))), "main");
        assert_eq!(branch_cell(&wt("/r", None)), "(detached)");
    }

    #[test]
    fn note_cell_combines_flags() {
        let mut worktree = wt("/r", Some("main"));
        worktree.locked = Some(String::new());
        worktree.prunable = Some("gitdir gone".into());
        assert_eq!(note_cell(&worktree), "locked, prunable");
    }

    #[test]
    fn coarse_age_picks_largest_unit() {
        assert_eq!(coarse_age(5), "now");
        assert_eq!(coarse_age(150), "2m");
        assert_eq!(coarse_age(7_300), "2h");
        assert_eq!(coarse_age(200_000), "2days");
    }

    #[test]
    fn table_aligns_columns() {
        let repo = Repository::at("/nonexistent");
        let list = WorktreeList {
            worktrees: vec![wt("/r/main", Some("main")), wt("/r/fix", Some("feature/fix"))],
        };
        let lines = render_table(&repo, &list, 120);
        assert_eq!(lines.len(), 3);
        // Every row ends the BRANCH column at the same offset
        let header = lines[0].render();
        assert!(header.contains("BRANCH"));
        assert!(header.contains("PATH"));
    }
}
