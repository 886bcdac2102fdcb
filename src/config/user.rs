//! User-level configuration
//!
//! Personal preferences, not checked into git.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use etcetera::BaseStrategy;
use serde::{Deserialize, Serialize};

use super::expansion::expand_template;
use crate::styling::Theme;

/// User-level configuration for worktree path formatting and UI behavior.
///
/// Stored at `~/.config/grove/config.toml` (or platform equivalent) and NOT
/// checked into git.
///
/// The `worktree-path` template is relative to the repository root.
/// Supported variables:
/// - `{{ repo }}` - Repository directory name (e.g., `myproject`)
/// - `{{ branch }}` - Raw branch name (e.g., `feature/auth`)
/// - `{{ branch | sanitize }}` - Branch name with `/` and `\` replaced by `-`
///
/// # Examples
///
/// ```toml
/// # Default - parent directory siblings
/// worktree-path = "../{{ repo }}.{{ branch | sanitize }}"
///
/// # Inside the repo
/// worktree-path = ".worktrees/{{ branch | sanitize }}"
///
/// confirm-prune = false
///
/// [ui]
/// theme = "plain"
///
/// [forge]
/// cache-ttl-minutes = 10
///
/// # Per-repository override
/// [projects.myproject]
/// worktree-path = "../worktrees/{{ branch | sanitize }}"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    #[serde(rename = "worktree-path")]
    pub worktree_path: String,

    /// Whether `grove prune` adds a confirmation step to the wizard.
    #[serde(rename = "confirm-prune")]
    pub confirm_prune: bool,

    pub ui: UiConfig,

    pub forge: ForgeConfig,

    /// Per-repository overrides, keyed by repository directory name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub projects: BTreeMap<String, ProjectOverrides>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            worktree_path: "../{{ repo }}.{{ branch | sanitize }}".to_string(),
            confirm_prune: true,
            ui: UiConfig::default(),
            forge: ForgeConfig::default(),
            projects: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub theme: ThemeChoice,
}

/// Wizard color scheme.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    #[default]
    Ansi,
    Plain,
}

impl ThemeChoice {
    pub fn resolve(self) -> Theme {
        match self {
            ThemeChoice::Ansi => Theme::ansi(),
            ThemeChoice::Plain => Theme::plain(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForgeConfig {
    /// How long cached PR listings stay fresh before a refetch.
    #[serde(rename = "cache-ttl-minutes")]
    pub cache_ttl_minutes: u64,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            cache_ttl_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectOverrides {
    #[serde(rename = "worktree-path", skip_serializing_if = "Option::is_none")]
    pub worktree_path: Option<String>,
}

impl UserConfig {
    /// Load the user config, falling back to defaults when no file exists.
    pub fn load() -> anyhow::Result<Self> {
        match user_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("invalid config at {}", path.display()))
    }

    /// Expand the worktree-path template for `repo_name` / `branch`.
    ///
    /// The result is a path string relative to the repository root (or
    /// absolute, if the template says so) — see [`Self::worktree_path_for`].
    pub fn format_worktree_path(&self, repo_name: &str, branch: &str) -> anyhow::Result<String> {
        let template = self
            .projects
            .get(repo_name)
            .and_then(|p| p.worktree_path.as_deref())
            .unwrap_or(&self.worktree_path);
        expand_template(template, &[("repo", repo_name), ("branch", branch)], false)
    }

    /// Absolute path for a new worktree of `branch` in the repo at `root`.
    pub fn worktree_path_for(
        &self,
        root: &Path,
        repo_name: &str,
        branch: &str,
    ) -> anyhow::Result<PathBuf> {
        let formatted = self.format_worktree_path(repo_name, branch)?;
        let expanded = shellexpand::tilde(&formatted);
        let path = Path::new(expanded.as_ref());
        Ok(if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        })
    }
}

/// Location of the user config file.
///
/// `GROVE_CONFIG_PATH` overrides the platform default; tests use this to
/// point grove at a scratch file.
pub fn user_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("GROVE_CONFIG_PATH") {
        return Some(PathBuf::from(path));
    }
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("grove").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_from_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "worktree-path = \"x/{{{{ branch }}}}\"\nconfirm-prune = false"
        )
        .unwrap();

        let config = UserConfig::load_from(file.path()).unwrap();
        assert_eq!(config.worktree_path, "x/{{ branch }}");
        assert!(!config.confirm_prune);
        // Unset sections keep their defaults
        assert_eq!(config.ui.theme, ThemeChoice::Ansi);
    }

    #[test]
    fn load_from_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "worktree-path = [1, 2]").unwrap();
        assert!(UserConfig::load_from(file.path()).is_err());
    }

    #[test]
    fn worktree_path_for_joins_relative_to_root() {
        let config = UserConfig::default();
        let path = config
            .worktree_path_for(Path::new("/work/repo"), "repo", "fix")
            .unwrap();
        assert_eq!(path, Path::new("/work/repo/../repo.fix"));
    }

    #[test]
    fn worktree_path_for_keeps_absolute_paths() {
        let config = UserConfig {
            worktree_path: "/tmp/worktrees/{{ branch | sanitize }}".to_string(),
            ..UserConfig::default()
        };
        let path = config
            .worktree_path_for(Path::new("/work/repo"), "repo", "a/b")
            .unwrap();
        assert_eq!(path, Path::new("/tmp/worktrees/a-b"));
    }

    #[test]
    fn theme_choice_parses_lowercase() {
        let config: UserConfig = toml::from_str("[ui]\ntheme = \"plain\"").unwrap();
        assert_eq!(config.ui.theme, ThemeChoice::Plain);
    }
}
