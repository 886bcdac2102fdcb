//! Project-level configuration: hooks shared across all developers.

use std::path::Path;

use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::git::HookPhase;

/// Project config location, relative to the repository root.
pub const PROJECT_CONFIG_PATH: &str = ".config/grove.toml";

/// Project-specific hook configuration, checked into the repository.
///
/// ```toml
/// # .config/grove.toml
/// post-create = ["npm install", "npm run build"]
///
/// [post-remove]
/// cleanup = "docker compose down"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Commands run after a worktree is created (blocking, fail-fast)
    #[serde(rename = "post-create", skip_serializing_if = "Option::is_none")]
    pub post_create: Option<CommandConfig>,

    /// Commands run after a worktree is removed (best-effort)
    #[serde(rename = "post-remove", skip_serializing_if = "Option::is_none")]
    pub post_remove: Option<CommandConfig>,
}

impl ProjectConfig {
    /// Load the project config from `repo_root`, defaulting to empty when the
    /// file does not exist.
    pub fn load(repo_root: &Path) -> anyhow::Result<Self> {
        let path = repo_root.join(PROJECT_CONFIG_PATH);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid config at {}", path.display()))
    }

    /// The commands configured for `phase`, in declaration order.
    pub fn hooks(&self, phase: HookPhase) -> Vec<HookCommand> {
        let config = match phase {
            HookPhase::PostCreate => &self.post_create,
            HookPhase::PostRemove => &self.post_remove,
        };
        config.as_ref().map(CommandConfig::commands).unwrap_or_default()
    }
}

/// A hook entry: a single command, a list, or a named table.
///
/// Named tables keep insertion order (the file's declaration order) so hooks
/// run in the order they are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandConfig {
    Single(String),
    Multiple(Vec<String>),
    Named(IndexMap<String, String>),
}

impl CommandConfig {
    pub fn commands(&self) -> Vec<HookCommand> {
        match self {
            CommandConfig::Single(command) => vec![HookCommand {
                name: None,
                command: command.clone(),
            }],
            CommandConfig::Multiple(commands) => commands
                .iter()
                .map(|command| HookCommand {
                    name: None,
                    command: command.clone(),
                })
                .collect(),
            CommandConfig::Named(map) => map
                .iter()
                .map(|(name, command)| HookCommand {
                    name: Some(name.clone()),
                    command: command.clone(),
                })
                .collect(),
        }
    }
}

/// One runnable hook command (template, not yet expanded).
#[derive(Debug, Clone, PartialEq)]
pub struct HookCommand {
    pub name: Option<String>,
    pub command: String,
}

impl HookCommand {
    /// Display label: the name when given, else the command itself.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    fn load_reads_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".config");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("grove.toml"), "post-create = \"make setup\"\n").unwrap();

        let config = ProjectConfig::load(dir.path()).unwrap();
        let hooks = config.hooks(crate::git::HookPhase::PostCreate);
        assert_eq!(hooks.len(), 1);
        assert_eq!(hooks[0].command, "make setup");
    }

    #[test]
    fn hook_label_prefers_name() {
        let named = HookCommand {
            name: Some("install".into()),
            command: "npm install".into(),
        };
        let bare = HookCommand {
            name: None,
            command: "npm install".into(),
        };
        assert_eq!(named.label(), "install");
        assert_eq!(bare.label(), "npm install");
    }
}
