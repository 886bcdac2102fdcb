//! Configuration system for grove
//!
//! Grove has two independent configuration files:
//!
//! # User Config (~/.config/grove/config.toml)
//!
//! **Purpose**: Personal preferences, not checked into git
//!
//! **Settings**:
//! - `worktree-path` - Template for worktree paths (relative to repo root)
//! - `confirm-prune` - Whether `grove prune` asks for confirmation
//! - `ui.theme` - `ansi` (default) or `plain`
//! - `forge.cache-ttl-minutes` - How long the PR cache stays fresh
//! - `[projects."<name>"]` - Per-repository overrides
//!
//! # Project Config (`<repo>`/.config/grove.toml)
//!
//! **Purpose**: Project-specific hooks, checked into git
//!
//! **Settings**:
//! - `post-create` - Commands run after a worktree is created (fail-fast)
//! - `post-remove` - Commands run after a worktree is removed (best-effort)
//!
//! The two configs are completely independent: no overlap in settings, no
//! merging or precedence rules. User config controls "how grove behaves for
//! me", project config controls "what commands run for this project".

mod expansion;
mod project;
mod user;

pub use expansion::{TEMPLATE_VARS, expand_template, sanitize_branch_name};
pub use project::{CommandConfig, HookCommand, PROJECT_CONFIG_PATH, ProjectConfig};
pub use user::{ThemeChoice, UserConfig, user_config_path};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::HookPhase;

    #[test]
    fn default_config_serializes() {
        let config = UserConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("worktree-path"));
        assert!(toml.contains("../{{ repo }}.{{ branch | sanitize }}"));
    }

    #[test]
    fn default_config_values() {
        let config = UserConfig::default();
        assert!(config.confirm_prune);
        assert_eq!(config.forge.cache_ttl_minutes, 5);
        assert!(config.projects.is_empty());
    }

    #[test]
    fn worktree_path_template_applies_sanitize_filter() {
        let config = UserConfig::default();
        let path = config
            .format_worktree_path("myproject", "feature/auth")
            .unwrap();
        assert_eq!(path, "../myproject.feature-auth");
    }

    #[test]
    fn per_project_template_override_wins() {
        let toml = r#"
            worktree-path = "../{{ repo }}.{{ branch | sanitize }}"

            [projects.special]
            worktree-path = ".worktrees/{{ branch | sanitize }}"
        "#;
        let config: UserConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.format_worktree_path("special", "fix").unwrap(),
            ".worktrees/fix"
        );
        assert_eq!(
            config.format_worktree_path("other", "fix").unwrap(),
            "../other.fix"
        );
    }

    #[test]
    fn unknown_template_variable_is_an_error() {
        let config = UserConfig {
            worktree_path: "../{{ nonsense }}".to_string(),
            ..UserConfig::default()
        };
        assert!(config.format_worktree_path("repo", "branch").is_err());
    }

    #[test]
    fn command_config_single_string() {
        let toml = r#"post-create = "npm install""#;
        let config: ProjectConfig = toml::from_str(toml).unwrap();
        let commands = config.hooks(HookPhase::PostCreate);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].command, "npm install");
        assert_eq!(commands[0].name, None);
    }

    #[test]
    fn command_config_list() {
        let toml = r#"post-create = ["npm install", "npm test"]"#;
        let config: ProjectConfig = toml::from_str(toml).unwrap();
        let commands = config.hooks(HookPhase::PostCreate);
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[1].command, "npm test");
    }

    #[test]
    fn command_config_named_preserves_order() {
        let toml = r#"
            [post-create]
            install = "npm install"
            build = "npm run build"
        "#;
        let config: ProjectConfig = toml::from_str(toml).unwrap();
        let commands = config.hooks(HookPhase::PostCreate);
        assert_eq!(
            commands.iter().map(|c| c.name.as_deref()).collect::<Vec<_>>(),
            vec![Some("install"), Some("build")]
        );
    }

    #[test]
    fn missing_phase_yields_no_hooks() {
        let config = ProjectConfig::default();
        assert!(config.hooks(HookPhase::PostRemove).is_empty());
    }
}
