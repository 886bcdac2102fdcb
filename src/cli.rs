//! Command-line surface.

use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Color, Styles};
use clap::{ArgAction, Parser, Subcommand};

use crate::commands::{self, CheckoutOptions};
use crate::config::UserConfig;
use crate::git::{HookPhase, Repository};

/// Custom styles for help output - matches grove's color scheme
fn help_styles() -> Styles {
    Styles::styled()
        .header(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .usage(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .literal(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .placeholder(anstyle::Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
        .error(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
}

#[derive(Parser)]
#[command(
    name = "grove",
    about = "Interactive git worktree manager with GitHub/GitLab integration",
    version,
    styles = help_styles()
)]
pub struct Cli {
    /// Run as if grove was started in <PATH>
    #[arg(short = 'C', global = true, value_name = "PATH")]
    pub directory: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check out a branch as a worktree (interactive without arguments)
    Checkout {
        /// Branch to check out; prompts when omitted
        branch: Option<String>,

        /// Base branch when creating a new branch
        #[arg(long)]
        base: Option<String>,

        /// Skip post-create hooks
        #[arg(long)]
        no_hooks: bool,
    },

    /// List worktrees
    List {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Interactively remove worktrees
    Prune {
        /// Remove even with uncommitted changes
        #[arg(long)]
        force: bool,
    },

    /// Check out a pull/merge request as a worktree
    Pr {
        /// PR/MR number; prompts when omitted
        number: Option<u64>,

        /// Bypass the PR cache
        #[arg(long)]
        refresh: bool,
    },

    /// Run configured hooks for the current worktree
    Hook {
        /// Hook phase to run
        phase: HookPhase,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective user and project configuration
    Show,
}

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let base = cli.directory.clone().unwrap_or_else(|| PathBuf::from("."));
    let config = UserConfig::load()?;
    let theme = config.ui.theme.resolve();

    match cli.command {
        Commands::Checkout {
            branch,
            base: branch_base,
            no_hooks,
        } => {
            let repo = Repository::discover(&base)?;
            commands::handle_checkout(
                &repo,
                &config,
                &theme,
                CheckoutOptions {
                    branch: branch.as_deref(),
                    base: branch_base.as_deref(),
                    no_hooks,
                },
            )
        }
        Commands::List { json } => {
            let repo = Repository::discover(&base)?;
            commands::handle_list(&repo, json)
        }
        Commands::Prune { force } => {
            let repo = Repository::discover(&base)?;
            commands::handle_prune(&repo, &config, &theme, force)
        }
        Commands::Pr { number, refresh } => {
            let repo = Repository::discover(&base)?;
            commands::handle_pr(&repo, &config, &theme, number, refresh)
        }
        Commands::Hook { phase } => {
            let repo = Repository::discover(&base)?;
            commands::handle_hook(&repo, phase)
        }
        Commands::Config { command } => match command {
            ConfigCommand::Show => commands::handle_config_show(&config, &base),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_checkout_with_flags() {
        let cli = Cli::parse_from(["grove", "checkout", "fix", "--base", "main", "--no-hooks"]);
        match cli.command {
            Commands::Checkout {
                branch,
                base,
                no_hooks,
            } => {
                assert_eq!(branch.as_deref(), Some("fix"));
                assert_eq!(base.as_deref(), Some("main"));
                assert!(no_hooks);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn parses_global_flags() {
        let cli = Cli::parse_from(["grove", "-C", "/tmp/repo", "-vv", "list", "--json"]);
        assert_eq!(cli.directory.as_deref(), Some(std::path::Path::new("/tmp/repo")));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::List { json: true }));
    }

    #[test]
    fn parses_hook_phase() {
        let cli = Cli::parse_from(["grove", "hook", "post-create"]);
        assert!(matches!(
            cli.command,
            Commands::Hook {
                phase: HookPhase::PostCreate
            }
        ));
    }
}
