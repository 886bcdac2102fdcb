//! `grove config show`: print the effective configuration.

use std::path::Path;

use color_print::cformat;

use crate::config::{PROJECT_CONFIG_PATH, UserConfig, user_config_path};
use crate::git::Repository;
use crate::styling::{hint_message, println};

pub fn handle_config_show(config: &UserConfig, base: &Path) -> anyhow::Result<()> {
    let location = user_config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("{}", cformat!("<cyan>USER CONFIG</>  {location}"));
    print_indented(&toml::to_string_pretty(config)?);

    // Project config is optional and only shown from inside a repository
    match Repository::discover(base) {
        Ok(repo) => {
            let worktrees = repo.list_worktrees()?;
            let path = worktrees.main().path.join(PROJECT_CONFIG_PATH);
            if path.exists() {
                println!();
                println!("{}", cformat!("<cyan>PROJECT CONFIG</>  {}", path.display()));
                print_indented(&std::fs::read_to_string(&path)?);
            } else {
                println!();
                println!(
                    "{}",
                    hint_message(format!("No project config at {}", path.display()))
                );
            }
        }
        Err(_) => {
            println!();
            println!("{}", hint_message("Not inside a git repository"));
        }
    }

    Ok(())
}

fn print_indented(content: &str) {
    for line in content.lines() {
        println!("  {line}");
    }
}
