//! Template expansion for worktree paths and hook commands.
//!
//! Uses minijinja. One generic function with an escaping flag:
//! - `shell_quote: true` — values shell-escaped for safe command execution
//! - `shell_quote: false` — literal values for filesystem paths
//!
//! Undefined variables are strict errors, so a typoed `{{ brnach }}` fails at
//! load time instead of silently expanding to nothing.

use std::borrow::Cow;
use std::collections::HashMap;

use minijinja::{Environment, UndefinedBehavior};
use shell_escape::escape;

/// Known template variables available in hook commands.
///
/// Populated by `HookContext::variables()` in `commands/hook.rs`. The
/// worktree-path template only sees `repo` and `branch`.
pub const TEMPLATE_VARS: &[&str] = &[
    "repo",
    "branch",
    "worktree_name",
    "repo_path",
    "worktree_path",
    "default_branch",
];

/// Replace path separators (`/` and `\`) with dashes so a branch name is a
/// single path component. Exposed to templates as the `sanitize` filter.
///
/// # Examples
/// ```
/// use grove::config::sanitize_branch_name;
///
/// assert_eq!(sanitize_branch_name("feature/foo"), "feature-foo");
/// assert_eq!(sanitize_branch_name("user\\task"), "user-task");
/// assert_eq!(sanitize_branch_name("simple-branch"), "simple-branch");
/// ```
pub fn sanitize_branch_name(branch: &str) -> String {
    branch.replace(['/', '\\'], "-")
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.add_filter("sanitize", |branch: String| sanitize_branch_name(&branch));
    env
}

/// Render `template` with `vars`, optionally shell-escaping each value.
pub fn expand_template(
    template: &str,
    vars: &[(&str, &str)],
    shell_quote: bool,
) -> anyhow::Result<String> {
    let env = environment();
    let tmpl = env.template_from_str(template)?;

    let context: HashMap<&str, String> = vars
        .iter()
        .map(|(key, value)| {
            let value = if shell_quote {
                escape(Cow::from(*value)).into_owned()
            } else {
                (*value).to_string()
            };
            (*key, value)
        })
        .collect();

    Ok(tmpl.render(context)?)
}
