//! Command handlers: the flows that assemble wizards and do the actual git
//! work around them.

pub(crate) mod checkout;
pub(crate) mod config;
pub(crate) mod hook;
pub(crate) mod list;
pub(crate) mod pr;
pub(crate) mod prune;

pub use checkout::{CheckoutOptions, handle_checkout};
pub use config::handle_config_show;
pub use hook::{FailureMode, HookContext, handle_hook, run_hooks};
pub use list::handle_list;
pub use pr::handle_pr;
pub use prune::handle_prune;

use crate::wizard::SelectOption;

/// Yes/No options for confirm-style list steps, carrying bool payloads so
/// flows read them with `get_bool`.
pub(crate) fn confirm_options() -> Vec<SelectOption> {
    vec![
        SelectOption::new("Yes").with_value(true),
        SelectOption::new("No").with_value(false),
    ]
}

/// Format a hook execution label with an optional command name.
///
/// `format_command_label("post-create", Some("install"))` → "Running post-create install"
pub(crate) fn format_command_label(phase: &str, name: Option<&str>) -> String {
    use color_print::cformat;
    match name {
        Some(name) => cformat!("Running {phase} <bold>{name}</>"),
        None => format!("Running {phase}"),
    }
}
