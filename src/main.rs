use std::process;

use clap::Parser;

use grove::cli::Cli;
use grove::git::{self, GitError};
use grove::styling::{eprintln, error_message};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = grove::cli::run(cli) {
        // GitError carries its own styled display; everything else gets the
        // standard error prefix with the full context chain
        match err.downcast_ref::<GitError>() {
            Some(git_err) => eprintln!("{git_err}"),
            None => eprintln!("{}", error_message(format!("{err:#}"))),
        }
        process::exit(git::exit_code(&err));
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}
