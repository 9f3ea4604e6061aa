// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, resolve settings, hand off to the
//   command dispatcher.
// - Only this layer turns a failure into a message and an exit code.

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;

use serptech_cli::cli::Cli;
use serptech_cli::commands::{self, Session};
use serptech_cli::config::{self, Settings};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let env = |key: &str| std::env::var(key).ok();
    init_logging(config::debug_enabled(cli.global.debug, &env));

    let settings = Settings::from_env(cli.global.overrides());
    log::debug!("base url {}", settings.base_url);

    let session = Session::new(settings, &cli.global);
    match commands::dispatch(&cli.command, &session) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Warnings by default, everything from `--debug`; `RUST_LOG` wins.
fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}
