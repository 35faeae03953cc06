//! cli
//!
//! Command-line interface layer for stackrunner.
//!
//! # Responsibilities
//!
//! - Classify the raw arguments ([`args`])
//! - Set up logging and load configuration
//! - Resolve and run the command ([`commands`])
//!
//! # Architecture
//!
//! The CLI layer is thin. It never talks to the provider itself; it builds
//! a [`Context`] and hands the classified options to
//! [`commands::dispatch`], which returns the exit code.
//!
//! # Logging
//!
//! Diagnostics go to stderr through `tracing`. `STACKRUNNER_LOG` takes an
//! env-filter directive; without it the level is `warn`, `debug` with
//! `--debug` and `error` with `--quiet`.

pub mod args;
pub mod commands;

pub use args::{ArgError, Opt, OptionSet};
pub use commands::{execute, Command, CommandError};

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::engine::Context;
use crate::ui::output::{Console, Verbosity};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "STACKRUNNER_LOG";

/// Install the stderr log subscriber.
///
/// Only the first call in a process takes effect.
pub fn init_logging(verbosity: Verbosity) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`; `args` excludes the
/// program name. Returns the process exit code.
pub fn run<I, S>(args: I) -> Result<i32>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let options = match OptionSet::tokenize(args) {
        Ok(options) => options,
        Err(err) => {
            Console::stdio(Verbosity::Normal).error(&err);
            return Ok(1);
        }
    };

    let verbosity = Verbosity::from_flags(options.has_switch("--quiet"), options.has_switch("--debug"));
    init_logging(verbosity);

    let cwd = std::env::current_dir().context("failed to determine working directory")?;
    let config = Config::load(Some(&cwd)).context("failed to load configuration")?;
    tracing::debug!(sources = ?config.sources(), "configuration loaded");

    let mut ctx = Context::from_config(config);
    ctx.debug = verbosity == Verbosity::Debug;
    ctx.quiet = verbosity == Verbosity::Quiet;

    commands::dispatch(&options, &ctx)
}
