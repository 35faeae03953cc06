//! engine
//!
//! The operations behind each command, independent of argument parsing.
//!
//! # Modules
//!
//! - [`reconcile`] - Create/update/delete a stack and poll it to a verdict
//! - [`progress`] - Transition lines and resource diffing
//! - [`query`] - Stack listing and output lookup
//! - [`invoke`] - Function invocation
//!
//! # Invariants
//!
//! - Every invocation is stateless; stack state is always rediscovered
//!   from the provider.
//! - Mutating requests are issued at most once; only reads are repeated.
//! - Engine functions return outcomes; only the command boundary turns
//!   them into exit codes.

pub mod invoke;
pub mod progress;
pub mod query;
pub mod reconcile;

use std::time::Duration;

use crate::core::config::Config;
use crate::ui::output::Verbosity;

pub use invoke::{InvokeError, InvokeOutcome, Invocation};
pub use reconcile::{DeployOutcome, ReconcileOutcome, Reconciler};

/// Execution context shared by all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Merged configuration
    pub config: Config,
    /// Delay between two status queries
    pub poll_interval: Duration,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    /// Context taking its settings from `config`.
    pub fn from_config(config: Config) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            config,
            debug: false,
            quiet: false,
        }
    }

    /// Override the delay between status queries.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::from_config(Config::default())
    }
}

/// How a command ended, before it becomes a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    /// Failed with the given exit code
    Failure(i32),
}

impl CommandOutcome {
    /// Generic failure (exit code 1).
    pub const FAILED: CommandOutcome = CommandOutcome::Failure(1);

    pub fn exit_code(self) -> i32 {
        match self {
            CommandOutcome::Success => 0,
            CommandOutcome::Failure(code) => code,
        }
    }

    pub fn is_success(self) -> bool {
        self == CommandOutcome::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_uses_config_interval() {
        let ctx = Context::default();
        assert_eq!(ctx.poll_interval, Duration::from_secs(5));
        assert_eq!(ctx.verbosity(), Verbosity::Normal);

        let fast = ctx.with_poll_interval(Duration::ZERO);
        assert_eq!(fast.poll_interval, Duration::ZERO);
    }

    #[test]
    fn exit_codes() {
        assert_eq!(CommandOutcome::Success.exit_code(), 0);
        assert_eq!(CommandOutcome::FAILED.exit_code(), 1);
        assert_eq!(CommandOutcome::Failure(429).exit_code(), 429);
        assert!(!CommandOutcome::Failure(429).is_success());
    }
}
