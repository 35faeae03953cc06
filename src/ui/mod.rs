//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Confirmation capability (stdin or scripted)
//! - [`output`] - Console streams and verbosity
//!
//! # Design
//!
//! All output and prompts go through this module so commands never touch
//! the process's streams directly, and tests can capture everything.

pub mod output;
pub mod prompts;
