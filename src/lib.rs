//! stackrunner - deploy, delete and query CloudFormation stacks
//!
//! stackrunner is a single-binary tool that drives the lifecycle of
//! infrastructure stacks: it submits a create, update or delete, polls the
//! stack until it settles while printing each resource transition once,
//! and reports a verdict. It can also package and upload code artifacts,
//! invoke functions, and look up stack outputs.
//!
//! # Architecture
//!
//! The codebase is layered:
//!
//! - [`cli`] - Token classifier and command dispatch
//! - [`engine`] - Reconciler, stack queries and function invocation
//! - [`core`] - Domain types, packaging, naming and configuration
//! - [`provider`] - Abstraction over the remote service (AWS, mock)
//! - [`ui`] - Console output and confirmation prompts
//!
//! # Correctness Invariants
//!
//! 1. Every invocation is stateless; stack state is rediscovered remotely
//! 2. Mutating requests are sent at most once and never retried
//! 3. Progress output is monotonic: an unchanged state is never reprinted
//! 4. Only the command boundary decides the process exit code

pub mod cli;
pub mod core;
pub mod engine;
pub mod provider;
pub mod ui;
