//! provider
//!
//! Abstraction for the remote provisioning service.
//!
//! # Architecture
//!
//! The `Provider` trait defines the request/response contract the engine
//! depends on: stacks and their resources, object storage, and function
//! invocation. Commands receive a [`Connector`] and connect per region,
//! rather than importing a specific implementation.
//!
//! - Provider calls are made only after local arguments are validated
//! - Provider errors are returned verbatim; classification happens in the engine
//! - A provider lives for one command and is never shared between commands
//!
//! # Modules
//!
//! - `traits`: Core `Provider`/`Connector` traits and request/response types
//! - [`aws`]: AWS implementation (CloudFormation, S3, Lambda)
//! - [`mock`]: Mock implementation for deterministic testing

pub mod aws;
pub mod mock;
mod traits;

pub use aws::{AwsConnector, AwsProvider};
pub use traits::*;
