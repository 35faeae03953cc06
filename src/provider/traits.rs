//! provider::traits
//!
//! Trait definitions for the remote provisioning service.
//!
//! # Design
//!
//! The `Provider` trait is async because every operation is network I/O.
//! It returns the provider's own errors untouched: deciding that a
//! "does not exist" error means "absent", or that "no updates" means
//! "done", is the engine's job, not the adapter's.
//!
//! # Example
//!
//! ```ignore
//! use stackrunner::provider::{Provider, ProviderError};
//!
//! async fn show(provider: &dyn Provider) -> Result<(), ProviderError> {
//!     for stack in provider.list_stacks().await? {
//!         println!("{} {}", stack.name, stack.status);
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{ResourceSnapshot, StackSnapshot};

/// Message the provider returns when a stack name is unknown.
///
/// # Example
///
/// ```
/// use stackrunner::provider::stack_missing_message;
///
/// assert_eq!(stack_missing_message("demo"), "Stack with id demo does not exist");
/// ```
pub fn stack_missing_message(name: &str) -> String {
    format!("Stack with id {} does not exist", name)
}

/// Message the provider returns when an update changes nothing.
pub const NO_UPDATES_MESSAGE: &str = "No updates are to be performed.";

/// Errors from provider operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The request was rejected as invalid (`ValidationError`).
    #[error("{message}")]
    Validation {
        /// Message from the provider, verbatim
        message: String,
    },

    /// Any other error reported by the service.
    #[error("{code}: {message}")]
    Api {
        /// Error code from the provider
        code: String,
        /// Message from the provider, verbatim
        message: String,
    },

    /// The service could not be reached.
    #[error("network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Whether this is the canonical "stack does not exist" error for `name`.
    pub fn is_stack_missing(&self, name: &str) -> bool {
        matches!(self, ProviderError::Validation { message } if *message == stack_missing_message(name))
    }

    /// Whether this is the canonical "no updates are to be performed" error.
    pub fn is_no_updates(&self) -> bool {
        matches!(self, ProviderError::Validation { message } if message.as_str() == NO_UPDATES_MESSAGE)
    }
}

/// Request to store an object.
#[derive(Debug, Clone)]
pub struct PutObjectRequest {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
}

/// Request to invoke a function synchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeRequest {
    /// Function name or ARN, optionally with `:qualifier`
    pub function_name: String,
    /// `RequestResponse`, `Event` or `DryRun`
    pub invocation_type: String,
    /// `Tail` to receive the last 4KB of logs, `None` otherwise
    pub log_type: String,
    /// Payload body
    pub payload: Option<Vec<u8>>,
    /// Version or alias
    pub qualifier: Option<String>,
    /// Base64-encoded client context
    pub client_context: Option<String>,
}

/// Result of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeResponse {
    /// HTTP status code of the invocation
    pub status_code: u16,
    /// Set when the function itself failed (e.g. `Unhandled`)
    pub function_error: Option<String>,
    /// Base64-encoded tail of the execution log
    pub log_result: Option<String>,
    /// Response body
    pub payload: Vec<u8>,
}

impl InvokeResponse {
    /// Whether the status code is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// The remote provisioning service.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`.
///
/// # Error Handling
///
/// All methods return the provider's error verbatim. Mutating requests
/// (`create_stack`, `update_stack`, `delete_stack`, `put_object`, `invoke`)
/// are never retried by callers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Describe a stack by name or id.
    ///
    /// The returned snapshot carries no resources; those come from
    /// [`Provider::describe_stack_resources`]. `Ok(None)` means the
    /// service answered with no stack at all; an unknown name usually
    /// surfaces as a `Validation` error instead.
    async fn describe_stack(&self, name: &str) -> Result<Option<StackSnapshot>, ProviderError>;

    /// List the resources of a stack.
    async fn describe_stack_resources(
        &self,
        name: &str,
    ) -> Result<Vec<ResourceSnapshot>, ProviderError>;

    /// Describe every stack in the region.
    async fn list_stacks(&self) -> Result<Vec<StackSnapshot>, ProviderError>;

    /// Request creation of a stack.
    async fn create_stack(
        &self,
        name: &str,
        template: &str,
        capabilities: &[String],
    ) -> Result<(), ProviderError>;

    /// Request an update of a stack.
    async fn update_stack(
        &self,
        name: &str,
        template: &str,
        capabilities: &[String],
    ) -> Result<(), ProviderError>;

    /// Request deletion of a stack.
    async fn delete_stack(&self, name: &str) -> Result<(), ProviderError>;

    /// Store an object.
    async fn put_object(&self, request: PutObjectRequest) -> Result<(), ProviderError>;

    /// Invoke a function and wait for its result.
    async fn invoke(&self, request: InvokeRequest) -> Result<InvokeResponse, ProviderError>;
}

/// Builds providers bound to a region.
///
/// Commands get a connector rather than a provider because `outputs` can
/// address stacks in several regions in one run.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to the provider in `region`.
    async fn connect(&self, region: &str) -> Result<Arc<dyn Provider>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_missing_is_exact() {
        let err = ProviderError::Validation {
            message: stack_missing_message("demo"),
        };
        assert!(err.is_stack_missing("demo"));
        assert!(!err.is_stack_missing("demo2"));

        let api = ProviderError::Api {
            code: "ValidationError".into(),
            message: stack_missing_message("demo"),
        };
        assert!(!api.is_stack_missing("demo"));
    }

    #[test]
    fn no_updates_is_exact() {
        let err = ProviderError::Validation {
            message: NO_UPDATES_MESSAGE.into(),
        };
        assert!(err.is_no_updates());

        let other = ProviderError::Validation {
            message: "No updates are to be performed".into(),
        };
        assert!(!other.is_no_updates());
    }

    #[test]
    fn invoke_response_success_range() {
        let mut response = InvokeResponse {
            status_code: 200,
            function_error: None,
            log_result: None,
            payload: vec![],
        };
        assert!(response.is_success());
        response.status_code = 299;
        assert!(response.is_success());
        response.status_code = 429;
        assert!(!response.is_success());
    }

    #[test]
    fn provider_error_display() {
        assert_eq!(
            format!(
                "{}",
                ProviderError::Validation {
                    message: "Template format error".into()
                }
            ),
            "Template format error"
        );
        assert_eq!(
            format!(
                "{}",
                ProviderError::Api {
                    code: "AccessDenied".into(),
                    message: "nope".into()
                }
            ),
            "AccessDenied: nope"
        );
        assert_eq!(
            format!("{}", ProviderError::Network("timed out".into())),
            "network error: timed out"
        );
    }
}
