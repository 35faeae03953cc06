//! provider::mock
//!
//! Mock provider implementation for deterministic testing.
//!
//! # Design
//!
//! Each stack is driven by a script of frames. Every `describe_stack` call
//! consumes one frame; the last frame sticks, so a script ending in a
//! terminal status keeps answering with it. A `None` frame means the
//! stack does not exist and answers with the provider's canonical
//! "does not exist" validation error. `describe_stack_resources` answers
//! from the frame most recently handed out.
//!
//! Mutating requests only record themselves; what happens to the stack
//! afterwards is whatever the script says.
//!
//! # Example
//!
//! ```
//! use stackrunner::core::types::StackStatus;
//! use stackrunner::provider::mock::{stack, MockProvider};
//! use stackrunner::provider::Provider;
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new().with_script(
//!     "demo",
//!     vec![None, Some(stack("demo", StackStatus::CreateComplete))],
//! );
//!
//! assert!(provider.describe_stack("demo").await.is_err());
//! let found = provider.describe_stack("demo").await.unwrap().unwrap();
//! assert_eq!(found.status, StackStatus::CreateComplete);
//! # });
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::traits::{
    stack_missing_message, Connector, InvokeRequest, InvokeResponse, Provider, ProviderError,
    PutObjectRequest,
};
use crate::core::types::{ResourceSnapshot, StackSnapshot, StackStatus};

/// Build a stack snapshot with a deterministic id and no resources.
pub fn stack(name: &str, status: StackStatus) -> StackSnapshot {
    StackSnapshot {
        id: format!(
            "arn:aws:cloudformation:us-east-1:123456789012:stack/{}/0000",
            name
        ),
        name: name.to_string(),
        status,
        status_reason: None,
        resources: Vec::new(),
        outputs: Vec::new(),
    }
}

/// Build a resource snapshot without reason or physical id.
pub fn resource(logical_id: &str, resource_type: &str, status: &str) -> ResourceSnapshot {
    ResourceSnapshot {
        logical_id: logical_id.to_string(),
        resource_type: resource_type.to_string(),
        status: status.to_string(),
        status_reason: None,
        physical_id: None,
    }
}

/// Mock provider for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    inner: Arc<Mutex<MockProviderInner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockProviderInner {
    /// Remaining frames per stack.
    scripts: BTreeMap<String, VecDeque<Option<StackSnapshot>>>,
    /// Frame most recently handed out per stack.
    current: BTreeMap<String, Option<StackSnapshot>>,
    /// Answer for `invoke`.
    invoke_response: Option<InvokeResponse>,
    /// Stored objects.
    objects: Vec<PutObjectRequest>,
    /// Operation to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    DescribeStack(ProviderError),
    ListStacks(ProviderError),
    CreateStack(ProviderError),
    UpdateStack(ProviderError),
    DeleteStack(ProviderError),
    PutObject(ProviderError),
    Invoke(ProviderError),
    Connect(ProviderError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Connect { region: String },
    DescribeStack { name: String },
    DescribeStackResources { name: String },
    ListStacks,
    CreateStack { name: String, template: String, capabilities: Vec<String> },
    UpdateStack { name: String, template: String, capabilities: Vec<String> },
    DeleteStack { name: String },
    PutObject { bucket: String, key: String, size: usize },
    Invoke(InvokeRequest),
}

impl MockOperation {
    /// Whether this operation asks the provider to change something.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            MockOperation::CreateStack { .. }
                | MockOperation::UpdateStack { .. }
                | MockOperation::DeleteStack { .. }
                | MockOperation::PutObject { .. }
                | MockOperation::Invoke(_)
        )
    }
}

impl MockProvider {
    /// Create a new mock provider with no stacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stack that always answers with `snapshot`.
    pub fn with_stack(self, snapshot: StackSnapshot) -> Self {
        let name = snapshot.name.clone();
        self.with_script(&name, vec![Some(snapshot)])
    }

    /// Script the answers for `name`, one frame per `describe_stack` call.
    pub fn with_script(self, name: &str, frames: Vec<Option<StackSnapshot>>) -> Self {
        self.lock().scripts.insert(name.to_string(), frames.into());
        self
    }

    /// Answer every `invoke` with `response`.
    pub fn with_invoke_response(self, response: InvokeResponse) -> Self {
        self.lock().invoke_response = Some(response);
        self
    }

    /// Configure the mock to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Get all stored objects.
    pub fn objects(&self) -> Vec<PutObjectRequest> {
        self.lock().objects.clone()
    }

    /// Number of `describe_stack` calls made for `name`.
    pub fn describe_count(&self, name: &str) -> usize {
        self.lock()
            .operations
            .iter()
            .filter(|op| matches!(op, MockOperation::DescribeStack { name: n } if n == name))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, MockProviderInner> {
        // A poisoned lock only happens after a panicking test; keep going.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, op: MockOperation) {
        self.lock().operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str) -> Result<(), ProviderError> {
        let inner = self.lock();
        let error = match &inner.fail_on {
            Some(FailOn::DescribeStack(e)) if expected == "describe_stack" => e,
            Some(FailOn::ListStacks(e)) if expected == "list_stacks" => e,
            Some(FailOn::CreateStack(e)) if expected == "create_stack" => e,
            Some(FailOn::UpdateStack(e)) if expected == "update_stack" => e,
            Some(FailOn::DeleteStack(e)) if expected == "delete_stack" => e,
            Some(FailOn::PutObject(e)) if expected == "put_object" => e,
            Some(FailOn::Invoke(e)) if expected == "invoke" => e,
            Some(FailOn::Connect(e)) if expected == "connect" => e,
            _ => return Ok(()),
        };
        Err(error.clone())
    }

    fn missing(name: &str) -> ProviderError {
        ProviderError::Validation {
            message: stack_missing_message(name),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn describe_stack(&self, name: &str) -> Result<Option<StackSnapshot>, ProviderError> {
        self.record(MockOperation::DescribeStack {
            name: name.to_string(),
        });
        self.check_fail("describe_stack")?;

        let mut inner = self.lock();
        let frame = match inner.scripts.get_mut(name) {
            Some(frames) if frames.len() > 1 => frames.pop_front().flatten(),
            Some(frames) => frames.front().cloned().flatten(),
            None => None,
        };
        inner.current.insert(name.to_string(), frame.clone());

        match frame {
            Some(snapshot) => Ok(Some(StackSnapshot {
                resources: Vec::new(),
                ..snapshot
            })),
            None => Err(Self::missing(name)),
        }
    }

    async fn describe_stack_resources(
        &self,
        name: &str,
    ) -> Result<Vec<ResourceSnapshot>, ProviderError> {
        self.record(MockOperation::DescribeStackResources {
            name: name.to_string(),
        });

        let inner = self.lock();
        let frame = match inner.current.get(name) {
            Some(frame) => frame.clone(),
            None => inner
                .scripts
                .get(name)
                .and_then(|frames| frames.front().cloned())
                .flatten(),
        };

        frame
            .map(|snapshot| snapshot.resources)
            .ok_or_else(|| Self::missing(name))
    }

    async fn list_stacks(&self) -> Result<Vec<StackSnapshot>, ProviderError> {
        self.record(MockOperation::ListStacks);
        self.check_fail("list_stacks")?;

        let inner = self.lock();
        Ok(inner
            .scripts
            .values()
            .filter_map(|frames| frames.front().cloned().flatten())
            .collect())
    }

    async fn create_stack(
        &self,
        name: &str,
        template: &str,
        capabilities: &[String],
    ) -> Result<(), ProviderError> {
        self.record(MockOperation::CreateStack {
            name: name.to_string(),
            template: template.to_string(),
            capabilities: capabilities.to_vec(),
        });
        self.check_fail("create_stack")
    }

    async fn update_stack(
        &self,
        name: &str,
        template: &str,
        capabilities: &[String],
    ) -> Result<(), ProviderError> {
        self.record(MockOperation::UpdateStack {
            name: name.to_string(),
            template: template.to_string(),
            capabilities: capabilities.to_vec(),
        });
        self.check_fail("update_stack")
    }

    async fn delete_stack(&self, name: &str) -> Result<(), ProviderError> {
        self.record(MockOperation::DeleteStack {
            name: name.to_string(),
        });
        self.check_fail("delete_stack")
    }

    async fn put_object(&self, request: PutObjectRequest) -> Result<(), ProviderError> {
        self.record(MockOperation::PutObject {
            bucket: request.bucket.clone(),
            key: request.key.clone(),
            size: request.body.len(),
        });
        self.check_fail("put_object")?;

        self.lock().objects.push(request);
        Ok(())
    }

    async fn invoke(&self, request: InvokeRequest) -> Result<InvokeResponse, ProviderError> {
        self.record(MockOperation::Invoke(request));
        self.check_fail("invoke")?;

        Ok(self.lock().invoke_response.clone().unwrap_or(InvokeResponse {
            status_code: 200,
            function_error: None,
            log_result: None,
            payload: b"null".to_vec(),
        }))
    }
}

#[async_trait]
impl Connector for MockProvider {
    async fn connect(&self, region: &str) -> Result<Arc<dyn Provider>, ProviderError> {
        self.record(MockOperation::Connect {
            region: region.to_string(),
        });
        self.check_fail("connect")?;
        Ok(Arc::new(self.clone()))
    }
}
