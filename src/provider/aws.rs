//! provider::aws
//!
//! AWS implementation of the provider traits.
//!
//! # Services
//!
//! - CloudFormation for stacks and their resources
//! - S3 for code artifacts (stored with `AES256` server-side encryption)
//! - Lambda for invocations
//!
//! Credentials and endpoints come from the standard AWS configuration
//! chain (environment, profile, instance metadata). Only the region is
//! chosen by the caller.

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cloudformation::types::{Capability, Output, Stack, StackResource};
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::{InvocationType, LogType};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ServerSideEncryption;
use tracing::debug;

use super::traits::{
    Connector, InvokeRequest, InvokeResponse, Provider, ProviderError, PutObjectRequest,
};
use crate::core::types::{ResourceSnapshot, StackOutput, StackSnapshot, StackStatus};

/// Error code CloudFormation uses for rejected requests.
const VALIDATION_ERROR_CODE: &str = "ValidationError";

/// Provider backed by the AWS SDK, bound to one region.
#[derive(Debug, Clone)]
pub struct AwsProvider {
    cloudformation: aws_sdk_cloudformation::Client,
    s3: aws_sdk_s3::Client,
    lambda: aws_sdk_lambda::Client,
}

impl AwsProvider {
    /// Load the shared AWS configuration for `region` and build clients.
    pub async fn connect(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        debug!(region, "aws clients configured");

        Self {
            cloudformation: aws_sdk_cloudformation::Client::new(&config),
            s3: aws_sdk_s3::Client::new(&config),
            lambda: aws_sdk_lambda::Client::new(&config),
        }
    }
}

/// Connector producing [`AwsProvider`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsConnector;

#[async_trait]
impl Connector for AwsConnector {
    async fn connect(&self, region: &str) -> Result<Arc<dyn Provider>, ProviderError> {
        Ok(Arc::new(AwsProvider::connect(region).await))
    }
}

/// Map an SDK error to a [`ProviderError`], keeping the service's message.
fn classify<E, R>(err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    match (err.code(), err.message()) {
        (Some(VALIDATION_ERROR_CODE), message) => ProviderError::Validation {
            message: message.unwrap_or_default().to_string(),
        },
        (Some(code), message) => ProviderError::Api {
            code: code.to_string(),
            message: message.unwrap_or_default().to_string(),
        },
        (None, _) => ProviderError::Network(DisplayErrorContext(&err).to_string()),
    }
}

/// SDK getters return `&str` (or `&Enum`) for required members and
/// `Option<..>` for optional ones; this flattens both into owned strings.
trait Owned {
    fn owned(self) -> String;
}

impl<T: AsRef<str> + ?Sized> Owned for &T {
    fn owned(self) -> String {
        self.as_ref().to_string()
    }
}

impl<T: AsRef<str> + ?Sized> Owned for Option<&T> {
    fn owned(self) -> String {
        self.map(|v| v.as_ref().to_string()).unwrap_or_default()
    }
}

fn snapshot_from(stack: &Stack) -> StackSnapshot {
    StackSnapshot {
        id: stack.stack_id().owned(),
        name: stack.stack_name().owned(),
        status: StackStatus::parse(&stack.stack_status().owned()),
        status_reason: stack.stack_status_reason().map(str::to_string),
        resources: Vec::new(),
        outputs: stack.outputs().iter().map(output_from).collect(),
    }
}

fn output_from(output: &Output) -> StackOutput {
    StackOutput::new(output.output_key().owned(), output.output_value().owned())
}

fn resource_from(resource: &StackResource) -> ResourceSnapshot {
    ResourceSnapshot {
        logical_id: resource.logical_resource_id().owned(),
        resource_type: resource.resource_type().owned(),
        status: resource.resource_status().owned(),
        status_reason: resource.resource_status_reason().map(str::to_string),
        physical_id: resource.physical_resource_id().map(str::to_string),
    }
}

fn capabilities(values: &[String]) -> Vec<Capability> {
    values.iter().map(|c| Capability::from(c.as_str())).collect()
}

#[async_trait]
impl Provider for AwsProvider {
    async fn describe_stack(&self, name: &str) -> Result<Option<StackSnapshot>, ProviderError> {
        debug!(stack = name, "DescribeStacks");
        let output = self
            .cloudformation
            .describe_stacks()
            .stack_name(name)
            .send()
            .await
            .map_err(classify)?;

        Ok(output.stacks().first().map(snapshot_from))
    }

    async fn describe_stack_resources(
        &self,
        name: &str,
    ) -> Result<Vec<ResourceSnapshot>, ProviderError> {
        debug!(stack = name, "DescribeStackResources");
        let output = self
            .cloudformation
            .describe_stack_resources()
            .stack_name(name)
            .send()
            .await
            .map_err(classify)?;

        Ok(output.stack_resources().iter().map(resource_from).collect())
    }

    async fn list_stacks(&self) -> Result<Vec<StackSnapshot>, ProviderError> {
        let mut stacks = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            debug!(page = ?next_token, "DescribeStacks");
            let output = self
                .cloudformation
                .describe_stacks()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(classify)?;

            stacks.extend(output.stacks().iter().map(snapshot_from));

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(stacks)
    }

    async fn create_stack(
        &self,
        name: &str,
        template: &str,
        capabilities_list: &[String],
    ) -> Result<(), ProviderError> {
        debug!(stack = name, "CreateStack");
        self.cloudformation
            .create_stack()
            .stack_name(name)
            .template_body(template)
            .set_capabilities(Some(capabilities(capabilities_list)))
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn update_stack(
        &self,
        name: &str,
        template: &str,
        capabilities_list: &[String],
    ) -> Result<(), ProviderError> {
        debug!(stack = name, "UpdateStack");
        self.cloudformation
            .update_stack()
            .stack_name(name)
            .template_body(template)
            .set_capabilities(Some(capabilities(capabilities_list)))
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn delete_stack(&self, name: &str) -> Result<(), ProviderError> {
        debug!(stack = name, "DeleteStack");
        self.cloudformation
            .delete_stack()
            .stack_name(name)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn put_object(&self, request: PutObjectRequest) -> Result<(), ProviderError> {
        debug!(bucket = %request.bucket, key = %request.key, size = request.body.len(), "PutObject");
        self.s3
            .put_object()
            .bucket(request.bucket)
            .key(request.key)
            .server_side_encryption(ServerSideEncryption::Aes256)
            .body(ByteStream::from(request.body))
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn invoke(&self, request: InvokeRequest) -> Result<InvokeResponse, ProviderError> {
        debug!(function = %request.function_name, "Invoke");
        let result = self
            .lambda
            .invoke()
            .function_name(request.function_name)
            .invocation_type(InvocationType::from(request.invocation_type.as_str()))
            .log_type(LogType::from(request.log_type.as_str()))
            .set_payload(request.payload.map(Blob::new))
            .set_qualifier(request.qualifier)
            .set_client_context(request.client_context)
            .send()
            .await;

        match result {
            Ok(output) => Ok(InvokeResponse {
                status_code: u16::try_from(output.status_code()).unwrap_or(500),
                function_error: output.function_error().map(str::to_string),
                log_result: output.log_result().map(str::to_string),
                payload: output
                    .payload()
                    .map(|blob| blob.as_ref().to_vec())
                    .unwrap_or_default(),
            }),
            // Throttling and similar service errors still carry an HTTP
            // status, which is what the caller reports and exits with.
            Err(err) => match err.raw_response().map(|r| r.status().as_u16()) {
                Some(status) if err.code().is_some() => Ok(InvokeResponse {
                    status_code: status,
                    function_error: err.code().map(str::to_string),
                    log_result: None,
                    payload: err.message().unwrap_or_default().as_bytes().to_vec(),
                }),
                _ => Err(classify(err)),
            },
        }
    }
}
