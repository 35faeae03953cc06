//! engine::invoke
//!
//! Synchronous function invocation.
//!
//! # Design
//!
//! Payload and context accept either literal text or a `file://<path>`
//! reference. The context is base64-encoded before it is sent. With logs
//! enabled the decoded log tail and any non-`null` response are printed;
//! with logs disabled only failures are. A non-2xx status is reported on
//! the diagnostic stream and becomes the command's exit code.

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::provider::{InvokeRequest, Provider, ProviderError};
use crate::ui::output::Console;

/// Prefix marking a value as a path to read.
pub const FILE_PREFIX: &str = "file://";

/// Function name or ARN, optionally with a `:version` or `:alias` suffix.
pub const FUNCTION_NAME_PATTERN: &str = r"(arn:(aws[a-zA-Z-]*)?:lambda:)?([a-z]{2}(-gov)?-[a-z]+-\d{1}:)?(\d{12}:)?(function:)?([a-zA-Z0-9_.\-]+)(:(\$LATEST|[a-zA-Z0-9_\-]+))?";

/// Version or alias; may be empty.
pub const QUALIFIER_PATTERN: &str = r"(|[a-zA-Z0-9$_\-]+)";

static FUNCTION_NAME: Lazy<Regex> = Lazy::new(|| anchored(FUNCTION_NAME_PATTERN));
static QUALIFIER: Lazy<Regex> = Lazy::new(|| anchored(QUALIFIER_PATTERN));

fn anchored(pattern: &str) -> Regex {
    Regex::new(&format!("^(?:{})$", pattern)).expect("invalid built-in pattern")
}

/// Whether `name` is an acceptable function name.
///
/// # Example
///
/// ```
/// use stackrunner::engine::invoke::is_valid_function_name;
///
/// assert!(is_valid_function_name("my-function"));
/// assert!(is_valid_function_name("arn:aws:lambda:us-east-1:123456789012:function:my-function:$LATEST"));
/// assert!(!is_valid_function_name("my function"));
/// ```
pub fn is_valid_function_name(name: &str) -> bool {
    FUNCTION_NAME.is_match(name)
}

/// Whether `qualifier` is an acceptable version or alias.
pub fn is_valid_qualifier(qualifier: &str) -> bool {
    QUALIFIER.is_match(qualifier)
}

/// Errors from preparing or sending an invocation.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("could not read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Literal text, or the contents of the file a `file://` value names.
pub fn text_from(value: &str) -> Result<String, InvokeError> {
    match value.strip_prefix(FILE_PREFIX) {
        Some(path) => std::fs::read_to_string(path).map_err(|source| InvokeError::ReadFile {
            path: PathBuf::from(path),
            source,
        }),
        None => Ok(value.to_string()),
    }
}

/// A function invocation as requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub function_name: String,
    pub invocation_type: String,
    /// Ask for the log tail and print the response
    pub show_logs: bool,
    pub payload: Option<String>,
    pub qualifier: Option<String>,
    pub context: Option<String>,
}

impl Invocation {
    /// Resolve file references and encode the context.
    pub fn to_request(&self) -> Result<InvokeRequest, InvokeError> {
        let payload = self
            .payload
            .as_deref()
            .map(text_from)
            .transpose()?
            .map(String::into_bytes);
        let client_context = self
            .context
            .as_deref()
            .map(text_from)
            .transpose()?
            .map(|text| STANDARD.encode(text));

        Ok(InvokeRequest {
            function_name: self.function_name.clone(),
            invocation_type: self.invocation_type.clone(),
            log_type: if self.show_logs { "Tail" } else { "None" }.to_string(),
            payload,
            qualifier: self.qualifier.clone(),
            client_context,
        })
    }
}

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeOutcome {
    Succeeded,
    /// Non-2xx status code
    Failed(u16),
}

/// Send `invocation` once and report the result.
pub async fn invoke(
    provider: &dyn Provider,
    invocation: &Invocation,
    console: &mut Console,
) -> Result<InvokeOutcome, InvokeError> {
    let request = invocation.to_request()?;
    debug!(function = %request.function_name, log_type = %request.log_type, "invoking");
    let response = provider.invoke(request).await?;

    if let (true, Some(logs)) = (invocation.show_logs, response.log_result.as_deref()) {
        console.blank();
        console.line("Logs (max up to 4Kb)");
        match STANDARD.decode(logs) {
            Ok(bytes) => console.line(String::from_utf8_lossy(&bytes)),
            Err(err) => {
                warn!(%err, "log tail is not base64");
                console.line(logs);
            }
        }
    }

    let payload = String::from_utf8_lossy(&response.payload);
    if response.is_success() {
        if invocation.show_logs && payload != "null" {
            console.blank();
            console.line(format_args!("Response: {}", payload));
        }
        Ok(InvokeOutcome::Succeeded)
    } else {
        console.diag(format_args!("Error with status code {}", response.status_code));
        console.diag(response.function_error.as_deref().unwrap_or_default());
        console.diag(payload);
        Ok(InvokeOutcome::Failed(response.status_code))
    }
}
