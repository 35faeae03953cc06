//! engine::progress
//!
//! Progress lines emitted while a stack converges.
//!
//! # Design
//!
//! The reconciler re-fetches the full stack state on every poll. To keep
//! output monotonic, only transitions are rendered: a resource line is
//! produced when a resource first appears, when its status changes, or
//! when it gains a new non-empty reason. Resources are matched by logical
//! id only.
//!
//! # Example
//!
//! ```
//! use stackrunner::engine::progress::status_line;
//!
//! let line = status_line("Bucket", "AWS::S3::Bucket", "CREATE_FAILED", Some("Access Denied"), None);
//! assert_eq!(line, "Bucket AWS::S3::Bucket Status became CREATE_FAILED because Access Denied");
//! ```

use crate::core::types::{ResourceSnapshot, StackSnapshot, STACK_RESOURCE_TYPE};

/// Render one transition:
/// `<logicalId> <type> Status became <status>[ because <reason>][ (<physicalId>)]`.
pub fn status_line(
    logical_id: &str,
    resource_type: &str,
    status: &str,
    reason: Option<&str>,
    physical_id: Option<&str>,
) -> String {
    let mut line = format!("{} {} Status became {}", logical_id, resource_type, status);
    if let Some(reason) = reason {
        line.push_str(" because ");
        line.push_str(reason);
    }
    if let Some(physical_id) = physical_id {
        line.push_str(" (");
        line.push_str(physical_id);
        line.push(')');
    }
    line
}

/// Line for a resource's current state.
pub fn resource_line(resource: &ResourceSnapshot) -> String {
    status_line(
        &resource.logical_id,
        &resource.resource_type,
        &resource.status,
        resource.status_reason.as_deref(),
        resource.physical_id.as_deref(),
    )
}

/// Line for the stack itself, rendered as a resource of the stack type
/// whose physical id is the stack id.
pub fn stack_line(stack: &StackSnapshot) -> String {
    status_line(
        &stack.name,
        STACK_RESOURCE_TYPE,
        stack.status.as_str(),
        stack.status_reason.as_deref(),
        Some(&stack.id),
    )
}

/// Lines describing what changed between two resource lists.
///
/// Current resources come first, in their listing order, followed by one
/// `<logicalId> has been removed` line per vanished resource.
pub fn resource_changes(previous: &[ResourceSnapshot], current: &[ResourceSnapshot]) -> Vec<String> {
    let mut lines: Vec<String> = current
        .iter()
        .filter(|resource| {
            match previous.iter().find(|p| p.logical_id == resource.logical_id) {
                None => true,
                Some(old) => {
                    old.status != resource.status
                        || (resource.status_reason.is_some()
                            && old.status_reason != resource.status_reason)
                }
            }
        })
        .map(resource_line)
        .collect();

    lines.extend(
        previous
            .iter()
            .filter(|old| !current.iter().any(|r| r.logical_id == old.logical_id))
            .map(|old| format!("{} has been removed", old.logical_id)),
    );

    lines
}
