//! core::types
//!
//! Domain types for remotely managed stacks.
//!
//! # Types
//!
//! - [`StackStatus`] - Lifecycle status of a stack
//! - [`StackSnapshot`] - One observation of a stack, taken per poll
//! - [`ResourceSnapshot`] - One observation of a resource inside a stack
//! - [`StackOutput`] - An exported key/value pair
//!
//! # Snapshots
//!
//! Snapshots are values. Every poll produces a fresh, independent snapshot
//! which is compared against the previous one and then dropped; nothing
//! mutates a snapshot after it has been built.

use std::fmt;

/// Resource type reported for the stack itself in progress lines.
pub const STACK_RESOURCE_TYPE: &str = "AWS::CloudFormation::Stack";

/// Lifecycle status of a stack.
///
/// Statuses the tool does not know about are kept verbatim in
/// [`StackStatus::Other`] so they still print correctly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StackStatus {
    CreateInProgress,
    CreateFailed,
    CreateComplete,
    RollbackInProgress,
    RollbackFailed,
    RollbackComplete,
    DeleteInProgress,
    DeleteFailed,
    DeleteComplete,
    UpdateInProgress,
    UpdateCompleteCleanupInProgress,
    UpdateComplete,
    UpdateFailed,
    UpdateRollbackInProgress,
    UpdateRollbackFailed,
    UpdateRollbackCompleteCleanupInProgress,
    UpdateRollbackComplete,
    ReviewInProgress,
    ImportInProgress,
    ImportComplete,
    ImportRollbackInProgress,
    ImportRollbackFailed,
    ImportRollbackComplete,
    Other(String),
}

/// Statuses from which a stack does not move without a new request.
pub const TERMINAL_STATUSES: &[StackStatus] = &[
    StackStatus::CreateComplete,
    StackStatus::CreateFailed,
    StackStatus::DeleteComplete,
    StackStatus::DeleteFailed,
    StackStatus::RollbackComplete,
    StackStatus::RollbackFailed,
    StackStatus::UpdateComplete,
    StackStatus::UpdateRollbackComplete,
    StackStatus::UpdateRollbackFailed,
];

/// Statuses that count as success for a create or update.
pub const DEPLOY_SUCCESS_STATUSES: &[StackStatus] =
    &[StackStatus::CreateComplete, StackStatus::UpdateComplete];

/// Statuses that count as success for a delete.
pub const DELETE_SUCCESS_STATUSES: &[StackStatus] = &[StackStatus::DeleteComplete];

/// Stable statuses a stack must be in for its outputs to be queried.
pub const QUERYABLE_STATUSES: &[StackStatus] = &[
    StackStatus::CreateComplete,
    StackStatus::UpdateComplete,
    StackStatus::UpdateRollbackComplete,
];

impl StackStatus {
    /// Parse a status as reported by the provider.
    ///
    /// # Example
    ///
    /// ```
    /// use stackrunner::core::types::StackStatus;
    ///
    /// assert_eq!(StackStatus::parse("CREATE_COMPLETE"), StackStatus::CreateComplete);
    /// assert_eq!(StackStatus::parse("SOMETHING_NEW").as_str(), "SOMETHING_NEW");
    /// ```
    pub fn parse(s: &str) -> Self {
        match s {
            "CREATE_IN_PROGRESS" => StackStatus::CreateInProgress,
            "CREATE_FAILED" => StackStatus::CreateFailed,
            "CREATE_COMPLETE" => StackStatus::CreateComplete,
            "ROLLBACK_IN_PROGRESS" => StackStatus::RollbackInProgress,
            "ROLLBACK_FAILED" => StackStatus::RollbackFailed,
            "ROLLBACK_COMPLETE" => StackStatus::RollbackComplete,
            "DELETE_IN_PROGRESS" => StackStatus::DeleteInProgress,
            "DELETE_FAILED" => StackStatus::DeleteFailed,
            "DELETE_COMPLETE" => StackStatus::DeleteComplete,
            "UPDATE_IN_PROGRESS" => StackStatus::UpdateInProgress,
            "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS" => StackStatus::UpdateCompleteCleanupInProgress,
            "UPDATE_COMPLETE" => StackStatus::UpdateComplete,
            "UPDATE_FAILED" => StackStatus::UpdateFailed,
            "UPDATE_ROLLBACK_IN_PROGRESS" => StackStatus::UpdateRollbackInProgress,
            "UPDATE_ROLLBACK_FAILED" => StackStatus::UpdateRollbackFailed,
            "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS" => {
                StackStatus::UpdateRollbackCompleteCleanupInProgress
            }
            "UPDATE_ROLLBACK_COMPLETE" => StackStatus::UpdateRollbackComplete,
            "REVIEW_IN_PROGRESS" => StackStatus::ReviewInProgress,
            "IMPORT_IN_PROGRESS" => StackStatus::ImportInProgress,
            "IMPORT_COMPLETE" => StackStatus::ImportComplete,
            "IMPORT_ROLLBACK_IN_PROGRESS" => StackStatus::ImportRollbackInProgress,
            "IMPORT_ROLLBACK_FAILED" => StackStatus::ImportRollbackFailed,
            "IMPORT_ROLLBACK_COMPLETE" => StackStatus::ImportRollbackComplete,
            other => StackStatus::Other(other.to_string()),
        }
    }

    /// The provider's spelling of this status.
    pub fn as_str(&self) -> &str {
        match self {
            StackStatus::CreateInProgress => "CREATE_IN_PROGRESS",
            StackStatus::CreateFailed => "CREATE_FAILED",
            StackStatus::CreateComplete => "CREATE_COMPLETE",
            StackStatus::RollbackInProgress => "ROLLBACK_IN_PROGRESS",
            StackStatus::RollbackFailed => "ROLLBACK_FAILED",
            StackStatus::RollbackComplete => "ROLLBACK_COMPLETE",
            StackStatus::DeleteInProgress => "DELETE_IN_PROGRESS",
            StackStatus::DeleteFailed => "DELETE_FAILED",
            StackStatus::DeleteComplete => "DELETE_COMPLETE",
            StackStatus::UpdateInProgress => "UPDATE_IN_PROGRESS",
            StackStatus::UpdateCompleteCleanupInProgress => "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS",
            StackStatus::UpdateComplete => "UPDATE_COMPLETE",
            StackStatus::UpdateFailed => "UPDATE_FAILED",
            StackStatus::UpdateRollbackInProgress => "UPDATE_ROLLBACK_IN_PROGRESS",
            StackStatus::UpdateRollbackFailed => "UPDATE_ROLLBACK_FAILED",
            StackStatus::UpdateRollbackCompleteCleanupInProgress => {
                "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS"
            }
            StackStatus::UpdateRollbackComplete => "UPDATE_ROLLBACK_COMPLETE",
            StackStatus::ReviewInProgress => "REVIEW_IN_PROGRESS",
            StackStatus::ImportInProgress => "IMPORT_IN_PROGRESS",
            StackStatus::ImportComplete => "IMPORT_COMPLETE",
            StackStatus::ImportRollbackInProgress => "IMPORT_ROLLBACK_IN_PROGRESS",
            StackStatus::ImportRollbackFailed => "IMPORT_ROLLBACK_FAILED",
            StackStatus::ImportRollbackComplete => "IMPORT_ROLLBACK_COMPLETE",
            StackStatus::Other(s) => s,
        }
    }

    /// Whether the stack has stopped moving.
    pub fn is_terminal(&self) -> bool {
        TERMINAL_STATUSES.contains(self)
    }

    /// Whether outputs of a stack in this status may be queried.
    pub fn is_queryable(&self) -> bool {
        QUERYABLE_STATUSES.contains(self)
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An exported output of a stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOutput {
    pub key: String,
    pub value: String,
}

impl StackOutput {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One observation of a resource inside a stack.
///
/// The logical id is the identity used when diffing two observations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSnapshot {
    /// Template-scoped identifier
    pub logical_id: String,
    /// Resource type, e.g. `AWS::S3::Bucket`
    pub resource_type: String,
    /// Resource status as reported by the provider
    pub status: String,
    pub status_reason: Option<String>,
    /// Provider-assigned identifier, once one exists
    pub physical_id: Option<String>,
}

/// One observation of a stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSnapshot {
    pub id: String,
    pub name: String,
    pub status: StackStatus,
    pub status_reason: Option<String>,
    /// Resources, in the order the provider listed them
    pub resources: Vec<ResourceSnapshot>,
    /// Exported outputs, in the order the provider listed them
    pub outputs: Vec<StackOutput>,
}

impl StackSnapshot {
    /// Outputs rendered as `key=value` lines joined by newlines.
    ///
    /// This is the format of the `-output` file and of the `outputs` command.
    pub fn outputs_as_lines(&self) -> String {
        self.outputs
            .iter()
            .map(|o| format!("{}={}", o.key, o.value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(outputs: Vec<StackOutput>) -> StackSnapshot {
        StackSnapshot {
            id: "arn:stack/demo/1".to_string(),
            name: "demo".to_string(),
            status: StackStatus::CreateComplete,
            status_reason: None,
            resources: vec![],
            outputs,
        }
    }

    #[test]
    fn status_parse_and_display_agree() {
        for status in TERMINAL_STATUSES {
            assert_eq!(&StackStatus::parse(status.as_str()), status);
            assert_eq!(format!("{}", status), status.as_str());
        }
        assert_eq!(
            StackStatus::parse("UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS"),
            StackStatus::UpdateRollbackCompleteCleanupInProgress
        );
    }

    #[test]
    fn unknown_status_is_kept_verbatim() {
        let status = StackStatus::parse("BRAND_NEW_STATE");
        assert_eq!(status, StackStatus::Other("BRAND_NEW_STATE".to_string()));
        assert!(!status.is_terminal());
    }

    #[test]
    fn terminal_statuses() {
        assert!(StackStatus::CreateComplete.is_terminal());
        assert!(StackStatus::UpdateRollbackFailed.is_terminal());
        assert!(!StackStatus::CreateInProgress.is_terminal());
        assert!(!StackStatus::UpdateCompleteCleanupInProgress.is_terminal());
        assert!(!StackStatus::UpdateFailed.is_terminal());
    }

    #[test]
    fn queryable_statuses() {
        assert!(StackStatus::UpdateRollbackComplete.is_queryable());
        assert!(!StackStatus::RollbackComplete.is_queryable());
        assert!(!StackStatus::CreateInProgress.is_queryable());
    }

    #[test]
    fn outputs_as_lines_keeps_order() {
        let stack = snapshot(vec![
            StackOutput::new("Zeta", "1"),
            StackOutput::new("Alpha", "two=2"),
        ]);
        assert_eq!(stack.outputs_as_lines(), "Zeta=1\nAlpha=two=2");
    }

    #[test]
    fn outputs_as_lines_empty() {
        assert_eq!(snapshot(vec![]).outputs_as_lines(), "");
    }
}
