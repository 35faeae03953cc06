//! engine::reconcile
//!
//! The stack reconciliation state machine.
//!
//! # Lifecycle
//!
//! ```text
//! Querying -> {Creating | Updating | Deleting} -> Polling -> Terminal(Success | Failure)
//! ```
//!
//! - **Querying** asks for the named stack. The provider's canonical
//!   "does not exist" error means absent and selects create over update.
//! - **Creating/Updating/Deleting** issues exactly one mutating request.
//!   Mutating requests are never retried.
//! - **Polling** re-reads the stack and its resources on a fixed interval
//!   until the status is terminal or the stack is gone. Only transitions
//!   are printed (see [`progress`](super::progress)).
//!
//! # Invariants
//!
//! - A terminal status ends the loop on the poll that observed it; no
//!   further remote reads happen.
//! - A stack that disappears while polling ends the loop; the verdict is
//!   success only when `DELETE_COMPLETE` is in the caller's success set.
//! - Each poll produces fresh snapshots; the previous observation is an
//!   immutable value replaced every iteration.
//! - There is no deadline: a stack that never settles polls forever.

use std::time::Duration;

use tracing::{debug, info};

use super::progress::{resource_changes, stack_line};
use crate::core::types::{
    ResourceSnapshot, StackSnapshot, StackStatus, DELETE_SUCCESS_STATUSES,
    DEPLOY_SUCCESS_STATUSES,
};
use crate::provider::{Provider, ProviderError};
use crate::ui::output::Console;

/// Terminal result of a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Whether the final status is in the operation's success set
    pub success: bool,
    /// Last snapshot observed, with its resources; `None` if the stack is gone
    pub snapshot: Option<StackSnapshot>,
}

/// Result of a create-or-update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// The stack was created or updated and polled to a terminal status.
    Converged(ReconcileOutcome),
    /// The provider reported there was nothing to update.
    Unchanged,
}

impl DeployOutcome {
    /// Whether the command should report success.
    pub fn is_success(&self) -> bool {
        match self {
            DeployOutcome::Converged(outcome) => outcome.success,
            DeployOutcome::Unchanged => true,
        }
    }
}

/// The mutating request issued for a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    fn verb(self) -> &'static str {
        match self {
            Action::Create => "Creating",
            Action::Update => "Updating",
            Action::Delete => "Deleting",
        }
    }
}

/// What the previous poll saw.
#[derive(Debug, Clone)]
struct Observation {
    status: StackStatus,
    reason: Option<String>,
    resources: Vec<ResourceSnapshot>,
}

impl Observation {
    fn of(stack: &StackSnapshot) -> Self {
        Self {
            status: stack.status.clone(),
            reason: stack.status_reason.clone(),
            resources: stack.resources.clone(),
        }
    }
}

/// Look a stack up, treating the canonical not-found error as absent.
///
/// Any other error is returned unchanged.
pub async fn stack_with(
    provider: &dyn Provider,
    name: &str,
) -> Result<Option<StackSnapshot>, ProviderError> {
    match provider.describe_stack(name).await {
        Ok(stack) => Ok(stack),
        Err(err) if err.is_stack_missing(name) => {
            debug!(stack = name, "stack does not exist");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Drives one stack to a terminal state.
pub struct Reconciler<'a> {
    provider: &'a dyn Provider,
    console: &'a mut Console,
    poll_interval: Duration,
    capabilities: Vec<String>,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        provider: &'a dyn Provider,
        console: &'a mut Console,
        poll_interval: Duration,
        capabilities: Vec<String>,
    ) -> Self {
        Self {
            provider,
            console,
            poll_interval,
            capabilities,
        }
    }

    /// Look a stack up, treating the canonical not-found error as absent.
    pub async fn stack_with(&self, name: &str) -> Result<Option<StackSnapshot>, ProviderError> {
        stack_with(self.provider, name).await
    }

    /// Create the stack, or update it if it already exists, then poll.
    ///
    /// "No updates are to be performed." is reported as
    /// [`DeployOutcome::Unchanged`]; every other provider error is returned.
    pub async fn deploy(&mut self, name: &str, template: &str) -> Result<DeployOutcome, ProviderError> {
        let action = match self.stack_with(name).await? {
            Some(_) => Action::Update,
            None => Action::Create,
        };
        info!(stack = name, ?action, "submitting stack");

        let request = match action {
            Action::Update => {
                self.provider
                    .update_stack(name, template, &self.capabilities)
                    .await
            }
            _ => {
                self.provider
                    .create_stack(name, template, &self.capabilities)
                    .await
            }
        };

        match request {
            Ok(()) => {}
            Err(err) if err.is_no_updates() => {
                self.console.banner("Update Complete (No Change)");
                return Ok(DeployOutcome::Unchanged);
            }
            Err(err) => return Err(err),
        }

        self.announce(action, name);
        let outcome = self.wait_for(name, DEPLOY_SUCCESS_STATUSES).await?;
        Ok(DeployOutcome::Converged(outcome))
    }

    /// Delete the stack, then poll until it is gone or terminal.
    pub async fn delete(&mut self, name: &str) -> Result<ReconcileOutcome, ProviderError> {
        info!(stack = name, "deleting stack");
        self.provider.delete_stack(name).await?;
        self.announce(Action::Delete, name);
        self.wait_for(name, DELETE_SUCCESS_STATUSES).await
    }

    fn announce(&mut self, action: Action, name: &str) {
        self.console
            .banner(format_args!("{} Stack {}", action.verb(), name));
    }

    /// Poll `name` until its status is terminal or it disappears.
    ///
    /// The verdict is whether the final status is in `success`.
    pub async fn wait_for(
        &mut self,
        name: &str,
        success: &[StackStatus],
    ) -> Result<ReconcileOutcome, ProviderError> {
        let gone = ReconcileOutcome {
            success: success.contains(&StackStatus::DeleteComplete),
            snapshot: None,
        };
        let mut previous: Option<Observation> = None;

        loop {
            let Some(mut stack) = self.stack_with(name).await? else {
                debug!(stack = name, "stack gone while polling");
                return Ok(gone);
            };

            stack.resources = match self.provider.describe_stack_resources(name).await {
                Ok(resources) => resources,
                Err(err) if err.is_stack_missing(name) => {
                    debug!(stack = name, "stack gone while listing resources");
                    return Ok(gone);
                }
                Err(err) => return Err(err),
            };

            if let Some(prev) = previous.as_ref().filter(|p| !p.resources.is_empty()) {
                for line in resource_changes(&prev.resources, &stack.resources) {
                    self.console.line(line);
                }
            }

            let stack_changed = previous
                .as_ref()
                .map_or(true, |p| p.status != stack.status || p.reason != stack.status_reason);
            if stack_changed {
                self.console.line(stack_line(&stack));
            }

            if stack.status.is_terminal() {
                debug!(stack = name, status = %stack.status, "terminal status reached");
                return Ok(ReconcileOutcome {
                    success: success.contains(&stack.status),
                    snapshot: Some(stack),
                });
            }

            previous = Some(Observation::of(&stack));
            debug!(stack = name, status = %stack.status, interval = ?self.poll_interval, "waiting");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::StackOutput;
    use crate::provider::mock::{resource, stack, FailOn, MockOperation, MockProvider};
    use crate::ui::output::{capture, Verbosity};

    fn frame(status: StackStatus, resources: Vec<ResourceSnapshot>) -> Option<StackSnapshot> {
        let mut snapshot = stack("demo", status);
        snapshot.resources = resources;
        Some(snapshot)
    }

    fn caps() -> Vec<String> {
        vec!["CAPABILITY_NAMED_IAM".to_string()]
    }

    #[tokio::test]
    async fn missing_stack_is_created() {
        let provider = MockProvider::new().with_script(
            "demo",
            vec![None, frame(StackStatus::CreateComplete, vec![])],
        );
        let (mut console, out, _) = capture(Verbosity::Normal);

        let outcome = Reconciler::new(&provider, &mut console, Duration::ZERO, caps())
            .deploy("demo", "{}")
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert!(provider.operations().contains(&MockOperation::CreateStack {
            name: "demo".into(),
            template: "{}".into(),
            capabilities: caps(),
        }));
        assert!(out.contents().contains("Creating Stack demo"));
    }

    #[tokio::test]
    async fn existing_stack_is_updated() {
        let provider = MockProvider::new().with_script(
            "demo",
            vec![
                frame(StackStatus::CreateComplete, vec![]),
                frame(StackStatus::UpdateInProgress, vec![]),
                frame(StackStatus::UpdateComplete, vec![]),
            ],
        );
        let (mut console, out, _) = capture(Verbosity::Normal);

        let outcome = Reconciler::new(&provider, &mut console, Duration::ZERO, caps())
            .deploy("demo", "{}")
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert!(provider
            .operations()
            .iter()
            .any(|op| matches!(op, MockOperation::UpdateStack { .. })));
        assert!(out.contents().contains("Updating Stack demo"));
    }

    #[tokio::test]
    async fn no_updates_is_success_without_polling() {
        let provider = MockProvider::new()
            .with_stack(stack("demo", StackStatus::UpdateComplete))
            .fail_on(FailOn::UpdateStack(ProviderError::Validation {
                message: "No updates are to be performed.".into(),
            }));
        let (mut console, out, _) = capture(Verbosity::Normal);

        let outcome = Reconciler::new(&provider, &mut console, Duration::ZERO, caps())
            .deploy("demo", "{}")
            .await
            .unwrap();

        assert_eq!(outcome, DeployOutcome::Unchanged);
        assert_eq!(provider.describe_count("demo"), 1);
        assert!(out.contents().contains("Update Complete (No Change)"));
    }

    #[tokio::test]
    async fn other_validation_errors_propagate() {
        let provider = MockProvider::new().fail_on(FailOn::CreateStack(ProviderError::Validation {
            message: "Template format error: JSON not well-formed.".into(),
        }));
        let (mut console, _, _) = capture(Verbosity::Normal);

        let err = Reconciler::new(&provider, &mut console, Duration::ZERO, caps())
            .deploy("demo", "not json")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Template format error: JSON not well-formed.");
    }

    #[tokio::test]
    async fn other_describe_errors_propagate() {
        let provider = MockProvider::new().fail_on(FailOn::DescribeStack(ProviderError::Api {
            code: "AccessDenied".into(),
            message: "not authorized".into(),
        }));
        let (mut console, _, _) = capture(Verbosity::Normal);

        let result = Reconciler::new(&provider, &mut console, Duration::ZERO, caps())
            .deploy("demo", "{}")
            .await;

        assert!(result.is_err());
        assert!(!provider.operations().iter().any(MockOperation::is_mutating));
    }

    #[tokio::test]
    async fn terminal_status_stops_on_the_same_poll() {
        let provider = MockProvider::new().with_script(
            "demo",
            vec![
                frame(StackStatus::CreateInProgress, vec![]),
                frame(StackStatus::RollbackComplete, vec![]),
                frame(StackStatus::DeleteInProgress, vec![]),
            ],
        );
        let (mut console, _, _) = capture(Verbosity::Normal);

        let outcome = Reconciler::new(&provider, &mut console, Duration::ZERO, caps())
            .wait_for("demo", DEPLOY_SUCCESS_STATUSES)
            .await
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(
            outcome.snapshot.map(|s| s.status),
            Some(StackStatus::RollbackComplete)
        );
        assert_eq!(provider.describe_count("demo"), 2);
    }

    #[tokio::test]
    async fn unchanged_poll_prints_nothing() {
        let resources = vec![resource("Bucket", "AWS::S3::Bucket", "CREATE_IN_PROGRESS")];
        let provider = MockProvider::new().with_script(
            "demo",
            vec![
                frame(StackStatus::CreateInProgress, resources.clone()),
                frame(StackStatus::CreateInProgress, resources.clone()),
                frame(StackStatus::CreateInProgress, resources),
                frame(StackStatus::CreateFailed, vec![]),
            ],
        );
        let (mut console, out, _) = capture(Verbosity::Quiet);

        Reconciler::new(&provider, &mut console, Duration::ZERO, caps())
            .wait_for("demo", DEPLOY_SUCCESS_STATUSES)
            .await
            .unwrap();

        let lines = out.lines();
        assert_eq!(lines.len(), 3, "{:?}", lines);
        assert!(lines[0].contains("Status became CREATE_IN_PROGRESS"));
        assert_eq!(lines[1], "Bucket has been removed");
        assert!(lines[2].contains("Status became CREATE_FAILED"));
    }

    #[tokio::test]
    async fn stack_reason_change_is_reported() {
        let mut first = stack("demo", StackStatus::UpdateRollbackInProgress);
        first.status_reason = Some("Resource failed".into());
        let mut second = first.clone();
        second.status_reason = Some("Rolling back".into());
        let provider = MockProvider::new().with_script(
            "demo",
            vec![
                Some(first.clone()),
                Some(first),
                Some(second),
                Some(stack("demo", StackStatus::UpdateRollbackComplete)),
            ],
        );
        let (mut console, out, _) = capture(Verbosity::Quiet);

        Reconciler::new(&provider, &mut console, Duration::ZERO, caps())
            .wait_for("demo", DEPLOY_SUCCESS_STATUSES)
            .await
            .unwrap();

        let lines = out.lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("because Resource failed"));
        assert!(lines[1].contains("because Rolling back"));
        assert!(lines[2].contains("UPDATE_ROLLBACK_COMPLETE"));
    }

    #[tokio::test]
    async fn disappearing_stack_completes_delete() {
        let provider = MockProvider::new().with_script(
            "demo",
            vec![frame(StackStatus::DeleteInProgress, vec![]), None],
        );
        let (mut console, _, _) = capture(Verbosity::Normal);

        let outcome = Reconciler::new(&provider, &mut console, Duration::ZERO, caps())
            .delete("demo")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ReconcileOutcome {
                success: true,
                snapshot: None
            }
        );
    }

    #[tokio::test]
    async fn disappearing_stack_fails_deploy() {
        let provider = MockProvider::new().with_script(
            "demo",
            vec![frame(StackStatus::CreateInProgress, vec![]), None],
        );
        let (mut console, _, _) = capture(Verbosity::Normal);

        let outcome = Reconciler::new(&provider, &mut console, Duration::ZERO, caps())
            .wait_for("demo", DEPLOY_SUCCESS_STATUSES)
            .await
            .unwrap();

        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn delete_failed_is_failure() {
        let provider = MockProvider::new().with_script(
            "demo",
            vec![
                frame(StackStatus::DeleteInProgress, vec![]),
                frame(StackStatus::DeleteFailed, vec![]),
            ],
        );
        let (mut console, _, _) = capture(Verbosity::Normal);

        let outcome = Reconciler::new(&provider, &mut console, Duration::ZERO, caps())
            .delete("demo")
            .await
            .unwrap();

        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn final_snapshot_carries_outputs() {
        let mut done = stack("demo", StackStatus::CreateComplete);
        done.outputs = vec![StackOutput::new("Url", "https://example.com")];
        let provider = MockProvider::new().with_stack(done);
        let (mut console, _, _) = capture(Verbosity::Normal);

        let outcome = Reconciler::new(&provider, &mut console, Duration::ZERO, caps())
            .wait_for("demo", DEPLOY_SUCCESS_STATUSES)
            .await
            .unwrap();

        let snapshot = outcome.snapshot.unwrap();
        assert_eq!(snapshot.outputs_as_lines(), "Url=https://example.com");
    }
}
