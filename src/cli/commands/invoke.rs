//! invoke command - Invoke a function and report its result

use crate::engine::invoke::{self as engine_invoke, InvokeOutcome};
use crate::engine::{CommandOutcome, Invocation};
use crate::provider::Connector;
use crate::ui::output::Console;

use super::CommandError;

/// Invoke once; a non-2xx status becomes the exit code.
pub(super) async fn invoke(
    connector: &dyn Connector,
    console: &mut Console,
    region: &str,
    invocation: &Invocation,
) -> Result<CommandOutcome, CommandError> {
    let provider = connector.connect(region).await?;
    let outcome = engine_invoke::invoke(provider.as_ref(), invocation, console).await?;

    Ok(match outcome {
        InvokeOutcome::Succeeded => CommandOutcome::Success,
        InvokeOutcome::Failed(status) => CommandOutcome::Failure(i32::from(status)),
    })
}
