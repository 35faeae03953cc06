//! outputs command - Print the outputs of stacks found by name or id
//!
//! Each reference is looked up in its own region and printed as
//! `key=value` lines. A reference matching nothing prints an empty line.

use crate::core::naming::StackRef;
use crate::engine::query;
use crate::engine::CommandOutcome;
use crate::provider::Connector;
use crate::ui::output::Console;

use super::CommandError;

pub(super) async fn outputs(
    connector: &dyn Connector,
    console: &mut Console,
    stacks: &[StackRef],
) -> Result<CommandOutcome, CommandError> {
    for stack in stacks {
        let provider = connector.connect(&stack.region).await?;
        let lines = query::outputs_for(provider.as_ref(), &stack.query).await?;
        console.line(lines);
    }
    Ok(CommandOutcome::Success)
}
