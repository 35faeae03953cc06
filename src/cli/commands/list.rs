//! list command - Print every stack in a region

use crate::engine::query;
use crate::engine::CommandOutcome;
use crate::provider::Connector;
use crate::ui::output::Console;

use super::CommandError;

/// List all stacks in `region` with their status.
pub(super) async fn list(
    connector: &dyn Connector,
    region: &str,
    console: &mut Console,
) -> Result<CommandOutcome, CommandError> {
    let provider = connector.connect(region).await?;
    query::list_stacks(provider.as_ref(), region, console).await?;
    Ok(CommandOutcome::Success)
}
