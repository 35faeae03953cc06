//! delete command - Delete one or more stacks
//!
//! # Flow
//!
//! For each comma-separated name, in order:
//! 1. Skip (with a message) if the stack does not exist
//! 2. Unless `--force`, ask for confirmation; anything but `y` skips it
//! 3. Delete and poll until the stack is gone or settles
//!
//! The first failed deletion stops the command.

use crate::engine::reconcile::stack_with;
use crate::engine::{CommandOutcome, Context, Reconciler};
use crate::provider::Connector;
use crate::ui::output::Console;
use crate::ui::prompts::Confirm;

use super::CommandError;

pub(super) const DELETE_BANNER: &str = "#################### Stack Delete #######################";

pub(super) async fn delete(
    ctx: &Context,
    connector: &dyn Connector,
    prompt: &mut dyn Confirm,
    console: &mut Console,
    region: &str,
    stack_names: &[String],
    force: bool,
) -> Result<CommandOutcome, CommandError> {
    let provider = connector.connect(region).await?;

    for name in stack_names {
        if stack_with(provider.as_ref(), name).await?.is_none() {
            console.banner(format_args!(
                "Stack {} in region {} does not exist",
                name, region
            ));
            continue;
        }

        if !force {
            let question = format!(
                "Are you sure you want to delete the stack named {} in the {} region? (y/n)",
                name, region
            );
            console.line(&question);
            console.flush();
            if !prompt.confirm(&question)? {
                tracing::info!(stack = %name, "deletion not confirmed");
                continue;
            }
            console.line("You may also use the --force argument to ignore prompt");
        }

        console.banner(DELETE_BANNER);
        let outcome = Reconciler::new(
            provider.as_ref(),
            console,
            ctx.poll_interval,
            ctx.config.capabilities(),
        )
        .delete(name)
        .await?;

        if !outcome.success {
            console.failure("Stack Delete Failure");
            return Ok(CommandOutcome::FAILED);
        }
        console.banner("Stack Delete Complete");
    }

    Ok(CommandOutcome::Success)
}
