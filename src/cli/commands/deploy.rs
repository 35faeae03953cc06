//! deploy command - Create or update a stack from a template
//!
//! # Flow
//!
//! 1. Read the template (must exist; nothing remote happens otherwise)
//! 2. Create the stack if it is absent, update it otherwise
//! 3. Poll until the stack settles
//! 4. On success print the outputs and write them to `-output` if given
//!
//! An update with nothing to change counts as success and writes no
//! output file.

use std::fs;
use std::path::Path;

use crate::engine::{CommandOutcome, Context, DeployOutcome, Reconciler};
use crate::provider::Connector;
use crate::ui::output::Console;

use super::{write_file, CommandError};

pub(super) const DEPLOY_BANNER: &str = "#################### Stack Deploy #######################";

pub(super) async fn deploy(
    ctx: &Context,
    connector: &dyn Connector,
    console: &mut Console,
    region: &str,
    stack_name: &str,
    template: &Path,
    output: Option<&Path>,
) -> Result<CommandOutcome, CommandError> {
    if !template.is_file() {
        return Err(CommandError::TemplateNotFound(template.to_path_buf()));
    }
    let body = fs::read_to_string(template).map_err(|source| CommandError::ReadFile {
        path: template.to_path_buf(),
        source,
    })?;

    let provider = connector.connect(region).await?;
    console.banner(DEPLOY_BANNER);

    let outcome = Reconciler::new(
        provider.as_ref(),
        console,
        ctx.poll_interval,
        ctx.config.capabilities(),
    )
    .deploy(stack_name, &body)
    .await?;

    let result = match outcome {
        DeployOutcome::Unchanged => return Ok(CommandOutcome::Success),
        DeployOutcome::Converged(result) if result.success => result,
        DeployOutcome::Converged(_) => {
            console.failure("Stack Update Failure");
            return Ok(CommandOutcome::FAILED);
        }
    };

    console.banner("Stack Update Complete");
    let Some(snapshot) = result.snapshot else {
        return Ok(CommandOutcome::Success);
    };
    for output in &snapshot.outputs {
        console.line(format_args!("{}: {}", output.key, output.value));
    }
    console.blank();

    if let Some(path) = output {
        write_file(path, &snapshot.outputs_as_lines())?;
        tracing::debug!(path = %path.display(), "outputs written");
    }

    Ok(CommandOutcome::Success)
}
