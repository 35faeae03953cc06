//! engine::query
//!
//! Read-only stack lookups: listing and output search.

use tracing::debug;

use crate::core::types::StackSnapshot;
use crate::provider::{Provider, ProviderError};
use crate::ui::output::Console;

/// Print every stack in the region with its status, unfiltered.
pub async fn list_stacks(
    provider: &dyn Provider,
    region: &str,
    console: &mut Console,
) -> Result<(), ProviderError> {
    let stacks = provider.list_stacks().await?;
    debug!(region, count = stacks.len(), "listed stacks");

    console.banner(format_args!("Stacks in the {} region", region));
    for stack in &stacks {
        console.line(format_args!("{} {}", stack.name, stack.status));
    }
    console.blank();
    Ok(())
}

/// Whether `stack` answers to `query`: exact id, exact name, or an id
/// containing the query.
pub fn matches(stack: &StackSnapshot, query: &str) -> bool {
    stack.id == query || stack.name == query || stack.id.contains(query)
}

/// Pick the stack `query` refers to.
///
/// Only stacks in a queryable status are considered; among several
/// matches the lexicographically smallest name wins.
pub fn find<'a>(stacks: &'a [StackSnapshot], query: &str) -> Option<&'a StackSnapshot> {
    stacks
        .iter()
        .filter(|s| s.status.is_queryable())
        .filter(|s| matches(s, query))
        .min_by(|a, b| a.name.cmp(&b.name))
}

/// Outputs of the stack `query` refers to as `key=value` lines, or an
/// empty string when nothing matches.
pub fn find_outputs(stacks: &[StackSnapshot], query: &str) -> String {
    find(stacks, query)
        .map(StackSnapshot::outputs_as_lines)
        .unwrap_or_default()
}

/// Fetch the region's stacks and render the outputs for `query`.
pub async fn outputs_for(provider: &dyn Provider, query: &str) -> Result<String, ProviderError> {
    let stacks = provider.list_stacks().await?;
    Ok(find_outputs(&stacks, query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{StackOutput, StackStatus};
    use crate::provider::mock::{stack, MockProvider};
    use crate::ui::output::{capture, Verbosity};

    fn with_output(mut s: StackSnapshot, key: &str, value: &str) -> StackSnapshot {
        s.outputs.push(StackOutput::new(key, value));
        s
    }

    #[test]
    fn matches_id_name_or_id_fragment() {
        let s = stack("api-prod", StackStatus::CreateComplete);
        assert!(matches(&s, "api-prod"));
        assert!(matches(&s, &s.id.clone()));
        assert!(matches(&s, "stack/api"));
        assert!(!matches(&s, "web"));
    }

    #[test]
    fn transitional_stacks_are_ignored() {
        let stacks = vec![
            with_output(stack("api", StackStatus::UpdateInProgress), "A", "1"),
            with_output(stack("api", StackStatus::RollbackComplete), "A", "2"),
        ];
        assert_eq!(find_outputs(&stacks, "api"), "");
    }

    #[test]
    fn smallest_name_wins() {
        let stacks = vec![
            with_output(stack("api-b", StackStatus::UpdateComplete), "Url", "b"),
            with_output(stack("api-a", StackStatus::UpdateRollbackComplete), "Url", "a"),
            with_output(stack("api-c", StackStatus::CreateComplete), "Url", "c"),
        ];
        assert_eq!(find_outputs(&stacks, "api"), "Url=a");
    }

    #[test]
    fn outputs_keep_order() {
        let s = with_output(
            with_output(stack("web", StackStatus::CreateComplete), "Zeta", "1"),
            "Alpha",
            "2",
        );
        assert_eq!(find_outputs(&[s], "web"), "Zeta=1\nAlpha=2");
    }

    #[tokio::test]
    async fn list_prints_every_stack() {
        let provider = MockProvider::new()
            .with_stack(stack("api", StackStatus::CreateComplete))
            .with_stack(stack("web", StackStatus::UpdateRollbackInProgress));
        let (mut console, out, _) = capture(Verbosity::Normal);

        list_stacks(&provider, "eu-west-1", &mut console)
            .await
            .unwrap();

        let contents = out.contents();
        assert!(contents.contains("Stacks in the eu-west-1 region"));
        assert!(contents.contains("api CREATE_COMPLETE\n"));
        assert!(contents.contains("web UPDATE_ROLLBACK_IN_PROGRESS\n"));
    }
}
