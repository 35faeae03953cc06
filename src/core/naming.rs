//! core::naming
//!
//! Naming rules for uploaded artifacts and stack references.
//!
//! # Features
//!
//! - Generate unique object keys for uploaded code artifacts
//! - Parse `region:name` stack references used by `outputs`

use std::path::Path;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Timestamp layout embedded in generated keys.
const KEY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H:%M:%S%.3f";

/// Generate an object key for the artifact at `location`.
///
/// The key is `<uuid>-<timestamp>/<name>`, where `<name>` is the base name
/// of `location`, with `.zip` appended when the upload is an archive.
pub fn generate_key(location: &Path, archived: bool) -> String {
    key_for(location, archived, Uuid::new_v4(), Utc::now())
}

/// Deterministic core of [`generate_key`].
pub fn key_for(location: &Path, archived: bool, id: Uuid, now: DateTime<Utc>) -> String {
    let name = location
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    let name = if archived {
        format!("{}.zip", name)
    } else {
        name
    };

    format!("{}-{}/{}", id, now.format(KEY_TIMESTAMP_FORMAT), name)
}

/// A stack addressed by the `outputs` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackRef {
    /// Region the stack lives in
    pub region: String,
    /// Stack name, id, or a fragment of the id
    pub query: String,
}

impl StackRef {
    /// Parse `region:name`, or a bare `name` in `default_region`.
    ///
    /// Only the first `:` separates the region, so stack ids (which contain
    /// colons themselves) can still be addressed as `region:arn:...`.
    ///
    /// # Example
    ///
    /// ```
    /// use stackrunner::core::naming::StackRef;
    ///
    /// let r = StackRef::parse("eu-west-1:api", "us-east-1");
    /// assert_eq!(r.region, "eu-west-1");
    /// assert_eq!(r.query, "api");
    ///
    /// let r = StackRef::parse("api", "us-east-1");
    /// assert_eq!(r.region, "us-east-1");
    /// ```
    pub fn parse(reference: &str, default_region: &str) -> Self {
        match reference.split_once(':') {
            Some((region, query)) => StackRef {
                region: region.to_string(),
                query: query.to_string(),
            },
            None => StackRef {
                region: default_region.to_string(),
                query: reference.to_string(),
            },
        }
    }

    /// Parse a comma-separated list of references.
    pub fn parse_list(list: &str, default_region: &str) -> Vec<Self> {
        list.split(',')
            .filter(|s| !s.is_empty())
            .map(|s| Self::parse(s, default_region))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
            + chrono::Duration::milliseconds(42)
    }

    #[test]
    fn key_for_raw_upload_keeps_name() {
        let key = key_for(Path::new("build/handler.jar"), false, Uuid::nil(), fixed_time());
        assert_eq!(
            key,
            "00000000-0000-0000-0000-000000000000-2024-03-09-14:05:07.042/handler.jar"
        );
    }

    #[test]
    fn key_for_archive_appends_zip() {
        let key = key_for(Path::new("src/lambda"), true, Uuid::nil(), fixed_time());
        assert!(key.ends_with("/lambda.zip"), "{}", key);
    }

    #[test]
    fn generated_keys_are_unique() {
        let dir = TempDir::new().unwrap();
        assert_ne!(generate_key(dir.path(), true), generate_key(dir.path(), true));
    }

    #[test]
    fn stack_ref_splits_on_first_colon() {
        let r = StackRef::parse("us-west-2:arn:aws:cloudformation:stack/x", "eu-west-1");
        assert_eq!(r.region, "us-west-2");
        assert_eq!(r.query, "arn:aws:cloudformation:stack/x");
    }

    #[test]
    fn stack_ref_list() {
        let refs = StackRef::parse_list("a,eu-west-1:b,", "us-east-1");
        assert_eq!(
            refs,
            vec![
                StackRef {
                    region: "us-east-1".into(),
                    query: "a".into()
                },
                StackRef {
                    region: "eu-west-1".into(),
                    query: "b".into()
                },
            ]
        );
    }
}
