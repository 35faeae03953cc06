//! upload command - Package a code artifact and store it
//!
//! A plain file is uploaded as-is unless `--zip` asks for an archive; a
//! directory is always archived. Without `-key` a unique key is generated.
//! The artifact is built before connecting, so a missing path never
//! reaches the provider.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::core::archive::{self, PackageOptions};
use crate::core::naming::generate_key;
use crate::engine::{CommandOutcome, Context};
use crate::provider::{Connector, PutObjectRequest};
use crate::ui::output::Console;

use super::CommandError;

#[allow(clippy::too_many_arguments)]
pub(super) async fn upload(
    ctx: &Context,
    connector: &dyn Connector,
    console: &mut Console,
    region: &str,
    bucket: &str,
    location: &Path,
    key: Option<&str>,
    zip: bool,
) -> Result<CommandOutcome, CommandError> {
    let options = PackageOptions {
        skip_archives: ctx.config.skip_archives(),
    };
    let archived = zip || location.is_dir();
    let body = if zip {
        archive::archive(location, options)?
    } else {
        archive::upload_bytes(location, options)?
    };

    let key = key
        .map(String::from)
        .unwrap_or_else(|| generate_key(location, archived));
    let size = body.len();
    let digest = hex::encode(Sha256::digest(&body));

    let provider = connector.connect(region).await?;
    provider
        .put_object(PutObjectRequest {
            bucket: bucket.to_string(),
            key: key.clone(),
            body,
        })
        .await?;

    console.line(format_args!("Uploaded s3://{}/{}", bucket, key));
    console.line(format_args!("Size: {} bytes", size));
    console.line(format_args!("SHA-256: {}", digest));
    Ok(CommandOutcome::Success)
}
