//! core::config::schema
//!
//! Configuration schema types.
//!
//! Both the global and the project file share one schema; the project file
//! overrides the global one field by field.
//!
//! # Validation
//!
//! Values are validated after parsing (e.g. the poll interval must be
//! positive, capabilities must look like `CAPABILITY_*`).

use serde::Deserialize;

use super::ConfigError;

/// Contents of one configuration file.
///
/// # Example
///
/// ```toml
/// region = "eu-west-1"
/// poll_interval_secs = 5
/// capabilities = ["CAPABILITY_NAMED_IAM"]
///
/// [package]
/// skip_archives = false
///
/// [invoke]
/// invocation_type = "RequestResponse"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Region used when `-region` is not given
    pub region: Option<String>,

    /// Seconds between two status queries while waiting on a stack
    pub poll_interval_secs: Option<u64>,

    /// Capabilities acknowledged on create and update
    pub capabilities: Option<Vec<String>>,

    /// Packaging settings
    pub package: Option<PackageConfig>,

    /// Invocation settings
    pub invoke: Option<InvokeConfig>,
}

/// Packaging settings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PackageConfig {
    /// Leave already-zipped files out of directory archives
    pub skip_archives: Option<bool>,
}

/// Invocation settings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InvokeConfig {
    /// Invocation type used when `-type` is not given
    pub invocation_type: Option<String>,
}

impl FileConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(region) = &self.region {
            if region.trim().is_empty() {
                return Err(ConfigError::InvalidValue("region must not be empty".into()));
            }
        }

        if self.poll_interval_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "poll_interval_secs must be at least 1".into(),
            ));
        }

        if let Some(capabilities) = &self.capabilities {
            if let Some(bad) = capabilities.iter().find(|c| !c.starts_with("CAPABILITY_")) {
                return Err(ConfigError::InvalidValue(format!(
                    "unknown capability '{}'",
                    bad
                )));
            }
        }

        if let Some(invoke) = &self.invoke {
            if let Some(kind) = &invoke.invocation_type {
                if !matches!(kind.as_str(), "RequestResponse" | "Event" | "DryRun") {
                    return Err(ConfigError::InvalidValue(format!(
                        "invocation_type must be RequestResponse, Event or DryRun, got '{}'",
                        kind
                    )));
                }
            }
        }

        Ok(())
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merged_with(self, other: FileConfig) -> FileConfig {
        FileConfig {
            region: other.region.or(self.region),
            poll_interval_secs: other.poll_interval_secs.or(self.poll_interval_secs),
            capabilities: other.capabilities.or(self.capabilities),
            package: match (self.package, other.package) {
                (Some(base), Some(top)) => Some(PackageConfig {
                    skip_archives: top.skip_archives.or(base.skip_archives),
                }),
                (base, top) => top.or(base),
            },
            invoke: match (self.invoke, other.invoke) {
                (Some(base), Some(top)) => Some(InvokeConfig {
                    invocation_type: top.invocation_type.or(base.invocation_type),
                }),
                (base, top) => top.or(base),
            },
        }
    }
}
