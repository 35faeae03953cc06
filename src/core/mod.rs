//! core
//!
//! Core domain types, packaging and configuration for stackrunner.
//!
//! # Modules
//!
//! - [`types`] - Stack and resource snapshots, stack statuses
//! - [`archive`] - Packaging files and directories for upload
//! - [`naming`] - Artifact keys and `region:name` stack references
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Snapshots are plain values, produced fresh on every poll
//! - Schemas are strict and self-describing
//! - Nothing here performs network I/O

pub mod archive;
pub mod config;
pub mod naming;
pub mod types;
