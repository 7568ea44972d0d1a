//! Version layer: fetching catalogs and comparing versions
//!
//! # Modules
//!
//! - [`registry`]: Registry trait for fetching package catalogs
//! - [`registries`]: Concrete registry implementations (npm)
//! - [`range`]: npm range expressions and the satisfaction predicate
//! - [`semver`]: Version parsing helpers and the canonical-version check
//! - [`error`]: Error types for registry and version parsing operations

pub mod error;
pub mod range;
pub mod registries;
pub mod registry;
pub mod semver;
