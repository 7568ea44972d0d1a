//! Runtime compatibility core
//!
//! Pure, synchronous functions that answer "which releases of this package
//! run on Node.js X?". No I/O happens here; callers hand in a fully fetched
//! catalog and an explicit target version.
//!
//! # Flow
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │   Catalog    │──▶│   Resolver   │──▶│  Collapser   │──▶ [lower, upper] intervals
//! │ (registry)   │   │ (per-version │   │ (contiguous  │
//! └──────────────┘   │ requirement) │   │    runs)     │
//!                    └──────────────┘   └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`types`]: catalog entries, requirements and intervals
//! - [`resolver`]: version filtering and the `engines.node` fallback chain
//! - [`collapser`]: scanning sorted versions into compatibility intervals
//! - [`error`]: errors raised by a scan

pub mod collapser;
pub mod error;
pub mod resolver;
pub mod types;

pub use collapser::{collapse_ranges, select_latest};
pub use error::CollapseError;
pub use resolver::resolve_requirements;
pub use types::{
    CompatibilityInterval, EngineRequirement, RequirementMap, RequirementSource,
    VersionCatalogEntry, VersionFilter,
};
