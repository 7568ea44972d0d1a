use thiserror::Error;

/// Reasons a compatibility scan refuses to run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollapseError {
    #[error("Invalid target runtime version: {0:?}")]
    MalformedTarget(String),

    #[error("Invalid package version: {0:?}")]
    MalformedVersion(String),

    #[error("Invalid engine constraint {constraint:?} for version {version}")]
    MalformedConstraint { version: String, constraint: String },
}
