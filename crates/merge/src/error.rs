use thiserror::Error;

/// Result type for merge operations
pub type Result<T> = std::result::Result<T, MergeError>;

/// Errors that can occur while merging a regenerated block
#[derive(Error, Debug)]
pub enum MergeError {
    /// The diff engine failed; no edit may be applied
    #[error("Merge failed: {0}")]
    MergeFailed(String),

    /// The diff engine returned ops that do not cover both sides
    #[error("Invalid edit script: {0}")]
    InvalidEditScript(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A generation directive is missing a required key
    #[error("Directive is missing required key `{0}`")]
    MissingDirective(String),

    /// Generic error, e.g. from a custom diff engine or handler
    #[error("{0}")]
    Other(String),
}

impl MergeError {
    /// Create a merge failure from a diff engine error
    pub fn merge_failed(msg: impl Into<String>) -> Self {
        Self::MergeFailed(msg.into())
    }

    /// Create an invalid edit script error
    pub fn invalid_edit_script(msg: impl Into<String>) -> Self {
        Self::InvalidEditScript(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
