use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RemediationError {
    /// The management page does not belong to the expected switch model.
    #[error("unexpected device: page title {found:?} does not contain {expected:?}")]
    UnexpectedDevice { expected: String, found: String },

    #[error("no automation context is available, setup did not complete")]
    NoContext,

    #[error("no element matches {0}")]
    ElementNotFound(String),
}
