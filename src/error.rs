//! Error types for the onboarding wizard

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for onboarding operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the onboarding wizard
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Submission failed: {0}")]
    Submit(#[from] SubmitError),

    #[error("Failed to read submission {path}: {message}")]
    SubmissionRead { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid wizard definition: {0}")]
    Definition(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Misuse of the step controller at construction time
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("a wizard needs at least one input step")]
    NoSteps,
}

/// Failure reported by a submit collaborator
///
/// All variants are handled the same way by the controller: the wizard stays
/// on its last input step and the failure is surfaced to the host.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("submission rejected: {0}")]
    Rejected(String),

    #[error("IO error while submitting: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not serialize submission: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("submission did not finish within {0:?}")]
    TimedOut(std::time::Duration),

    #[error("submit handler panicked: {0}")]
    Panicked(String),
}
