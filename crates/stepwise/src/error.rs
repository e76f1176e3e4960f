//! Error types for provisioning runs.
//!
//! Errors are classified at the step boundary. Nothing here ever escapes
//! the runner: a failing step becomes a [`StepResult::Failed`] carrying the
//! rendered error and its [`FailureKind`].
//!
//! [`StepResult::Failed`]: crate::types::StepResult::Failed

use std::path::PathBuf;
use thiserror::Error;

use crate::types::FailureKind;

/// Errors that can occur while planning or running provisioning steps.
#[derive(Debug, Error)]
pub enum Error {
    /// A plan precondition does not hold; no step runs
    #[error("precondition failed: {message}")]
    PreconditionFailed {
        /// What is wrong with the environment
        message: String,
    },

    /// The satisfaction check itself failed (e.g. permission denied)
    #[error("check for '{step}' failed: {message}")]
    StepCheck {
        /// Name of the step whose check failed
        step: String,
        /// Error chain from the check
        message: String,
    },

    /// The mutating action failed partway
    #[error("'{step}' failed to apply: {message}")]
    StepApply {
        /// Name of the step whose apply failed
        step: String,
        /// Error chain from the apply
        message: String,
    },

    /// The operator answered anything but yes
    #[error("declined by user")]
    UserDeclined,

    /// Reading the confirmation answer failed
    #[error("confirmation prompt failed: {message}")]
    Prompt {
        /// Underlying terminal error
        message: String,
    },

    /// Prior content could not be captured before an overwrite
    #[error("backup of {} failed: {message}", path.display())]
    Backup {
        /// Path that should have been backed up
        path: PathBuf,
        /// Why the copy failed
        message: String,
    },

    /// Two steps in a plan share a name
    #[error("duplicate step name: {0}")]
    DuplicateStep(String),

    /// A step filter names a step that is not in the plan
    #[error("unknown step: {0}")]
    UnknownStep(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// The stage this error is recorded under when it ends a step.
    ///
    /// Returns `None` for errors that never end up in a step record.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Error::StepCheck { .. } => Some(FailureKind::Check),
            Error::StepApply { .. } => Some(FailureKind::Apply),
            Error::Backup { .. } => Some(FailureKind::Backup),
            Error::Prompt { .. } => Some(FailureKind::Prompt),
            _ => None,
        }
    }

    /// Whether this error stops a run before any step executes.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::PreconditionFailed { .. })
    }
}

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declined_message() {
        assert_eq!(Error::UserDeclined.to_string(), "declined by user");
    }

    #[test]
    fn test_failure_kind_mapping() {
        let check = Error::StepCheck {
            step: "a".into(),
            message: "denied".into(),
        };
        assert_eq!(check.failure_kind(), Some(FailureKind::Check));

        let backup = Error::Backup {
            path: PathBuf::from("/home/u/.zshrc"),
            message: "disk full".into(),
        };
        assert_eq!(backup.failure_kind(), Some(FailureKind::Backup));
        assert_eq!(
            backup.to_string(),
            "backup of /home/u/.zshrc failed: disk full"
        );

        assert_eq!(Error::UserDeclined.failure_kind(), None);
    }

    #[test]
    fn test_only_preconditions_are_fatal() {
        assert!(
            Error::PreconditionFailed {
                message: "running as root".into()
            }
            .is_fatal()
        );
        assert!(!Error::DuplicateStep("x".into()).is_fatal());
    }
}
