//! Error types returned by this crate.
//!
//! Every fallible entry point returns a `Result<_, Failed>` rather than
//! panicking or exiting the process.

use std::fmt;

/// The kind of failure that occurred.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedKind {
    /// Training data, penalty, or SVM construction parameters were rejected
    /// before any allocation happened.
    #[error("invalid input")]
    InvalidInput,
    /// An unrecognized kernel tag was passed to [`crate::kernel::KernelFunction::from_tag`].
    #[error("invalid kernel")]
    InvalidKernel,
}

/// An error produced by this crate.
///
/// Carries a [`FailedKind`] plus a human-readable message describing which
/// value was rejected and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failed {
    kind: FailedKind,
    message: String,
}

impl Failed {
    /// Build an [`FailedKind::InvalidInput`] error.
    pub fn invalid_input<S: Into<String>>(message: S) -> Failed {
        Failed {
            kind: FailedKind::InvalidInput,
            message: message.into(),
        }
    }

    /// Build an [`FailedKind::InvalidKernel`] error.
    pub fn invalid_kernel<S: Into<String>>(message: S) -> Failed {
        Failed {
            kind: FailedKind::InvalidKernel,
            message: message.into(),
        }
    }

    /// The kind of failure.
    pub fn kind(&self) -> FailedKind {
        self.kind
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Failed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Failed {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_carries_kind_and_message() {
        let e = Failed::invalid_input("training_count < 2");
        assert_eq!(e.kind(), FailedKind::InvalidInput);
        assert!(e.message().contains("training_count"));
        assert!(e.to_string().contains("training_count"));
    }

    #[test]
    fn invalid_kernel_carries_kind_and_message() {
        let e = Failed::invalid_kernel("unknown kernel tag 7");
        assert_eq!(e.kind(), FailedKind::InvalidKernel);
        assert!(e.to_string().contains('7'));
    }
}
