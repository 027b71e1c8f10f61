//! Error types for memory operations.
//!
//! A failed recall is not an error: `retrieve` and `blend` report it as
//! `Ok(None)`. The variants below are genuine faults in how the engine was
//! configured or called.

/// Errors that can occur while configuring or driving a memory.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActupError {
	/// Invalid construction parameters or malformed caller input.
	#[error("Invalid configuration: {0}")]
	Configuration(String),

	/// A mathematical precondition did not hold (negative microlapses,
	/// zero elapsed time under power-law decay, time running backwards).
	#[error("Domain error: {0}")]
	Domain(String),

	/// `blend` was asked to average a slot that is not numeric.
	#[error("Cannot blend slot `{slot}`: expected a numeric value, found {found}")]
	TypeMismatch {
		/// Outcome slot that was requested
		slot: String,
		/// Description of the offending value
		found: String,
	},
}

impl ActupError {
	/// Shorthand for a [`ActupError::Configuration`] error.
	pub(crate) fn config(message: impl Into<String>) -> Self {
		Self::Configuration(message.into())
	}

	/// Shorthand for a [`ActupError::Domain`] error.
	pub(crate) fn domain(message: impl Into<String>) -> Self {
		Self::Domain(message.into())
	}

	/// Check if this error was raised while validating configuration.
	#[must_use]
	pub const fn is_configuration(&self) -> bool {
		matches!(self, Self::Configuration(_))
	}

	/// Check if this error is a mathematical domain violation.
	#[must_use]
	pub const fn is_domain(&self) -> bool {
		matches!(self, Self::Domain(_))
	}

	/// Check if this error came from blending a non-numeric slot.
	#[must_use]
	pub const fn is_type_mismatch(&self) -> bool {
		matches!(self, Self::TypeMismatch { .. })
	}
}

/// Result type alias for memory operations.
pub type Result<T> = std::result::Result<T, ActupError>;
