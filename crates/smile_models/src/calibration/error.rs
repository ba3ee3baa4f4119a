//! Calibration error types.
//!
//! Structural problems with the inputs are errors. Optimiser
//! non-convergence is not: it is recorded as the termination status of the
//! fit result.

use thiserror::Error;

/// Calibration error type.
///
/// # Examples
///
/// ```
/// use smile_models::calibration::CalibrationError;
///
/// let err = CalibrationError::invalid_domain("strike must be positive, got -1");
/// assert!(err.is_domain_error());
/// assert!(format!("{}", err).contains("-1"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Invalid construction input
    ///
    /// Non-positive expiry, forward, strike or volatility, an empty smile,
    /// or an out-of-domain supplied parameter.
    #[error("無効な入力: {message}")]
    InvalidInput {
        /// Description of the validation failure
        message: String,
    },

    /// Query outside the domain of the smile
    #[error("定義域外のクエリ: {message}")]
    InvalidDomain {
        /// Description of the offending query
        message: String,
    },

    /// Operation not provided by this smile section
    #[error("サポートされていない操作: {operation}")]
    UnsupportedOperation {
        /// Name of the operation
        operation: String,
    },
}

impl CalibrationError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CalibrationError::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an invalid domain error.
    pub fn invalid_domain(message: impl Into<String>) -> Self {
        CalibrationError::InvalidDomain {
            message: message.into(),
        }
    }

    /// Create an unsupported operation error.
    pub fn unsupported_operation(operation: impl Into<String>) -> Self {
        CalibrationError::UnsupportedOperation {
            operation: operation.into(),
        }
    }

    /// Check if the error was raised while validating construction inputs.
    pub fn is_input_error(&self) -> bool {
        matches!(self, CalibrationError::InvalidInput { .. })
    }

    /// Check if the error was raised by an out-of-domain query.
    pub fn is_domain_error(&self) -> bool {
        matches!(self, CalibrationError::InvalidDomain { .. })
    }
}
