use thiserror::Error;

/// Outcome class of a pack/unpack operation
///
/// Every [`PerError`] maps onto one of the two failure classes, so callers that
/// only care about "did encoding or decoding fail" can branch on this instead of
/// matching individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Success,
    EncodeFail,
    DecodeFail,
}

impl ResultCode {
    /// Classify the outcome of any codec operation
    pub fn of<T>(result: &PerResult<T>) -> Self {
        match result {
            Ok(_) => ResultCode::Success,
            Err(e) => e.code(),
        }
    }
}

/// Main error type for PER codec operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PerError {
    #[error("Encode overflow: need {needed} bits, {available} left in buffer")]
    EncodeOverflow { needed: usize, available: usize },

    #[error("Decode overflow: need {needed} bits, {available} left in buffer")]
    DecodeOverflow { needed: usize, available: usize },

    #[error("Value {value} outside of constraint [{lb}, {ub}]")]
    ConstraintViolation { value: i128, lb: i128, ub: i128 },

    #[error("Encoding failure: {0}")]
    Encode(String),

    #[error("Decoding failure: {0}")]
    Decode(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Round trip mismatch: {0}")]
    RoundTripMismatch(String),
}

impl PerError {
    /// Failure class of this error
    ///
    /// Value-construction errors count as encode failures since they
    /// reject a value before it ever reaches the wire.
    pub fn code(&self) -> ResultCode {
        match self {
            PerError::EncodeOverflow { .. }
            | PerError::ConstraintViolation { .. }
            | PerError::Encode(_)
            | PerError::InvalidValue(_) => ResultCode::EncodeFail,
            PerError::DecodeOverflow { .. } | PerError::Decode(_) | PerError::RoundTripMismatch(_) => {
                ResultCode::DecodeFail
            }
        }
    }

    pub fn is_encode_failure(&self) -> bool {
        self.code() == ResultCode::EncodeFail
    }

    pub fn is_decode_failure(&self) -> bool {
        self.code() == ResultCode::DecodeFail
    }

    /// Build a constraint violation from any integer-like bounds
    pub fn constraint(value: impl Into<i128>, lb: impl Into<i128>, ub: impl Into<i128>) -> Self {
        PerError::ConstraintViolation {
            value: value.into(),
            lb: lb.into(),
            ub: ub.into(),
        }
    }
}

/// Result type alias for PER codec operations
pub type PerResult<T> = Result<T, PerError>;
