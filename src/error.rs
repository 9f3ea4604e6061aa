// Error taxonomy for flag resolution and request validation.
// Everything here is raised before a request leaves the process; the
// binary turns it into a message and a non-zero exit code.

use thiserror::Error;

/// Failure while turning raw flag input into a typed request value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A value was required but the input was empty.
    #[error("{what} value is required")]
    MissingValue { what: &'static str },

    /// The input was present but matched no accepted form.
    #[error("unknown {what} value {value:?}")]
    UnknownValue { what: &'static str, value: String },

    /// A numeric code outside the defined range.
    #[error("{what} value {value} is out of range {min}..={max}")]
    OutOfRange {
        what: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("unable to parse date {0:?}, expected YYYY-MM-DD or RFC3339")]
    UnparseableDate(String),

    /// A field required by a full-replacement request was not supplied.
    #[error("{0} is required")]
    MissingRequiredField(&'static str),

    #[error("invalid value for {field}: {reason}")]
    InvalidFieldValue { field: &'static str, reason: String },

    /// The command needs a credential that is not configured.
    #[error("{0} is required for this action")]
    MissingCredential(&'static str),
}

impl ResolveError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ResolveError::InvalidFieldValue {
            field,
            reason: reason.into(),
        }
    }
}
