//! Error types for tag I/O operations.

use thiserror::Error;

use crate::transport::{ERR_BAD_PARAM, ERR_TIMEOUT};

/// Result type alias for tag operations.
pub type Result<T> = std::result::Result<T, TagError>;

/// Errors that can occur while configuring a controller or driving tag I/O.
///
/// Construction-time errors (`InvalidConfiguration`, `DuplicateTag`,
/// `HandleCreationFailed`) are returned immediately to the caller. Errors
/// that occur inside a batched read/write are captured per tag in the
/// [`BatchReport`](crate::BatchReport) instead of aborting the loop.
#[derive(Debug, Error)]
pub enum TagError {
    /// Controller configuration was rejected at construction.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the configuration problem.
        reason: String,
    },

    /// A tag with the same name is already registered on the controller.
    #[error("duplicate tag '{name}'")]
    DuplicateTag {
        /// Name of the colliding tag.
        name: String,
    },

    /// The transport rejected the tag address at handle creation.
    #[error("handle creation failed: {reason}")]
    HandleCreationFailed {
        /// Description reported by the transport.
        reason: String,
    },

    /// A cached value could not be decoded as the requested type.
    #[error("type mismatch: tag holds {expected}, requested {requested}")]
    TypeMismatch {
        /// Data type the tag was declared with.
        expected: String,
        /// Type the caller asked for.
        requested: String,
    },

    /// The tag has not been read successfully yet, so there is no value to decode.
    #[error("tag '{name}' has no cached value")]
    NoValue {
        /// Name of the tag.
        name: String,
    },

    /// A group-level read/write exceeded its deadline.
    #[error("operation timed out")]
    Timeout,

    /// Terminal status code reported by the transport, surfaced verbatim.
    ///
    /// Use [`Controller::decode_error`](crate::Controller::decode_error) to
    /// obtain the transport's message text for the code.
    #[error("transport status {code}")]
    Transport {
        /// Status code from the transport (negative by convention).
        code: i32,
    },

    /// Operation attempted on a controller that has already been closed.
    #[error("controller is closed")]
    Closed,
}

impl TagError {
    /// Creates a new `InvalidConfiguration` error.
    ///
    /// # Example
    ///
    /// ```
    /// use logix_tags::TagError;
    ///
    /// let err = TagError::invalid_configuration("routing path is required for ControlLogix");
    /// ```
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Creates a new `DuplicateTag` error.
    pub fn duplicate_tag(name: impl Into<String>) -> Self {
        Self::DuplicateTag { name: name.into() }
    }

    /// Creates a new `HandleCreationFailed` error.
    pub fn handle_creation_failed(reason: impl Into<String>) -> Self {
        Self::HandleCreationFailed {
            reason: reason.into(),
        }
    }

    /// Creates a new `TypeMismatch` error.
    pub fn type_mismatch(expected: impl Into<String>, requested: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            requested: requested.into(),
        }
    }

    /// Creates a new `NoValue` error.
    pub fn no_value(name: impl Into<String>) -> Self {
        Self::NoValue { name: name.into() }
    }

    /// Creates a new `Transport` error carrying a raw status code.
    pub fn transport(code: i32) -> Self {
        Self::Transport { code }
    }

    /// Maps this error onto a transport status code.
    ///
    /// Used by the batch loop to record a start-phase failure as the tag's
    /// terminal outcome without losing the transport's own code.
    pub(crate) fn status_code(&self) -> i32 {
        match self {
            Self::Transport { code } => *code,
            Self::Timeout => ERR_TIMEOUT,
            _ => ERR_BAD_PARAM,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configuration_display() {
        let err = TagError::invalid_configuration("routing path is required for ControlLogix");
        assert_eq!(
            err.to_string(),
            "invalid configuration: routing path is required for ControlLogix"
        );
    }

    #[test]
    fn test_duplicate_tag_display() {
        let err = TagError::duplicate_tag("Speed");
        assert_eq!(err.to_string(), "duplicate tag 'Speed'");
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = TagError::type_mismatch("DINT", "f32");
        assert_eq!(err.to_string(), "type mismatch: tag holds DINT, requested f32");
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(TagError::Timeout.to_string(), "operation timed out");
    }

    #[test]
    fn test_transport_display() {
        let err = TagError::transport(-32);
        assert_eq!(err.to_string(), "transport status -32");
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(TagError::transport(-27).status_code(), -27);
        assert_eq!(TagError::Timeout.status_code(), ERR_TIMEOUT);
        assert_eq!(TagError::Closed.status_code(), ERR_BAD_PARAM);
    }
}
