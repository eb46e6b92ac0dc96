use thiserror::Error;

/// Errors returned by large state packet decoding.
///
/// # Examples
/// ```
/// use droidstate_core::DecodeError;
///
/// let err = DecodeError::SizeMismatch {
///     actual: 404,
///     expected: 405,
/// };
/// assert!(err.is_recoverable());
/// assert!(err.to_string().contains("got 404 bytes, expected 405"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The buffer length differs from the assembled layout size.
    #[error("packet size mismatch: got {actual} bytes, expected {expected}")]
    SizeMismatch { actual: usize, expected: usize },
    /// Schema definitions and the assembled layout disagree. This is a
    /// decoder defect, never a wire error.
    #[error("internal layout inconsistency in {section}: {detail}")]
    LayoutInconsistency {
        section: &'static str,
        detail: String,
    },
}

impl DecodeError {
    /// Whether a caller can drop the packet and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DecodeError::SizeMismatch { .. })
    }

    pub(crate) fn inconsistency(section: &'static str, detail: impl Into<String>) -> Self {
        DecodeError::LayoutInconsistency {
            section,
            detail: detail.into(),
        }
    }
}
