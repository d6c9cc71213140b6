use thiserror::Error;

/// Errors produced by composition, scoring, averaging and differencing.
///
/// None of these are transient. They indicate a malformed animation or a
/// caller passing mismatched inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid animation: {0}")]
    InvalidAnimation(String),

    #[error("dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("image has no pixels")]
    EmptyImage,
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidAnimation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            Error::invalid("no frames").to_string(),
            "invalid animation: no frames"
        );
        assert_eq!(
            Error::DimensionMismatch { expected: (2, 2), found: (3, 1) }.to_string(),
            "dimension mismatch: expected (2, 2), found (3, 1)"
        );
        assert_eq!(Error::EmptyImage.to_string(), "image has no pixels");
    }
}
