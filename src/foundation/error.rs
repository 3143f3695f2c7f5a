pub type StewieResult<T> = Result<T, StewieError>;

#[derive(thiserror::Error, Debug)]
pub enum StewieError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("arity mismatch: expected {expected} components, found {found}")]
    Arity { expected: usize, found: usize },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("controller error: {0}")]
    Driver(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error("run cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StewieError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn driver(msg: impl Into<String>) -> Self {
        Self::Driver(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` when the error is a closed downstream pipe (e.g. `stewie circle | head`).
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe)
    }
}

impl From<serde_json::Error> for StewieError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            StewieError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(StewieError::parse("x").to_string().contains("parse error:"));
        assert!(
            StewieError::driver("x")
                .to_string()
                .contains("controller error:")
        );
        assert!(
            StewieError::serde("x")
                .to_string()
                .contains("serialization error:")
        );
        assert_eq!(
            StewieError::Arity {
                expected: 6,
                found: 4
            }
            .to_string(),
            "arity mismatch: expected 6 components, found 4"
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = StewieError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn broken_pipe_is_detected() {
        let err = StewieError::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert!(err.is_broken_pipe());
        assert!(!StewieError::Cancelled.is_broken_pipe());
    }
}
