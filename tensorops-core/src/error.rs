use std::fmt;

/// The kernels reject malformed calls before any write happens, so a single
/// kind covers every validation failure: dimension mismatches, malformed
/// permutations, and contracted-extent disagreements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    ShapeMismatch,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{:?}: {}: {}", self.kind, self.message, cause),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl From<(ErrorKind, String)> for Error {
    fn from((kind, message): (ErrorKind, String)) -> Self {
        Error {
            kind,
            message,
            cause: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err: Error = (
            ErrorKind::ShapeMismatch,
            "add: tensor shape is not [2, 3]".to_string(),
        )
            .into();
        assert_eq!(err.kind, ErrorKind::ShapeMismatch);
        assert_eq!(
            err.to_string(),
            "ShapeMismatch: add: tensor shape is not [2, 3]"
        );
    }
}
