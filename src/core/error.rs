//! Error types for the tree logger

pub type Result<T> = std::result::Result<T, TreeLogError>;

#[derive(Debug, thiserror::Error)]
pub enum TreeLogError {
    /// Pop or recontext without an open context
    #[error("cannot {operation}: no context to pop")]
    EmptyContextStack { operation: &'static str },

    /// Every candidate file name for an artifact was taken
    #[error("names exhausted for '{name}' after {attempts} attempts")]
    NamesExhausted { name: String, attempts: usize },

    /// Artifact opened with an unsupported mode
    #[error("invalid mode {mode:?}: expected \"w\" (text) or \"wb\" (binary)")]
    InvalidMode { mode: String },

    /// Text-mode artifact received bytes that are not UTF-8
    #[error("text artifact '{name}' is not valid UTF-8")]
    InvalidText { name: String },

    /// Custom timestamp format with an unknown or malformed specifier
    #[error("invalid timestamp format {format:?}")]
    InvalidTimestampFormat { format: String },

    /// Persisted trace could not be decoded
    #[error("malformed trace: {message}")]
    MalformedTrace { message: String },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl TreeLogError {
    /// Create a structural misuse error for the named operation
    pub fn empty_stack(operation: &'static str) -> Self {
        TreeLogError::EmptyContextStack { operation }
    }

    /// Create a naming exhaustion error
    pub fn names_exhausted(name: impl Into<String>, attempts: usize) -> Self {
        TreeLogError::NamesExhausted {
            name: name.into(),
            attempts,
        }
    }

    /// Create an invalid mode error
    pub fn invalid_mode(mode: impl Into<String>) -> Self {
        TreeLogError::InvalidMode { mode: mode.into() }
    }

    /// Create an invalid text error
    pub fn invalid_text(name: impl Into<String>) -> Self {
        TreeLogError::InvalidText { name: name.into() }
    }

    /// Create an invalid timestamp format error
    pub fn invalid_timestamp_format(format: impl Into<String>) -> Self {
        TreeLogError::InvalidTimestampFormat {
            format: format.into(),
        }
    }

    /// Create a malformed trace error
    pub fn malformed_trace(message: impl Into<String>) -> Self {
        TreeLogError::MalformedTrace {
            message: message.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        TreeLogError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        TreeLogError::Other(msg.into())
    }

    /// True for pop/recontext on an empty context stack
    pub fn is_structural(&self) -> bool {
        matches!(self, TreeLogError::EmptyContextStack { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = TreeLogError::empty_stack("popcontext");
        assert!(err.is_structural());

        let err = TreeLogError::names_exhausted("test.dat", 10);
        assert!(matches!(err, TreeLogError::NamesExhausted { attempts: 10, .. }));
        assert!(!err.is_structural());

        let err = TreeLogError::invalid_mode("a+");
        assert!(matches!(err, TreeLogError::InvalidMode { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = TreeLogError::empty_stack("recontext");
        assert_eq!(err.to_string(), "cannot recontext: no context to pop");

        let err = TreeLogError::names_exhausted("out.bin", 3);
        assert_eq!(err.to_string(), "names exhausted for 'out.bin' after 3 attempts");

        let err = TreeLogError::invalid_mode("rw");
        assert_eq!(
            err.to_string(),
            "invalid mode \"rw\": expected \"w\" (text) or \"wb\" (binary)"
        );
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = TreeLogError::io_operation("creating artifact", "cannot open test.dat", io_err);

        assert!(matches!(err, TreeLogError::IoOperation { .. }));
        assert!(err.to_string().contains("creating artifact"));
        assert!(err.to_string().contains("cannot open test.dat"));
    }
}
