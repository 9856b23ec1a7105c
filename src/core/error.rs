//! Error types for the logger tree

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// No stack frame outside the logging module could be found
    ///
    /// Expected when logging from inside this crate or from a stripped binary.
    /// Operations continue without caller information.
    #[error("no caller")]
    NoCaller,

    /// A qualified stack symbol could not be parsed into a module path
    #[error("malformed module path in symbol '{symbol}'")]
    MalformedModulePath { symbol: String },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A handler reported a failure
    #[error("handler '{handler}' failed: {message}")]
    HandlerFailed { handler: String, message: String },

    /// A handler panicked while being dispatched to
    #[error("handler '{handler}' panicked: {message}")]
    HandlerPanicked { handler: String, message: String },

    /// Every failure collected during a single logging or closing operation
    #[error("{}", join_messages(.0))]
    Aggregate(Vec<LoggerError>),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

fn join_messages(errors: &[LoggerError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl LoggerError {
    /// Create a malformed module path error
    pub fn malformed_module(symbol: impl Into<String>) -> Self {
        LoggerError::MalformedModulePath {
            symbol: symbol.into(),
        }
    }

    /// Create a handler failure
    pub fn handler(handler: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::HandlerFailed {
            handler: handler.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Whether this is the expected "no caller" condition
    #[must_use]
    pub fn is_no_caller(&self) -> bool {
        matches!(self, LoggerError::NoCaller)
    }

    /// Direct members of an aggregate, or the error itself otherwise
    pub fn errors(&self) -> &[LoggerError] {
        match self {
            LoggerError::Aggregate(errors) => errors,
            other => std::slice::from_ref(other),
        }
    }

    /// All non-aggregate errors, depth-first in collection order
    pub fn leaves(&self) -> Vec<&LoggerError> {
        match self {
            LoggerError::Aggregate(errors) => errors.iter().flat_map(|e| e.leaves()).collect(),
            other => vec![other],
        }
    }
}

/// Combine collected failures into one result
///
/// An empty list is success; anything else becomes a single
/// [`LoggerError::Aggregate`] preserving collection order.
pub fn join(errors: Vec<LoggerError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(LoggerError::Aggregate(errors))
    }
}
