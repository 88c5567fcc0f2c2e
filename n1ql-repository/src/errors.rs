use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for N1QL repository query operations.
///
/// Each kind describes one category of failure so callers can tell an unsupported
/// query shape apart from a failure reported by the database client.
///
/// # Examples
///
/// ```rust,ignore
/// use n1ql_repository::errors::{ErrorKind, N1qlError, N1qlResult};
///
/// fn example() -> N1qlResult<()> {
///     Err(N1qlError::new("Page queries are not supported", ErrorKind::UnsupportedOperation))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// The query method asks for a result shape that is not implemented
    /// (page, slice or modifying queries)
    UnsupportedOperation,
    /// The database operations port failed to run the query
    /// (connectivity, malformed statement, server-side failure)
    QueryExecutionError,
    /// A row could not be mapped to or from the entity type
    ObjectMappingError,
    /// A statement could not be produced for the query method
    InvalidQuery,
    /// The call-time arguments are not acceptable
    InvalidArgument,
    /// The query configuration is not usable
    InvalidConfiguration,
    /// The operation is not valid in the current context
    InvalidOperation,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::UnsupportedOperation => write!(f, "Unsupported operation"),
            ErrorKind::QueryExecutionError => write!(f, "Query execution error"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::InvalidQuery => write!(f, "Invalid query"),
            ErrorKind::InvalidArgument => write!(f, "Invalid argument"),
            ErrorKind::InvalidConfiguration => write!(f, "Invalid configuration"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Error type for every fallible operation in this crate.
///
/// `N1qlError` carries a message, an [ErrorKind], an optional cause and the backtrace
/// captured where the error was created.
///
/// # Examples
///
/// ```rust,ignore
/// use n1ql_repository::errors::{ErrorKind, N1qlError};
///
/// let cause = N1qlError::new("connection reset", ErrorKind::QueryExecutionError);
/// let err = N1qlError::new_with_cause("query failed", ErrorKind::QueryExecutionError, cause);
/// ```
#[derive(Clone)]
pub struct N1qlError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<N1qlError>>,
    backtrace: Atomic<Backtrace>,
}

impl N1qlError {
    /// Creates a new `N1qlError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        N1qlError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `N1qlError` that keeps `cause` in its error chain.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: N1qlError) -> Self {
        N1qlError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&N1qlError> {
        self.cause.as_deref()
    }
}

impl Display for N1qlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for N1qlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for N1qlError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// Shorthand for `Result<T, N1qlError>`.
pub type N1qlResult<T> = Result<T, N1qlError>;

impl serde::de::Error for N1qlError {
    fn custom<T: Display>(msg: T) -> Self {
        N1qlError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

impl serde::ser::Error for N1qlError {
    fn custom<T: Display>(msg: T) -> Self {
        N1qlError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

impl From<serde_json::Error> for N1qlError {
    fn from(err: serde_json::Error) -> Self {
        N1qlError::new(
            &format!("JSON conversion error: {}", err),
            ErrorKind::ObjectMappingError,
        )
    }
}

impl From<std::fmt::Error> for N1qlError {
    fn from(err: std::fmt::Error) -> Self {
        N1qlError::new(
            &format!("Formatting error: {}", err),
            ErrorKind::InternalError,
        )
    }
}

impl From<std::num::ParseIntError> for N1qlError {
    fn from(err: std::num::ParseIntError) -> Self {
        N1qlError::new(
            &format!("Integer parsing error: {}", err),
            ErrorKind::InvalidQuery,
        )
    }
}

impl From<String> for N1qlError {
    fn from(msg: String) -> Self {
        N1qlError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for N1qlError {
    fn from(msg: &str) -> Self {
        N1qlError::new(msg, ErrorKind::InternalError)
    }
}
