use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for migrator operations.
///
/// Each kind describes one category of failure, so callers can match on the
/// category instead of parsing messages.
///
/// # Examples
///
/// ```rust,ignore
/// use migrator::errors::{MigratorError, ErrorKind, MigratorResult};
///
/// fn example() -> MigratorResult<()> {
///     Err(MigratorError::new("table `foo` does not exist", ErrorKind::TableNotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Registration errors - raised synchronously by define()
    /// An argument violates the operation's contract (e.g. version 0, or a
    /// table definition without columns)
    InvalidArgument,
    /// A migration is already registered under this version
    DuplicateVersion,
    /// Registration attempted after execution has begun
    AlreadyStarted,

    // Lifecycle errors - raised synchronously by execute()
    /// execute() honors exactly one call per engine instance
    AlreadyExecuted,

    // Store command errors - produced by store backends
    /// The referenced table does not exist; the one error class the engine
    /// must be able to tell apart from every other store failure
    TableNotFound,
    /// A table with this name already exists
    TableAlreadyExists,
    /// The referenced column does not exist
    ColumnNotFound,
    /// A value does not match the column type or arity
    InvalidDataType,
    /// A unique column constraint was violated
    UniqueConstraintViolation,
    /// The transaction is spent or cannot make progress
    TransactionError,
    /// Any other failure from the storage backend
    StoreError,

    // Engine run errors - reported through the failure callback
    /// Creating the bookkeeping table or its sentinel record failed
    InitializationError,
    /// The record-and-apply transaction of one migration failed
    MigrationError,

    // Generic/Internal errors - used as fallback
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidArgument => write!(f, "Invalid argument"),
            ErrorKind::DuplicateVersion => write!(f, "Duplicate version"),
            ErrorKind::AlreadyStarted => write!(f, "Already started"),
            ErrorKind::AlreadyExecuted => write!(f, "Already executed"),
            ErrorKind::TableNotFound => write!(f, "Table not found"),
            ErrorKind::TableAlreadyExists => write!(f, "Table already exists"),
            ErrorKind::ColumnNotFound => write!(f, "Column not found"),
            ErrorKind::InvalidDataType => write!(f, "Invalid data type"),
            ErrorKind::UniqueConstraintViolation => write!(f, "Unique constraint violation"),
            ErrorKind::TransactionError => write!(f, "Transaction error"),
            ErrorKind::StoreError => write!(f, "Store error"),
            ErrorKind::InitializationError => write!(f, "Initialization error"),
            ErrorKind::MigrationError => write!(f, "Migration error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom migrator error type.
///
/// `MigratorError` encapsulates the error message, kind, and optional cause.
/// It supports error chaining and backtraces for debugging.
///
/// # Examples
///
/// ```rust,ignore
/// use migrator::errors::{MigratorError, ErrorKind};
///
/// // Create a simple error
/// let err = MigratorError::new("version 3 already registered", ErrorKind::DuplicateVersion);
///
/// // Create an error with a cause
/// let cause = MigratorError::new("unique constraint violation", ErrorKind::UniqueConstraintViolation);
/// let err = MigratorError::new_with_cause("migration 3 failed", ErrorKind::MigrationError, cause);
/// ```
///
/// # Type alias
///
/// The `MigratorResult<T>` type alias is equivalent to `Result<T, MigratorError>`
/// and is used throughout the codebase for operations that can fail.
#[derive(Clone)]
pub struct MigratorError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<MigratorError>>,
    backtrace: Atomic<Backtrace>,
}

impl MigratorError {
    /// Creates a new `MigratorError` with the specified message and error kind.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    ///
    /// # Returns
    ///
    /// A new `MigratorError` instance.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        MigratorError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `MigratorError` with a cause error.
    ///
    /// This creates an error chain where the cause error is preserved for
    /// debugging.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    /// * `cause` - The underlying error that caused this error
    ///
    /// # Returns
    ///
    /// A new `MigratorError` instance with the cause error attached.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: MigratorError) -> Self {
        MigratorError {
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

    pub fn cause(&self) -> Option<&Box<MigratorError>> {
        self.cause.as_ref()
    }
}

impl Display for MigratorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for MigratorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for MigratorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for migrator operations.
///
/// `MigratorResult<T>` is shorthand for `Result<T, MigratorError>`.
/// All fallible migrator operations return this type.
pub type MigratorResult<T> = Result<T, MigratorError>;

// From trait implementations for automatic error conversion
impl From<String> for MigratorError {
    fn from(msg: String) -> Self {
        MigratorError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for MigratorError {
    fn from(msg: &str) -> Self {
        MigratorError::new(msg, ErrorKind::InternalError)
    }
}
