use crate::errors::MigratorResult;
use crate::store::{Command, ResultSet};
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// Lifecycle state of a transaction handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionState {
    /// The transaction is open and accepts commands.
    Active,
    /// The transaction committed; the handle is spent.
    Committed,
    /// The transaction rolled back; the handle is spent.
    RolledBack,
}

impl Display for TransactionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionState::Active => write!(f, "active"),
            TransactionState::Committed => write!(f, "committed"),
            TransactionState::RolledBack => write!(f, "rolled back"),
        }
    }
}

/// One atomic unit of work against a store.
///
/// # Purpose
/// Defines the contract of a transaction handle: commands executed through it
/// become visible all at once on commit, or not at all on rollback. This is
/// the handle a migration procedure receives.
///
/// # Characteristics
/// - **Spent Handles**: after `commit()` or `rollback()` the handle rejects
///   every further operation with
///   [ErrorKind::TransactionError](crate::errors::ErrorKind::TransactionError)
/// - **Identified**: each transaction carries a unique id, for logging
///
/// # Thread Safety
/// Implementers must be `Send + Sync` for safe use in concurrent contexts.
pub trait TransactionProvider: Send + Sync {
    /// The unique identifier of this transaction.
    fn id(&self) -> &str;

    /// The current lifecycle state of this transaction.
    fn state(&self) -> TransactionState;

    /// Executes a command inside this transaction.
    ///
    /// # Arguments
    /// * `command` - The command to execute
    ///
    /// # Returns
    /// * `Ok(ResultSet)` with the command's result
    /// * `Err(MigratorError)` if the command fails or the handle is spent
    fn execute(&self, command: &Command) -> MigratorResult<ResultSet>;

    /// Commits the transaction, making all its effects visible atomically.
    ///
    /// # Returns
    /// * `Ok(())` if the commit succeeded
    /// * `Err(MigratorError)` if the commit fails or the handle is spent
    fn commit(&self) -> MigratorResult<()>;

    /// Rolls the transaction back, discarding all its effects.
    ///
    /// # Returns
    /// * `Ok(())` if the rollback succeeded
    /// * `Err(MigratorError)` if the handle is spent
    fn rollback(&self) -> MigratorResult<()>;
}

/// High-level wrapper for a transaction handle.
///
/// Wraps a concrete [TransactionProvider] in an `Arc` with `Deref`, the same
/// shape as [Store](crate::store::Store) over its provider. Migration
/// procedures receive `&Transaction` and issue their commands through it.
#[derive(Clone)]
pub struct Transaction {
    inner: Arc<dyn TransactionProvider>,
}

impl Transaction {
    /// Creates a new `Transaction` wrapping a provider implementation.
    pub fn new<T: TransactionProvider + 'static>(inner: T) -> Self {
        Transaction {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for Transaction {
    type Target = Arc<dyn TransactionProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
