use crate::errors::MigratorResult;
use crate::store::{Command, ResultSet, Transaction};
use std::ops::Deref;
use std::sync::Arc;

/// Low-level interface the migration engine requires from a storage backend.
///
/// # Purpose
/// Defines the contract every store implementation must follow. A store
/// executes parameterized [Command]s, either one at a time with auto-commit
/// or grouped into an atomic [Transaction].
///
/// # Key Responsibilities
/// - **Command Execution**: answer each command with a [ResultSet] or an error
/// - **Transactions**: every command issued through one transaction commits
///   or rolls back atomically
/// - **Error Classes**: a command addressing a missing table must fail with
///   [ErrorKind::TableNotFound](crate::errors::ErrorKind::TableNotFound),
///   distinguishable from every other failure; the engine branches on this
///   class during schema discovery
///
/// # Implementations
/// - `InMemoryStore`: in-memory storage for testing/temporary use
///
/// # Thread Safety
/// Implementers must be `Send + Sync` for safe use in concurrent contexts.
pub trait StoreProvider: Send + Sync {
    /// Executes a single command with auto-commit semantics.
    ///
    /// # Arguments
    /// * `command` - The command to execute
    ///
    /// # Returns
    /// * `Ok(ResultSet)` with the command's result
    /// * `Err(MigratorError)` if the command fails; nothing is applied
    fn execute(&self, command: &Command) -> MigratorResult<ResultSet>;

    /// Opens a new transaction.
    ///
    /// All commands executed through the returned handle become visible
    /// atomically on commit, or not at all on rollback.
    ///
    /// # Returns
    /// * `Ok(Transaction)` with the open transaction handle
    /// * `Err(MigratorError)` if a transaction cannot be opened
    fn begin_transaction(&self) -> MigratorResult<Transaction>;
}

/// High-level wrapper for a storage backend.
///
/// # Purpose
/// `Store` provides the public handle the engine is constructed with. It
/// wraps a concrete [StoreProvider] implementation in an `Arc` for cheap,
/// thread-safe sharing.
///
/// # Characteristics
/// - **Thread-Safe**: can be safely cloned and shared across threads
/// - **Provider-Agnostic**: works with any [StoreProvider] implementation
/// - **Ergonomic**: implements `Deref` for seamless access to provider methods
/// - **Lightweight**: cloning only increments the reference count
#[derive(Clone)]
pub struct Store {
    inner: Arc<dyn StoreProvider>,
}

impl Store {
    /// Creates a new `Store` wrapping a provider implementation.
    ///
    /// # Arguments
    /// * `inner` - A concrete implementation of [StoreProvider]
    ///
    /// # Returns
    /// A new `Store` that dereferences to `Arc<dyn StoreProvider>`
    pub fn new<T: StoreProvider + 'static>(inner: T) -> Self {
        Store {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for Store {
    type Target = Arc<dyn StoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
