use super::table::Table;
use crate::errors::{ErrorKind, MigratorError, MigratorResult};
use crate::store::{
    Command, ResultSet, Store, StoreProvider, Transaction, TransactionProvider, TransactionState,
};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory implementation of the store contract.
///
/// # Purpose
/// `InMemoryStore` provides a complete in-memory storage backend suitable for
/// testing, temporary data, and scenarios where persistence is not required.
/// It enforces the same command semantics a SQL backend would: typed columns,
/// unique constraints, and the distinguished
/// [ErrorKind::TableNotFound](crate::errors::ErrorKind::TableNotFound) class
/// for commands addressing a missing table.
///
/// # Characteristics
/// - **Thread-Safe**: the table map lives behind a read-write lock
/// - **Snapshot Transactions**: a transaction works on a copy of the table
///   map and swaps it back in atomically on commit
/// - **Single Writer**: concurrent transactions are not conflict-checked; the
///   engine drives one transaction at a time and that is the supported use
/// - **No Persistence**: all data is lost when the store is dropped
///
/// # Usage
/// ```text
/// let store = InMemoryStore::new();
/// store.execute(&Command::CreateTable { .. }).unwrap();
/// let handle = Store::new(store);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        InMemoryStore {
            inner: Arc::new(InMemoryStoreInner::default()),
        }
    }

    /// Wraps this store in a [Store] handle.
    pub fn into_store(self) -> Store {
        Store::new(self)
    }

    /// Drops every table, modeling the host's "erase data" lifecycle event.
    ///
    /// Afterward the bookkeeping table is absent again, so the next engine
    /// instance takes the fresh-install path.
    pub fn clear(&self) {
        self.inner.tables.write().clear();
    }

    /// Checks whether a table exists.
    pub fn has_table(&self, name: &str) -> bool {
        self.inner.tables.read().contains_key(name)
    }

    /// Returns the names of all tables, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.tables.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl StoreProvider for InMemoryStore {
    fn execute(&self, command: &Command) -> MigratorResult<ResultSet> {
        let mut tables = self.inner.tables.write();
        apply_command(&mut tables, command)
    }

    fn begin_transaction(&self) -> MigratorResult<Transaction> {
        Ok(Transaction::new(InMemoryTransaction::new(
            self.inner.clone(),
        )))
    }
}

#[derive(Default)]
struct InMemoryStoreInner {
    tables: RwLock<HashMap<String, Table>>,
}

/// Applies one command to a table map, in place.
///
/// Shared by auto-commit execution (against the live map) and transactions
/// (against their working copy).
fn apply_command(
    tables: &mut HashMap<String, Table>,
    command: &Command,
) -> MigratorResult<ResultSet> {
    match command {
        Command::CreateTable { table, columns } => {
            if tables.contains_key(table) {
                return Err(MigratorError::new(
                    &format!("table already exists: {}", table),
                    ErrorKind::TableAlreadyExists,
                ));
            }
            tables.insert(table.clone(), Table::new(columns.clone())?);
            Ok(ResultSet::with_affected(0))
        }
        Command::DropTable { table } => {
            tables
                .remove(table)
                .ok_or_else(|| missing_table(table))?;
            Ok(ResultSet::with_affected(0))
        }
        Command::AddColumn {
            table,
            column,
            default,
        } => {
            let target = tables.get_mut(table).ok_or_else(|| missing_table(table))?;
            let affected = target.add_column(column.clone(), default.clone())?;
            Ok(ResultSet::with_affected(affected))
        }
        Command::Insert { table, values } => {
            let target = tables.get_mut(table).ok_or_else(|| missing_table(table))?;
            let affected = target.insert(values)?;
            Ok(ResultSet::with_affected(affected))
        }
        Command::Update {
            table,
            assignments,
            filter,
        } => {
            let target = tables.get_mut(table).ok_or_else(|| missing_table(table))?;
            let affected = target.update(assignments, filter.as_ref())?;
            Ok(ResultSet::with_affected(affected))
        }
        Command::Delete { table, filter } => {
            let target = tables.get_mut(table).ok_or_else(|| missing_table(table))?;
            let affected = target.delete(filter.as_ref())?;
            Ok(ResultSet::with_affected(affected))
        }
        Command::Select {
            table,
            columns,
            filter,
            limit,
        } => {
            let target = tables.get(table).ok_or_else(|| missing_table(table))?;
            target.select(columns.as_deref(), filter.as_ref(), *limit)
        }
    }
}

fn missing_table(table: &str) -> MigratorError {
    MigratorError::new(
        &format!("no such table: {}", table),
        ErrorKind::TableNotFound,
    )
}

/// Snapshot transaction over an [InMemoryStore].
///
/// Clones the table map at begin; commands mutate the working copy; `commit`
/// swaps the copy in under the store's write lock, `rollback` discards it.
struct InMemoryTransaction {
    id: String,
    store: Arc<InMemoryStoreInner>,
    working: Mutex<HashMap<String, Table>>,
    state: Mutex<TransactionState>,
}

impl InMemoryTransaction {
    fn new(store: Arc<InMemoryStoreInner>) -> Self {
        let snapshot = store.tables.read().clone();
        InMemoryTransaction {
            id: Uuid::new_v4().to_string(),
            store,
            working: Mutex::new(snapshot),
            state: Mutex::new(TransactionState::Active),
        }
    }

    fn check_active(&self) -> MigratorResult<()> {
        let state = *self.state.lock();
        if state != TransactionState::Active {
            return Err(MigratorError::new(
                &format!("transaction {} is already {}", self.id, state),
                ErrorKind::TransactionError,
            ));
        }
        Ok(())
    }
}

impl TransactionProvider for InMemoryTransaction {
    fn id(&self) -> &str {
        &self.id
    }

    fn state(&self) -> TransactionState {
        *self.state.lock()
    }

    fn execute(&self, command: &Command) -> MigratorResult<ResultSet> {
        self.check_active()?;
        apply_command(&mut self.working.lock(), command)
    }

    fn commit(&self) -> MigratorResult<()> {
        self.check_active()?;
        *self.store.tables.write() = self.working.lock().clone();
        *self.state.lock() = TransactionState::Committed;
        Ok(())
    }

    fn rollback(&self) -> MigratorResult<()> {
        self.check_active()?;
        *self.state.lock() = TransactionState::RolledBack;
        Ok(())
    }
}
