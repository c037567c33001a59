use crate::errors::MigratorResult;
use crate::store::Transaction;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A migration procedure behind a cloneable, thread-safe wrapper.
///
/// The closure receives the transactional handle of the version's
/// record-and-apply transaction and issues zero or more store commands
/// through it. Its first error aborts the transaction.
#[derive(Clone)]
pub struct MigrationFn {
    inner: Arc<dyn Fn(&Transaction) -> MigratorResult<()> + Send + Sync>,
}

impl MigrationFn {
    /// Wraps a closure as a migration procedure.
    pub fn new<F>(procedure: F) -> Self
    where
        F: Fn(&Transaction) -> MigratorResult<()> + Send + Sync + 'static,
    {
        MigrationFn {
            inner: Arc::new(procedure),
        }
    }

    /// Invokes the procedure with a transactional handle.
    pub fn call(&self, transaction: &Transaction) -> MigratorResult<()> {
        (self.inner)(transaction)
    }
}

impl Debug for MigrationFn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MigrationFn(<procedure>)")
    }
}

/// One registered migration: a version number bound to its procedure.
///
/// Versions identify a migration step and are assigned by its author, not by
/// registration order. Validation of the version value happens at
/// registration time in the [Registry](crate::migration::Registry).
#[derive(Clone, Debug)]
pub struct MigrationDefinition {
    version: u32,
    procedure: MigrationFn,
}

impl MigrationDefinition {
    pub fn new(version: u32, procedure: MigrationFn) -> Self {
        MigrationDefinition { version, procedure }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn procedure(&self) -> &MigrationFn {
        &self.procedure
    }
}
