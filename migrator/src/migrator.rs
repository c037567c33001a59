use crate::errors::{ErrorKind, MigratorError, MigratorResult};
use crate::migration::{MigrationFn, Registry, Runner, RunnerState};
use crate::migrator_builder::MigratorBuilder;
use crate::migrator_config::{DebugLevel, MigratorConfig};
use crate::store::{Store, Transaction};
use parking_lot::RwLock;
use std::sync::Arc;

/// The migration engine instance.
///
/// `Migrator` is the entry point for the host. It provides methods for:
/// - Registering migrations before execution
/// - Running the one-shot migration process
/// - Adjusting the debug verbosity
///
/// `Migrator` uses the PIMPL (Pointer to Implementation) design pattern
/// internally: clones share the same underlying state through
/// `Arc<MigratorInner>`, so a clone handed to another component observes the
/// same one-shot lifecycle.
///
/// An instance runs `execute()` at most once. After a completed run the
/// engine is done; after a halted run it is permanently stuck in progress,
/// and recovery means constructing a fresh instance with the same
/// registrations — already-recorded versions are skipped, so the new run
/// resumes at the first unresolved version.
///
/// # Examples
///
/// ```rust,ignore
/// use migrator::migrator::Migrator;
/// use migrator::store::memory::InMemoryStore;
///
/// let store = InMemoryStore::new().into_store();
/// let engine = Migrator::builder().open(store, |number, error| {
///     eprintln!("migration {} failed: {}", number, error);
/// });
///
/// engine.define(1, |txn| {
///     // create tables, backfill data ...
///     Ok(())
/// })?;
///
/// engine.execute()?;
/// ```
#[derive(Clone)]
pub struct Migrator {
    inner: Arc<MigratorInner>,
}

impl Migrator {
    /// Creates a new [MigratorBuilder] for configuring an engine instance.
    pub fn builder() -> MigratorBuilder {
        MigratorBuilder::new()
    }

    pub(crate) fn new(store: Store, config: MigratorConfig) -> Self {
        Migrator {
            inner: Arc::new(MigratorInner::new(store, config)),
        }
    }

    /// Registers one migration under the given version.
    ///
    /// Versions start at 1 and may be sparse; registration order is
    /// irrelevant. Registration closes the moment [execute](Migrator::execute)
    /// is called.
    ///
    /// # Arguments
    ///
    /// * `version` - The migration's version number, 1 or higher
    /// * `procedure` - Issues the migration's commands through the
    ///   transactional handle it receives
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` if `version` is 0
    /// * `DuplicateVersion` if `version` is already registered
    /// * `AlreadyStarted` if `execute()` has already been called
    pub fn define<F>(&self, version: u32, procedure: F) -> MigratorResult<()>
    where
        F: Fn(&Transaction) -> MigratorResult<()> + Send + Sync + 'static,
    {
        self.inner.define(version, MigrationFn::new(procedure))
    }

    /// Runs the migration process. Permitted exactly once per instance.
    ///
    /// Drives the store from "possibly uninitialized" to "every registered
    /// version up to the highest registered one is durably applied or durably
    /// skipped". Run failures are reported through the failure callback
    /// supplied at construction, never through this method's return value; a
    /// failed run halts without applying later versions and leaves the
    /// engine in progress.
    ///
    /// # Errors
    ///
    /// * `AlreadyExecuted` if this instance has already honored its one
    ///   `execute()` call — whether that run finished, halted, or is still
    ///   running
    pub fn execute(&self) -> MigratorResult<()> {
        self.inner.execute()
    }

    /// The engine's current lifecycle state.
    pub fn state(&self) -> RunnerState {
        self.inner.runner.state()
    }

    /// Sets the debug verbosity. Purely affects logging.
    pub fn set_debug_level(&self, level: DebugLevel) {
        self.inner.config.set_debug_level(level);
    }

    /// The store this engine was constructed over.
    pub fn store(&self) -> Store {
        self.inner.store.clone()
    }
}

struct MigratorInner {
    store: Store,
    registry: RwLock<Registry>,
    runner: Runner,
    config: MigratorConfig,
}

impl MigratorInner {
    fn new(store: Store, config: MigratorConfig) -> Self {
        MigratorInner {
            store,
            registry: RwLock::new(Registry::new()),
            runner: Runner::new(),
            config,
        }
    }

    fn define(&self, version: u32, procedure: MigrationFn) -> MigratorResult<()> {
        // The write lock is taken before the state check so a definition can
        // never slip in behind a concurrent execute(): execute() freezes the
        // registry by holding the read lock for the whole run.
        let mut registry = self.registry.write();
        if self.runner.state() != RunnerState::NotStarted {
            return Err(MigratorError::new(
                "Migration process has already started. Define migrations before calling execute().",
                ErrorKind::AlreadyStarted,
            ));
        }
        registry.define(version, procedure)
    }

    fn execute(&self) -> MigratorResult<()> {
        let registry = self.registry.read();
        self.runner.execute(&self.store, &registry, &self.config)
    }
}
