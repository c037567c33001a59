use crate::common::{
    Value, APPLIED_ON_COLUMN, SCHEMA_TABLE, SENTINEL_VERSION, VERSION_COLUMN,
};
use crate::errors::{ErrorKind, MigratorError, MigratorResult};
use crate::migration::{MigrationFn, Registry};
use crate::migrator_config::{DebugLevel, MigratorConfig};
use crate::store::{
    ColumnDef, ColumnType, Command, Condition, Row, Store, StoreProvider, Transaction,
    TransactionProvider,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fmt::{Display, Formatter};

/// Lifecycle state of a [Runner].
///
/// Monotonic: `NotStarted` -> `InProgress` -> `Finished`. There is no failed
/// terminal state; a halted run stays `InProgress` for the lifetime of the
/// engine instance, and recovery is a fresh instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunnerState {
    /// `execute()` has not been called yet; registration is open.
    #[default]
    NotStarted,
    /// `execute()` has been called; registration is closed.
    InProgress,
    /// The run completed; every version up to the scan bound is resolved.
    Finished,
}

impl Display for RunnerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RunnerState::NotStarted => write!(f, "not started"),
            RunnerState::InProgress => write!(f, "in progress"),
            RunnerState::Finished => write!(f, "finished"),
        }
    }
}

/// One persisted row of the bookkeeping table.
///
/// A row exists for a version if and only if that version was durably
/// applied; the version 0 row is the sentinel written at first
/// initialization.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BookkeepingRecord {
    pub version: u32,
    pub applied_on: DateTime<Utc>,
}

impl BookkeepingRecord {
    /// Creates a record for `version`, stamped with the current time.
    pub fn new(version: u32) -> Self {
        BookkeepingRecord {
            version,
            applied_on: Utc::now(),
        }
    }

    /// Creates the sentinel record marking "schema table exists".
    pub fn sentinel() -> Self {
        BookkeepingRecord::new(SENTINEL_VERSION)
    }

    /// The record as insert values, in column definition order.
    pub fn into_values(self) -> Vec<Value> {
        vec![
            Value::from(self.version),
            Value::Timestamp(self.applied_on),
        ]
    }

    /// Decodes a record from a full bookkeeping row.
    pub fn from_row(row: &Row) -> MigratorResult<Self> {
        let version = row
            .get(0)
            .and_then(Value::as_integer)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| {
                MigratorError::new(
                    "bookkeeping row holds no version",
                    ErrorKind::InvalidDataType,
                )
            })?;
        let applied_on = row
            .get(1)
            .and_then(Value::as_timestamp)
            .ok_or_else(|| {
                MigratorError::new(
                    "bookkeeping row holds no timestamp",
                    ErrorKind::InvalidDataType,
                )
            })?;
        Ok(BookkeepingRecord {
            version,
            applied_on,
        })
    }
}

fn schema_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::unique(VERSION_COLUMN, ColumnType::Integer),
        ColumnDef::new(APPLIED_ON_COLUMN, ColumnType::Timestamp),
    ]
}

/// The one-shot orchestration over a store and a frozen registry.
///
/// # Purpose
/// Takes the store from "possibly uninitialized" to "every registered version
/// up to the scan bound is durably applied or durably skipped", with at most
/// one store transaction outstanding at any time.
///
/// # Execution
/// `execute()` transitions to `InProgress` before any store interaction, so a
/// second call fails with `AlreadyExecuted` even while the first is running.
/// It then discovers or creates the bookkeeping table and scans versions
/// 0 through the registry's highest version in order:
/// - a recorded version is skipped (this is what makes re-running idempotent);
/// - an unrecorded version with no definition is a gap and leaves no record,
///   so a migration defined later under that number still runs;
/// - an unrecorded version with a definition is applied in one transaction
///   that writes the bookkeeping record first and then runs the procedure,
///   committing both or neither.
///
/// The scan halts on the first failure; later versions are not attempted and
/// the state stays `InProgress`. Failures travel through the failure channel,
/// never through `execute()`'s return value.
#[derive(Debug, Default)]
pub struct Runner {
    state: Mutex<RunnerState>,
}

impl Runner {
    pub fn new() -> Self {
        Runner {
            state: Mutex::new(RunnerState::NotStarted),
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> RunnerState {
        *self.state.lock()
    }

    /// Runs the migration process once.
    ///
    /// # Returns
    /// * `Ok(())` - the run was driven to completion or to a halt; the
    ///   outcome was reported through the configured channels
    /// * `Err(MigratorError)` - `AlreadyExecuted`: this instance has already
    ///   honored its one `execute()` call
    pub fn execute(
        &self,
        store: &Store,
        registry: &Registry,
        config: &MigratorConfig,
    ) -> MigratorResult<()> {
        {
            let mut state = self.state.lock();
            if *state != RunnerState::NotStarted {
                return Err(MigratorError::new(
                    "The execute function allows only one call.",
                    ErrorKind::AlreadyExecuted,
                ));
            }
            // Closes the one-shot gate before any store interaction.
            *state = RunnerState::InProgress;
        }

        if let Err(error) = self.resolve_schema(store, config) {
            config.notify_failure(SENTINEL_VERSION, &error);
            return Ok(());
        }

        config.debug(DebugLevel::Low, "Migration process starting.");

        for number in 0..=registry.highest_version() {
            if let Err(error) = self.apply_version(store, registry, config, number) {
                config.notify_failure(number, &error);
                return Ok(());
            }
        }

        *self.state.lock() = RunnerState::Finished;
        config.debug(DebugLevel::Low, "Migration process finished with success.");
        config.notify_complete();
        Ok(())
    }

    /// Step A: finds the bookkeeping table, creating it on first run.
    fn resolve_schema(&self, store: &Store, config: &MigratorConfig) -> MigratorResult<()> {
        let probe = Command::Select {
            table: SCHEMA_TABLE.to_string(),
            columns: Some(vec![VERSION_COLUMN.to_string()]),
            filter: None,
            limit: Some(1),
        };
        match store.execute(&probe) {
            Ok(_) => {
                // The table exists. The stored version is deliberately not
                // consulted; the scan always restarts at 0 and checks each
                // version individually.
                config.debug(DebugLevel::High, "Existing migration database");
                Ok(())
            }
            Err(error) if error.kind() == &ErrorKind::TableNotFound => {
                self.create_schema(store, config)
            }
            Err(error) => Err(MigratorError::new_with_cause(
                "Unrecoverable error resolving schema version",
                ErrorKind::InitializationError,
                error,
            )),
        }
    }

    /// Creates the bookkeeping table and its sentinel record in one
    /// transaction.
    fn create_schema(&self, store: &Store, config: &MigratorConfig) -> MigratorResult<()> {
        let transaction = store.begin_transaction().map_err(|error| {
            MigratorError::new_with_cause(
                "Unrecoverable error creating version table",
                ErrorKind::InitializationError,
                error,
            )
        })?;

        let created = transaction
            .execute(&Command::CreateTable {
                table: SCHEMA_TABLE.to_string(),
                columns: schema_columns(),
            })
            .map_err(|error| {
                MigratorError::new_with_cause(
                    "Unrecoverable error creating version table",
                    ErrorKind::InitializationError,
                    error,
                )
            })
            .and_then(|_| {
                transaction
                    .execute(&Command::Insert {
                        table: SCHEMA_TABLE.to_string(),
                        values: BookkeepingRecord::sentinel().into_values(),
                    })
                    .map_err(|error| {
                        MigratorError::new_with_cause(
                            "Unrecoverable error inserting initial version into db",
                            ErrorKind::InitializationError,
                            error,
                        )
                    })
            })
            .and_then(|_| {
                transaction.commit().map_err(|error| {
                    MigratorError::new_with_cause(
                        "Unrecoverable error creating version table",
                        ErrorKind::InitializationError,
                        error,
                    )
                })
            });

        match created {
            Ok(()) => {
                config.debug(DebugLevel::High, "New migration database created");
                Ok(())
            }
            Err(error) => {
                let _ = transaction.rollback();
                Err(error)
            }
        }
    }

    /// Step B, one version: skip it, treat it as a gap, or apply it.
    fn apply_version(
        &self,
        store: &Store,
        registry: &Registry,
        config: &MigratorConfig,
        number: u32,
    ) -> MigratorResult<()> {
        let lookup = Command::Select {
            table: SCHEMA_TABLE.to_string(),
            columns: Some(vec![VERSION_COLUMN.to_string()]),
            filter: Some(Condition::eq(VERSION_COLUMN, number)),
            limit: None,
        };
        let recorded = store.execute(&lookup).map_err(|error| {
            MigratorError::new_with_cause(
                &format!("Migration {} failed", number),
                ErrorKind::MigrationError,
                error,
            )
        })?;

        if !recorded.is_empty() {
            config.debug(
                DebugLevel::High,
                &format!("Migration {} already applied", number),
            );
            return Ok(());
        }

        config.debug(
            DebugLevel::High,
            &format!("  Trying to apply migration {}", number),
        );

        let Some(definition) = registry.get(number) else {
            // A gap leaves no record, so a migration defined later under
            // this number is still eligible to run.
            config.debug(
                DebugLevel::High,
                &format!("    Missing migration {}", number),
            );
            return Ok(());
        };

        config.debug(
            DebugLevel::High,
            &format!("    Found migration {}", number),
        );

        let transaction = store.begin_transaction().map_err(|error| {
            MigratorError::new_with_cause(
                &format!("Migration {} failed", number),
                ErrorKind::MigrationError,
                error,
            )
        })?;

        match self.record_and_apply(&transaction, config, definition.procedure(), number) {
            Ok(()) => {
                config.debug(
                    DebugLevel::High,
                    &format!("      Completed migration {}", number),
                );
                Ok(())
            }
            Err(error) => {
                let _ = transaction.rollback();
                config.debug(
                    DebugLevel::High,
                    &format!(
                        "      Migration {} failed, error message: {}",
                        number, error
                    ),
                );
                Err(MigratorError::new_with_cause(
                    &format!("Migration {} failed", number),
                    ErrorKind::MigrationError,
                    error,
                ))
            }
        }
    }

    /// Inserts the bookkeeping record, then runs the procedure, then commits.
    ///
    /// The record goes in first so its insert cannot depend on what the
    /// procedure does; atomicity of the transaction still ties both together.
    fn record_and_apply(
        &self,
        transaction: &Transaction,
        config: &MigratorConfig,
        procedure: &MigrationFn,
        number: u32,
    ) -> MigratorResult<()> {
        transaction.execute(&Command::Insert {
            table: SCHEMA_TABLE.to_string(),
            values: BookkeepingRecord::new(number).into_values(),
        })?;

        config.debug(
            DebugLevel::High,
            &format!("      Beginning migration {}", number),
        );

        procedure.call(transaction)?;
        transaction.commit()
    }
}
