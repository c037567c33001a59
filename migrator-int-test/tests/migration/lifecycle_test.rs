use migrator::common::{Value, SCHEMA_TABLE};
use migrator::errors::ErrorKind;
use migrator::migration::RunnerState;
use migrator::migrator_config::DebugLevel;
use migrator::store::memory::InMemoryStore;
use migrator::store::{Command, TransactionProvider};
use migrator_int_test::test_util::{applied_versions, open_engine};
use parking_lot::Mutex;
use std::sync::Arc;

// ==================== One-Shot Guarantee ====================

#[test]
fn test_second_execute_rejected_after_finish() {
    let memory = InMemoryStore::new();
    let test = open_engine(&memory);

    test.engine.execute().expect("Failed to execute");
    assert_eq!(test.engine.state(), RunnerState::Finished);

    let result = test.engine.execute();
    assert!(result.is_err());
    assert_eq!(result.unwrap_err().kind(), &ErrorKind::AlreadyExecuted);
}

#[test]
fn test_second_execute_rejected_after_halt() {
    let memory = InMemoryStore::new();
    let test = open_engine(&memory);
    test.engine
        .define(1, |txn| {
            txn.execute(&Command::DropTable {
                table: "missing".to_string(),
            })?;
            Ok(())
        })
        .expect("Failed to define migration 1");

    test.engine.execute().expect("Failed to execute");
    assert_eq!(test.engine.state(), RunnerState::InProgress);

    let result = test.engine.execute();
    assert_eq!(result.unwrap_err().kind(), &ErrorKind::AlreadyExecuted);

    // recovery is a fresh instance; the store is still consistent
    let retry = open_engine(&memory);
    retry.engine.define(1, |_txn| Ok(())).expect("Failed to define");
    retry.engine.execute().expect("Failed to execute retry");
    assert_eq!(retry.engine.state(), RunnerState::Finished);
    assert_eq!(applied_versions(&retry.engine.store()), vec![0, 1]);
}

#[test]
fn test_execute_rejected_while_run_is_in_progress() {
    let memory = InMemoryStore::new();
    let test = open_engine(&memory);
    let engine_clone = test.engine.clone();
    let observed: Arc<Mutex<Option<ErrorKind>>> = Arc::new(Mutex::new(None));
    let observed_clone = observed.clone();

    test.engine
        .define(1, move |_txn| {
            // the first run is still in progress at this point
            let result = engine_clone.execute();
            *observed_clone.lock() = result.err().map(|e| e.kind().clone());
            Ok(())
        })
        .expect("Failed to define migration 1");

    test.engine.execute().expect("Failed to execute");

    assert_eq!(*observed.lock(), Some(ErrorKind::AlreadyExecuted));
    assert_eq!(test.engine.state(), RunnerState::Finished);
}

// ==================== Registration Contract ====================

#[test]
fn test_registration_errors() {
    let memory = InMemoryStore::new();
    let test = open_engine(&memory);

    let result = test.engine.define(0, |_| Ok(()));
    assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidArgument);

    test.engine.define(1, |_| Ok(())).expect("Failed to define");
    let result = test.engine.define(1, |_| Ok(()));
    assert_eq!(result.unwrap_err().kind(), &ErrorKind::DuplicateVersion);

    test.engine.execute().expect("Failed to execute");
    let result = test.engine.define(2, |_| Ok(()));
    assert_eq!(result.unwrap_err().kind(), &ErrorKind::AlreadyStarted);
}

// ==================== Host Lifecycle ====================

#[test]
fn test_erase_data_takes_fresh_install_path() {
    let memory = InMemoryStore::new();
    let applications = Arc::new(Mutex::new(0u32));

    let run = |memory: &InMemoryStore, applications: &Arc<Mutex<u32>>| {
        let test = open_engine(memory);
        let applications_clone = applications.clone();
        test.engine
            .define(1, move |txn| {
                txn.execute(&Command::CreateTable {
                    table: "notes".to_string(),
                    columns: vec![migrator::store::ColumnDef::new(
                        "body",
                        migrator::store::ColumnType::Text,
                    )],
                })?;
                *applications_clone.lock() += 1;
                Ok(())
            })
            .expect("Failed to define migration 1");
        test.engine.execute().expect("Failed to execute");
        test
    };

    let first = run(&memory, &applications);
    assert_eq!(first.engine.state(), RunnerState::Finished);
    assert_eq!(*applications.lock(), 1);

    // erase-data drops every table, the bookkeeping table included
    memory.clear();
    assert!(!memory.has_table(SCHEMA_TABLE));

    let second = run(&memory, &applications);
    assert_eq!(second.engine.state(), RunnerState::Finished);
    assert_eq!(*applications.lock(), 2);
    assert!(memory.has_table("notes"));
    assert_eq!(applied_versions(&second.engine.store()), vec![0, 1]);
}

#[test]
fn test_existing_store_reuses_bookkeeping_table() {
    let memory = InMemoryStore::new();

    let first = open_engine(&memory);
    first.engine.execute().expect("Failed to execute");
    assert!(memory.has_table(SCHEMA_TABLE));

    // the second engine finds the table and still finishes from a scan at 0
    let second = open_engine(&memory);
    second.engine.execute().expect("Failed to execute");
    assert_eq!(second.engine.state(), RunnerState::Finished);
    assert_eq!(applied_versions(&second.engine.store()), vec![0]);
    assert!(second.failures.lock().is_empty());
}

// ==================== Debug Level ====================

#[test]
fn test_debug_level_has_no_behavioral_effect() {
    let run_with = |level: Option<DebugLevel>| {
        let memory = InMemoryStore::new();
        let test = open_engine(&memory);
        if let Some(level) = level {
            test.engine.set_debug_level(level);
        }
        test.engine
            .define(1, |txn| {
                txn.execute(&Command::CreateTable {
                    table: "t".to_string(),
                    columns: vec![migrator::store::ColumnDef::unique(
                        "id",
                        migrator::store::ColumnType::Integer,
                    )],
                })?;
                txn.execute(&Command::Insert {
                    table: "t".to_string(),
                    values: vec![Value::Integer(1)],
                })?;
                Ok(())
            })
            .expect("Failed to define migration 1");
        test.engine.execute().expect("Failed to execute");
        (test.engine.state(), applied_versions(&test.engine.store()))
    };

    let silent = run_with(None);
    let low = run_with(Some(DebugLevel::Low));
    let high = run_with(Some(DebugLevel::High));

    assert_eq!(silent, low);
    assert_eq!(low, high);
    assert_eq!(high.0, RunnerState::Finished);
    assert_eq!(high.1, vec![0, 1]);
}
