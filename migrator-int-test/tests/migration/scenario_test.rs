use migrator::common::Value;
use migrator::migration::RunnerState;
use migrator::store::memory::InMemoryStore;
use migrator::store::{
    ColumnDef, ColumnType, Command, Condition, StoreProvider, TransactionProvider,
};
use migrator_int_test::test_util::{applied_versions, bookkeeping_records, open_engine};
use parking_lot::Mutex;
use std::sync::Arc;

fn create_table(name: &'static str) -> Command {
    Command::CreateTable {
        table: name.to_string(),
        columns: vec![
            ColumnDef::unique("id", ColumnType::Integer),
            ColumnDef::new("name", ColumnType::Text),
        ],
    }
}

// ==================== Fresh Install ====================

#[test]
fn test_fresh_install_applies_and_records() {
    let memory = InMemoryStore::new();
    let test = open_engine(&memory);

    test.engine
        .define(1, |txn| {
            txn.execute(&create_table("foo"))?;
            Ok(())
        })
        .expect("Failed to define migration 1");

    test.engine.execute().expect("Failed to execute");

    assert_eq!(test.engine.state(), RunnerState::Finished);
    assert!(test.failures.lock().is_empty());
    assert_eq!(*test.completions.lock(), 1);

    // bookkeeping holds the sentinel and version 1; table foo exists
    assert!(memory.has_table("foo"));
    assert_eq!(applied_versions(&test.engine.store()), vec![0, 1]);
}

// ==================== Ordering ====================

#[test]
fn test_migrations_apply_in_version_order() {
    let memory = InMemoryStore::new();
    let test = open_engine(&memory);
    let order: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));

    // registered out of order on purpose
    for version in [4u32, 1, 3, 2] {
        let order_clone = order.clone();
        test.engine
            .define(version, move |_txn| {
                order_clone.lock().push(version);
                Ok(())
            })
            .expect("Failed to define migration");
    }

    test.engine.execute().expect("Failed to execute");

    assert_eq!(*order.lock(), vec![1, 2, 3, 4]);
    assert_eq!(applied_versions(&test.engine.store()), vec![0, 1, 2, 3, 4]);

    // applied timestamps never decrease along the version order
    let records = bookkeeping_records(&test.engine.store());
    for pair in records.windows(2) {
        assert!(pair[0].applied_on <= pair[1].applied_on);
    }
}

// ==================== Atomicity ====================

#[test]
fn test_failed_migration_leaves_no_trace() {
    let memory = InMemoryStore::new();
    let test = open_engine(&memory);

    test.engine
        .define(1, |txn| {
            txn.execute(&create_table("orphan"))?;
            // second id 1 violates the unique constraint
            txn.execute(&Command::Insert {
                table: "orphan".to_string(),
                values: vec![Value::Integer(1), Value::from("a")],
            })?;
            txn.execute(&Command::Insert {
                table: "orphan".to_string(),
                values: vec![Value::Integer(1), Value::from("b")],
            })?;
            Ok(())
        })
        .expect("Failed to define migration 1");

    test.engine.execute().expect("Failed to execute");

    // no bookkeeping record for version 1, and none of its effects persist
    assert_eq!(applied_versions(&test.engine.store()), vec![0]);
    assert!(!memory.has_table("orphan"));
    assert_eq!(test.failures.lock().len(), 1);
    assert_eq!(test.failures.lock()[0].0, 1);
}

// ==================== Idempotency ====================

#[test]
fn test_rerun_applies_nothing() {
    let memory = InMemoryStore::new();
    let applications: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));

    let register = |memory: &InMemoryStore, applications: &Arc<Mutex<Vec<u32>>>| {
        let test = open_engine(memory);
        for version in [1u32, 2] {
            let applications_clone = applications.clone();
            test.engine
                .define(version, move |_txn| {
                    applications_clone.lock().push(version);
                    Ok(())
                })
                .expect("Failed to define migration");
        }
        test
    };

    let first = register(&memory, &applications);
    first.engine.execute().expect("Failed to execute first run");
    assert_eq!(*applications.lock(), vec![1, 2]);

    // a fresh engine with the same registrations applies zero additional
    // migrations and still finishes
    let second = register(&memory, &applications);
    second.engine.execute().expect("Failed to execute second run");

    assert_eq!(second.engine.state(), RunnerState::Finished);
    assert_eq!(*applications.lock(), vec![1, 2]);
    assert_eq!(*second.completions.lock(), 1);
    assert!(second.failures.lock().is_empty());
}

// ==================== Gap Tolerance ====================

#[test]
fn test_gap_filled_by_later_registration() {
    let memory = InMemoryStore::new();
    let applications: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));

    let tracked = |applications: &Arc<Mutex<Vec<u32>>>, version: u32| {
        let applications_clone = applications.clone();
        move |_txn: &migrator::store::Transaction| {
            applications_clone.lock().push(version);
            Ok(())
        }
    };

    // first release ships versions 2 and 4 only
    let first = open_engine(&memory);
    first
        .engine
        .define(2, tracked(&applications, 2))
        .expect("Failed to define migration 2");
    first
        .engine
        .define(4, tracked(&applications, 4))
        .expect("Failed to define migration 4");
    first.engine.execute().expect("Failed to execute first run");

    assert_eq!(*applications.lock(), vec![2, 4]);
    // versions 1 and 3 are gaps: scanned but never recorded
    assert_eq!(applied_versions(&first.engine.store()), vec![0, 2, 4]);

    // a later release fills the gap at 3; 2 and 4 must not reapply
    let second = open_engine(&memory);
    second
        .engine
        .define(2, tracked(&applications, 2))
        .expect("Failed to define migration 2");
    second
        .engine
        .define(3, tracked(&applications, 3))
        .expect("Failed to define migration 3");
    second
        .engine
        .define(4, tracked(&applications, 4))
        .expect("Failed to define migration 4");
    second.engine.execute().expect("Failed to execute second run");

    assert_eq!(*applications.lock(), vec![2, 4, 3]);
    assert_eq!(applied_versions(&second.engine.store()), vec![0, 2, 3, 4]);
    assert!(second.failures.lock().is_empty());
}

// ==================== Failure Halt ====================

#[test]
fn test_failure_halts_scan() {
    let memory = InMemoryStore::new();
    let test = open_engine(&memory);
    let later_ran: Arc<Mutex<bool>> = Arc::new(Mutex::new(false));
    let later_ran_clone = later_ran.clone();

    test.engine
        .define(1, |txn| {
            txn.execute(&create_table("users"))?;
            txn.execute(&Command::Insert {
                table: "users".to_string(),
                values: vec![Value::Integer(1), Value::from("alice")],
            })?;
            Ok(())
        })
        .expect("Failed to define migration 1");

    test.engine
        .define(2, |txn| {
            // violates the unique id constraint created by version 1
            txn.execute(&Command::Insert {
                table: "users".to_string(),
                values: vec![Value::Integer(1), Value::from("impostor")],
            })?;
            Ok(())
        })
        .expect("Failed to define migration 2");

    test.engine
        .define(3, move |_txn| {
            *later_ran_clone.lock() = true;
            Ok(())
        })
        .expect("Failed to define migration 3");

    test.engine.execute().expect("Failed to execute");

    // version 1 committed, version 2 halted the scan, version 3 never ran
    assert_eq!(applied_versions(&test.engine.store()), vec![0, 1]);
    assert!(!*later_ran.lock());
    assert_eq!(test.engine.state(), RunnerState::InProgress);
    assert_eq!(*test.completions.lock(), 0);

    let failures = test.failures.lock();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, 2);

    // version 1's data is intact, version 2's insert rolled back
    let store = test.engine.store();
    let rows = store
        .execute(&Command::Select {
            table: "users".to_string(),
            columns: None,
            filter: Some(Condition::eq("id", 1i64)),
            limit: None,
        })
        .expect("Failed to read users");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.get(0, "name"), Some(&Value::from("alice")));
}

// ==================== Data Migration ====================

#[test]
fn test_multi_step_schema_evolution() {
    let memory = InMemoryStore::new();
    let test = open_engine(&memory);

    test.engine
        .define(1, |txn| {
            txn.execute(&create_table("accounts"))?;
            txn.execute(&Command::Insert {
                table: "accounts".to_string(),
                values: vec![Value::Integer(1), Value::from("alice")],
            })?;
            Ok(())
        })
        .expect("Failed to define migration 1");

    test.engine
        .define(2, |txn| {
            txn.execute(&Command::AddColumn {
                table: "accounts".to_string(),
                column: ColumnDef::new("active", ColumnType::Boolean),
                default: Some(Value::Boolean(true)),
            })?;
            Ok(())
        })
        .expect("Failed to define migration 2");

    test.engine
        .define(3, |txn| {
            txn.execute(&Command::Update {
                table: "accounts".to_string(),
                assignments: vec![("name".to_string(), Value::from("alice.liddell"))],
                filter: Some(Condition::eq("id", 1i64)),
            })?;
            Ok(())
        })
        .expect("Failed to define migration 3");

    test.engine.execute().expect("Failed to execute");
    assert_eq!(test.engine.state(), RunnerState::Finished);

    let store = test.engine.store();
    let rows = store
        .execute(&Command::Select {
            table: "accounts".to_string(),
            columns: None,
            filter: None,
            limit: None,
        })
        .expect("Failed to read accounts");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.get(0, "name"), Some(&Value::from("alice.liddell")));
    assert_eq!(rows.get(0, "active"), Some(&Value::Boolean(true)));
}
