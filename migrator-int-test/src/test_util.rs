use migrator::common::SCHEMA_TABLE;
use migrator::migration::BookkeepingRecord;
use migrator::migrator::Migrator;
use migrator::store::memory::InMemoryStore;
use migrator::store::{Command, Store, StoreProvider};
use parking_lot::Mutex;
use std::sync::Arc;

/// Failures observed through the engine's failure channel, as
/// `(version, error message)` pairs in notification order.
pub type FailureLog = Arc<Mutex<Vec<(u32, String)>>>;

/// Completions observed through the engine's completion channel.
pub type CompletionLog = Arc<Mutex<u32>>;

/// One engine under test plus the notification sinks wired into it.
pub struct TestEngine {
    pub engine: Migrator,
    pub failures: FailureLog,
    pub completions: CompletionLog,
}

/// Opens an engine over the given store with both notification channels
/// captured for assertions.
pub fn open_engine(memory: &InMemoryStore) -> TestEngine {
    let failures: FailureLog = Arc::new(Mutex::new(Vec::new()));
    let completions: CompletionLog = Arc::new(Mutex::new(0));

    let failures_clone = failures.clone();
    let completions_clone = completions.clone();
    let engine = Migrator::builder()
        .on_complete(move || {
            *completions_clone.lock() += 1;
        })
        .open(memory.clone().into_store(), move |number, error| {
            failures_clone.lock().push((number, error.message().to_string()));
        });

    TestEngine {
        engine,
        failures,
        completions,
    }
}

/// Reads the bookkeeping table back as records, sorted by version.
pub fn bookkeeping_records(store: &Store) -> Vec<BookkeepingRecord> {
    let result = store
        .execute(&Command::Select {
            table: SCHEMA_TABLE.to_string(),
            columns: None,
            filter: None,
            limit: None,
        })
        .expect("bookkeeping table should exist");
    let mut records: Vec<BookkeepingRecord> = result
        .rows()
        .iter()
        .map(|row| BookkeepingRecord::from_row(row).expect("bookkeeping row should decode"))
        .collect();
    records.sort_by_key(|record| record.version);
    records
}

/// The versions recorded as applied, in increasing order.
pub fn applied_versions(store: &Store) -> Vec<u32> {
    bookkeeping_records(store)
        .into_iter()
        .map(|record| record.version)
        .collect()
}
