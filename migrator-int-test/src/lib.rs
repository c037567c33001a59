//! Shared helpers for the migrator integration tests.

pub mod test_util;
