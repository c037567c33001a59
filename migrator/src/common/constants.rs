// bookkeeping table contract
// Fixed identifiers; must match stores created by prior versions of this
// engine bit for bit.
pub const SCHEMA_TABLE: &str = "_migrator_schema";
pub const VERSION_COLUMN: &str = "version";
pub const APPLIED_ON_COLUMN: &str = "appliedon";

// The row for version 0 marks "schema table exists". It is written once at
// first initialization and never consulted for its value.
pub const SENTINEL_VERSION: u32 = 0;

// Lowest version number a host may register.
pub const FIRST_MIGRATION_VERSION: u32 = 1;
