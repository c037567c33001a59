use crate::common::FIRST_MIGRATION_VERSION;
use crate::errors::{ErrorKind, MigratorError, MigratorResult};
use crate::migration::{MigrationDefinition, MigrationFn};
use std::collections::BTreeMap;

/// The registered migrations, keyed by version.
///
/// # Purpose
/// Collects and validates migration definitions before execution starts. The
/// mapping is key-unique and insertion-order-irrelevant; registration is
/// sparse, so the scan bound is the highest registered version, not the
/// number of definitions.
///
/// # Invariants
/// - at most one definition per version
/// - versions start at 1; version 0 is reserved for the sentinel record
/// - frozen once the runner has started (enforced by the engine, which owns
///   the runner state)
#[derive(Clone, Debug, Default)]
pub struct Registry {
    definitions: BTreeMap<u32, MigrationDefinition>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Registry {
            definitions: BTreeMap::new(),
        }
    }

    /// Registers one migration under the given version.
    ///
    /// # Arguments
    /// * `version` - The migration's version number, 1 or higher
    /// * `procedure` - The migration procedure
    ///
    /// # Errors
    /// * `InvalidArgument` if `version` is 0
    /// * `DuplicateVersion` if a migration is already registered under
    ///   `version`
    pub fn define(&mut self, version: u32, procedure: MigrationFn) -> MigratorResult<()> {
        if version < FIRST_MIGRATION_VERSION {
            return Err(MigratorError::new(
                "First migration is 1.",
                ErrorKind::InvalidArgument,
            ));
        }
        if self.definitions.contains_key(&version) {
            return Err(MigratorError::new(
                &format!(
                    "Migration already defined for version {}. Use another number.",
                    version
                ),
                ErrorKind::DuplicateVersion,
            ));
        }
        self.definitions
            .insert(version, MigrationDefinition::new(version, procedure));
        Ok(())
    }

    /// The highest registered version, or 0 when the registry is empty.
    ///
    /// This bounds the runner's scan; registration is sparse, so the bound is
    /// the maximum key, never the definition count.
    pub fn highest_version(&self) -> u32 {
        self.definitions
            .last_key_value()
            .map(|(version, _)| *version)
            .unwrap_or(0)
    }

    /// Returns the definition registered under `version`, if any.
    pub fn get(&self, version: u32) -> Option<&MigrationDefinition> {
        self.definitions.get(&version)
    }

    /// The number of registered migrations.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Checks whether the registry holds no migrations.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// The registered versions, in increasing order.
    pub fn versions(&self) -> Vec<u32> {
        self.definitions.keys().copied().collect()
    }
}
