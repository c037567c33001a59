use crate::errors::MigratorError;
use crate::migrator::Migrator;
use crate::migrator_config::{CompletionCallback, DebugLevel, MigratorConfig};
use crate::store::Store;
use std::sync::Arc;

/// Builder for configuring a [Migrator] instance.
///
/// `MigratorBuilder` provides a fluent API for the optional parts of the
/// engine's construction — debug verbosity and the completion notification —
/// before binding the two mandatory parts, the store handle and the failure
/// notification, in [open](MigratorBuilder::open).
///
/// # Examples
///
/// ```rust,ignore
/// use migrator::migrator::Migrator;
/// use migrator::migrator_config::DebugLevel;
///
/// let engine = Migrator::builder()
///     .debug_level(DebugLevel::High)
///     .on_complete(|| println!("all migrations applied"))
///     .open(store, |number, error| {
///         eprintln!("migration {} failed: {}", number, error);
///     });
/// ```
#[derive(Default)]
pub struct MigratorBuilder {
    debug_level: DebugLevel,
    on_complete: Option<CompletionCallback>,
}

impl MigratorBuilder {
    /// Creates a new `MigratorBuilder` with default configuration:
    /// debug level [DebugLevel::None] and no completion notification.
    pub fn new() -> Self {
        MigratorBuilder {
            debug_level: DebugLevel::default(),
            on_complete: None,
        }
    }

    /// Sets the initial debug verbosity.
    ///
    /// Purely affects logging; it can also be changed later through
    /// [Migrator::set_debug_level].
    ///
    /// # Returns
    ///
    /// This `MigratorBuilder` for method chaining.
    pub fn debug_level(mut self, level: DebugLevel) -> Self {
        self.debug_level = level;
        self
    }

    /// Sets the optional completion notification, invoked once when a run
    /// reaches the finished state.
    ///
    /// # Returns
    ///
    /// This `MigratorBuilder` for method chaining.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(callback));
        self
    }

    /// Finalizes the configuration and creates the engine.
    ///
    /// # Arguments
    ///
    /// * `store` - The store handle the engine migrates
    /// * `on_failure` - The mandatory failure notification, invoked with the
    ///   failing version number and the error whenever a run fails
    ///
    /// # Returns
    ///
    /// The configured [Migrator], in the not-started state with an empty
    /// registry.
    pub fn open<F>(self, store: Store, on_failure: F) -> Migrator
    where
        F: Fn(u32, &MigratorError) + Send + Sync + 'static,
    {
        let mut config = MigratorConfig::new(Arc::new(on_failure));
        config.set_debug_level(self.debug_level);
        if let Some(on_complete) = self.on_complete {
            config.set_completion_callback(on_complete);
        }
        Migrator::new(store, config)
    }
}
