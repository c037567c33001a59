use crate::common::{atomic, Atomic};
use crate::errors::MigratorError;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Verbosity of the engine's trace output.
///
/// Purely affects what is logged through the [log] facade; behavior and
/// results are identical at every level. With no logger installed the trace
/// output is a no-op regardless of level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    /// No trace output.
    #[default]
    None,
    /// Process-level messages (run started, run finished).
    Low,
    /// Per-version messages (applied, missing, failed).
    High,
}

impl Display for DebugLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DebugLevel::None => write!(f, "none"),
            DebugLevel::Low => write!(f, "low"),
            DebugLevel::High => write!(f, "high"),
        }
    }
}

/// The failure-notification channel, invoked with the failing version number
/// and the error. Mandatory at construction.
pub type FailureCallback = Arc<dyn Fn(u32, &MigratorError) + Send + Sync>;

/// The optional completion-notification channel, invoked once when a run
/// reaches the finished state.
pub type CompletionCallback = Arc<dyn Fn() + Send + Sync>;

/// Configuration of one engine instance.
///
/// Holds the debug level (settable after construction) and the two host
/// notification channels. The runner reports every run failure through
/// [notify_failure](MigratorConfig::notify_failure) and never through
/// `execute()`'s return value.
#[derive(Clone)]
pub struct MigratorConfig {
    debug_level: Atomic<DebugLevel>,
    on_failure: FailureCallback,
    on_complete: Option<CompletionCallback>,
}

impl MigratorConfig {
    /// Creates a configuration with the mandatory failure channel.
    pub fn new(on_failure: FailureCallback) -> Self {
        MigratorConfig {
            debug_level: atomic(DebugLevel::default()),
            on_failure,
            on_complete: None,
        }
    }

    /// Sets the optional completion channel.
    pub fn set_completion_callback(&mut self, on_complete: CompletionCallback) {
        self.on_complete = Some(on_complete);
    }

    /// The current debug level.
    pub fn debug_level(&self) -> DebugLevel {
        *self.debug_level.read()
    }

    /// Sets the debug level. Takes effect immediately, also mid-run.
    pub fn set_debug_level(&self, level: DebugLevel) {
        *self.debug_level.write() = level;
    }

    /// Emits a trace message when the configured level admits it.
    ///
    /// Messages tagged [DebugLevel::Low] go through `log::info!`, messages
    /// tagged [DebugLevel::High] through `log::debug!`.
    pub fn debug(&self, min_level: DebugLevel, message: &str) {
        if self.debug_level() < min_level {
            return;
        }
        match min_level {
            DebugLevel::None => {}
            DebugLevel::Low => log::info!("{}", message),
            DebugLevel::High => log::debug!("{}", message),
        }
    }

    /// Reports a run failure through the failure channel.
    pub fn notify_failure(&self, version: u32, error: &MigratorError) {
        log::error!("migration {} failed: {}", version, error);
        (self.on_failure)(version, error);
    }

    /// Invokes the completion channel, if one was supplied.
    pub fn notify_complete(&self) {
        if let Some(on_complete) = &self.on_complete {
            on_complete();
        }
    }
}
