//! Clock abstraction.
//!
//! Received packets are stamped with the time they were processed. Routing
//! that through [`Environment`] keeps the adapter deterministic in tests:
//! production uses [`SystemEnv`], tests pin the clock.

use std::time::SystemTime;

/// Source of wall-clock time.
///
/// # Invariants
///
/// - Implementations must not share global state; two environments are
///   independent clocks.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Current wall-clock time.
    fn now(&self) -> SystemTime;
}

/// Real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}
