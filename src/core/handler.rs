//! Handler trait for log output destinations

use super::{
    error::Result,
    record::{LifecycleEvent, LoggerIdentity, Record},
};

/// Receives lifecycle events and records from every logger in a tree
///
/// Handlers are registered on the root and invoked in registration order.
/// Level filtering is the handler's own concern: dispatch delivers every
/// record unconditionally.
pub trait Handler: Send + Sync {
    /// A child logger was created. Best-effort, cannot fail the creation.
    fn on_created(&mut self, event: &LifecycleEvent);

    /// A logger was closed
    fn on_closed(&mut self, event: &LifecycleEvent) -> Result<()>;

    /// A record was emitted by `logger`
    fn handle_record(&mut self, logger: &LoggerIdentity, record: &Record) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}
