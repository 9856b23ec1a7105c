//! Shared test handlers

#![allow(dead_code)]

use parking_lot::Mutex;
use rust_logger_tree::prelude::*;
use std::io::{self, Write};
use std::sync::Arc;

/// Everything a handler has observed, in order
#[derive(Debug, Clone)]
pub enum Seen {
    Created(LifecycleEvent),
    Closed(LifecycleEvent),
    Record(LoggerIdentity, Record),
}

/// Handler that keeps every callback for later inspection
pub struct Recorder {
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Recorder {
    pub fn new() -> (Self, Arc<Mutex<Vec<Seen>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                seen: Arc::clone(&seen),
            },
            seen,
        )
    }
}

impl Handler for Recorder {
    fn on_created(&mut self, event: &LifecycleEvent) {
        self.seen.lock().push(Seen::Created(event.clone()));
    }

    fn on_closed(&mut self, event: &LifecycleEvent) -> Result<()> {
        self.seen.lock().push(Seen::Closed(event.clone()));
        Ok(())
    }

    fn handle_record(&mut self, logger: &LoggerIdentity, record: &Record) -> Result<()> {
        self.seen
            .lock()
            .push(Seen::Record(logger.clone(), record.clone()));
        Ok(())
    }

    fn name(&self) -> &str {
        "recorder"
    }
}

/// Handler that fails every fallible callback
pub struct Failing(pub &'static str);

impl Handler for Failing {
    fn on_created(&mut self, _event: &LifecycleEvent) {}

    fn on_closed(&mut self, _event: &LifecycleEvent) -> Result<()> {
        Err(LoggerError::handler(self.0, "close rejected"))
    }

    fn handle_record(&mut self, _logger: &LoggerIdentity, _record: &Record) -> Result<()> {
        Err(LoggerError::handler(self.0, "record rejected"))
    }

    fn name(&self) -> &str {
        self.0
    }
}

/// Cloneable in-memory writer
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
