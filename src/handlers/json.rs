//! JSON handler for machine-readable output
//!
//! Writes one JSON object per event, newline-terminated (JSONL). Every object
//! has the shape `{"type": <kind>, "data": {...}}` where kind is
//! 0 for a created logger, 1 for a closed logger and 2 for a record.

use crate::core::{
    attribute::AttributeMap, Caller, Handler, LifecycleEvent, LifecycleKind, LogLevel,
    LoggerIdentity, Record, Result, TimestampFormat,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Discriminant of the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    LoggerCreated = 0,
    LoggerClosed = 1,
    Record = 2,
}

impl From<LifecycleKind> for MessageType {
    fn from(kind: LifecycleKind) -> Self {
        match kind {
            LifecycleKind::Created => MessageType::LoggerCreated,
            LifecycleKind::Closed => MessageType::LoggerClosed,
        }
    }
}

#[derive(Serialize)]
struct Envelope<T> {
    #[serde(rename = "type")]
    kind: u8,
    data: T,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Time {
    Text(String),
    Number(i64),
}

#[derive(Serialize)]
struct CallerData {
    file: Option<String>,
    line: Option<u32>,
}

impl From<&Caller> for CallerData {
    fn from(caller: &Caller) -> Self {
        Self {
            file: caller
                .file
                .as_ref()
                .map(|file| file.to_string_lossy().into_owned()),
            line: caller.line,
        }
    }
}

#[derive(Serialize)]
struct EventData<'a> {
    time: Time,
    caller: Option<CallerData>,
    logger: &'a LoggerIdentity,
}

#[derive(Serialize)]
struct RecordData<'a> {
    time: Time,
    level: &'static str,
    message: &'a str,
    error: Option<&'a str>,
    caller: Option<CallerData>,
    logger: &'a LoggerIdentity,
    attributes: AttributeMap<'a>,
}

/// Structured JSON handler over any writer
///
/// Lifecycle events are always written. Records below the minimum level are
/// skipped.
pub struct JsonHandler<W: Write + Send + Sync> {
    writer: W,
    level: LogLevel,
    timestamp_format: TimestampFormat,
    pretty: bool,
}

impl<W: Write + Send + Sync> JsonHandler<W> {
    pub fn new(writer: W, level: LogLevel) -> Self {
        Self {
            writer,
            level,
            timestamp_format: TimestampFormat::Rfc3339,
            pretty: false,
        }
    }

    /// Set the format of the `time` field
    ///
    /// Unix formats are written as JSON numbers, all others as strings.
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Indent each object over several lines
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn time(&self, timestamp: &DateTime<Utc>) -> Time {
        let formatted = self.timestamp_format.format(timestamp);
        if self.timestamp_format.is_numeric() {
            if let Ok(number) = formatted.parse() {
                return Time::Number(number);
            }
        }
        Time::Text(formatted)
    }

    fn write_message<T: Serialize>(&mut self, kind: MessageType, data: T) -> Result<()> {
        let envelope = Envelope {
            kind: kind as u8,
            data,
        };

        let mut line = if self.pretty {
            serde_json::to_vec_pretty(&envelope)?
        } else {
            serde_json::to_vec(&envelope)?
        };
        line.push(b'\n');

        self.writer.write_all(&line)?;
        Ok(())
    }

    fn write_event(&mut self, event: &LifecycleEvent) -> Result<()> {
        let data = EventData {
            time: self.time(&event.timestamp),
            caller: event.caller.as_ref().map(CallerData::from),
            logger: &event.logger,
        };
        self.write_message(event.kind.into(), data)
    }
}

impl JsonHandler<BufWriter<File>> {
    /// Append to the file at `path`, creating it if needed
    pub fn create<P: AsRef<Path>>(path: P, level: LogLevel) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file), level))
    }
}

impl<W: Write + Send + Sync> Handler for JsonHandler<W> {
    fn on_created(&mut self, event: &LifecycleEvent) {
        if let Err(e) = self.write_event(event) {
            tracing::warn!(error = %e, logger = %event.logger.id, "failed to write logger creation");
        }
    }

    fn on_closed(&mut self, event: &LifecycleEvent) -> Result<()> {
        self.write_event(event)?;
        self.writer.flush()?;
        Ok(())
    }

    fn handle_record(&mut self, logger: &LoggerIdentity, record: &Record) -> Result<()> {
        if record.level < self.level {
            return Ok(());
        }

        let data = RecordData {
            time: self.time(&record.timestamp),
            level: record.level.as_lowercase(),
            message: &record.message,
            error: record.first_error(),
            caller: record.caller.as_ref().map(CallerData::from),
            logger,
            attributes: AttributeMap(&record.attributes),
        };
        self.write_message(MessageType::Record, data)
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "json"
    }
}
