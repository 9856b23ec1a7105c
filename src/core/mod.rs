//! Core logger types and traits

pub mod attribute;
pub mod caller;
pub mod error;
pub mod handler;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod record;
pub mod stream;
pub mod timestamp;

pub use attribute::{args_to_attrs, Attribute, Value, BAD_KEY};
pub use caller::{Caller, CallerResolver};
pub use error::{LoggerError, Result};
pub use handler::Handler;
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, LoggerState};
pub use metrics::LoggerMetrics;
pub use record::{LifecycleEvent, LifecycleKind, LoggerIdentity, Record};
pub use timestamp::TimestampFormat;
