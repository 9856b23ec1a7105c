//! # Rust Logger Tree
//!
//! A hierarchical structured-logging core. Loggers form a tree: every child
//! shares the handlers registered on its root, and closing a logger closes
//! its whole subtree first.
//!
//! ## Features
//!
//! - **Logger trees**: owned children, weak parent links, tree-wide handlers
//! - **Caller resolution**: records point at the code that logged them
//! - **Structured attributes**: key/value pairs with nested groups
//! - **Exhaustive lifecycle**: closing reports every failure, not the first
//!
//! ## Example
//!
//! ```
//! use rust_logger_tree::prelude::*;
//!
//! let root = Logger::builder()
//!     .handler(JsonHandler::new(Vec::new(), LogLevel::Info))
//!     .build();
//!
//! let worker = root.child();
//! worker.info("job started", args!["job", 17]).unwrap();
//!
//! root.close().unwrap();
//! assert!(worker.is_closed());
//! ```

pub mod core;
pub mod handlers;
pub mod macros;

pub mod prelude {
    #[cfg(feature = "json")]
    pub use crate::handlers::JsonHandler;
    #[cfg(feature = "pretty")]
    pub use crate::handlers::PrettyHandler;

    pub use crate::args;
    pub use crate::core::{
        Attribute, Caller, CallerResolver, Handler, LifecycleEvent, LifecycleKind, LogLevel, Logger,
        LoggerBuilder, LoggerError, LoggerIdentity, LoggerMetrics, LoggerState, Record, Result,
        TimestampFormat, Value,
    };
}

#[cfg(feature = "json")]
pub use crate::handlers::JsonHandler;
#[cfg(feature = "pretty")]
pub use crate::handlers::PrettyHandler;

pub use crate::core::{
    Attribute, Caller, CallerResolver, Handler, LifecycleEvent, LifecycleKind, LogLevel, Logger, LoggerBuilder,
    LoggerError, LoggerIdentity, LoggerMetrics, LoggerState, Record, Result, TimestampFormat,
    Value,
};
