//! Logging macros for ergonomic record construction.
//!
//! The message accepts `format!` arguments. Attributes follow a `;` as a
//! flat key/value list, converted with [`Value::from`](crate::Value).
//!
//! # Examples
//!
//! ```
//! use rust_logger_tree::prelude::*;
//! use rust_logger_tree::info;
//!
//! let logger = Logger::new();
//!
//! // Message only
//! info!(logger, "Server started").unwrap();
//!
//! // Format arguments and attributes
//! let port = 8080;
//! info!(logger, "listening on {}", port; "tls", true, "workers", 4).unwrap();
//! ```

/// Build a variadic argument array for the logging methods.
///
/// # Examples
///
/// ```
/// use rust_logger_tree::{args, Value};
///
/// let args = args!["user", "ada", "attempts", 3];
/// assert_eq!(args[3], Value::Int(3));
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        [$($crate::Value::from($arg)),*]
    };
}

/// Log at an explicit level.
///
/// Never panics on dispatch failure, whatever the panic-on-error setting.
///
/// ```
/// # use rust_logger_tree::prelude::*;
/// # let logger = Logger::new();
/// use rust_logger_tree::log;
/// log!(logger, LogLevel::Info, "Simple message").unwrap();
/// log!(logger, LogLevel::Error, "Error code: {}", 500; "retry", false).unwrap();
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($fmt:expr),+ ; $($arg:expr),* $(,)?) => {
        $logger.log($level, format!($($fmt),+), $crate::args![$($arg),*])
    };
    ($logger:expr, $level:expr, $($fmt:expr),+ $(,)?) => {
        $logger.log($level, format!($($fmt),+), $crate::args![])
    };
}

/// Log a debug-level message.
///
/// ```
/// # use rust_logger_tree::prelude::*;
/// # let logger = Logger::new();
/// use rust_logger_tree::debug;
/// debug!(logger, "Counter value: {}", 10).unwrap();
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($fmt:expr),+ ; $($arg:expr),* $(,)?) => {
        $logger.debug(format!($($fmt),+), $crate::args![$($arg),*])
    };
    ($logger:expr, $($fmt:expr),+ $(,)?) => {
        $logger.debug(format!($($fmt),+), $crate::args![])
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($fmt:expr),+ ; $($arg:expr),* $(,)?) => {
        $logger.info(format!($($fmt),+), $crate::args![$($arg),*])
    };
    ($logger:expr, $($fmt:expr),+ $(,)?) => {
        $logger.info(format!($($fmt),+), $crate::args![])
    };
}

/// Log a warning-level message.
///
/// ```
/// # use rust_logger_tree::prelude::*;
/// # let logger = Logger::new();
/// use rust_logger_tree::warn;
/// warn!(logger, "Memory usage high"; "percent", 85).unwrap();
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($fmt:expr),+ ; $($arg:expr),* $(,)?) => {
        $logger.warn(format!($($fmt),+), $crate::args![$($arg),*])
    };
    ($logger:expr, $($fmt:expr),+ $(,)?) => {
        $logger.warn(format!($($fmt),+), $crate::args![])
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($fmt:expr),+ ; $($arg:expr),* $(,)?) => {
        $logger.error(format!($($fmt),+), $crate::args![$($arg),*])
    };
    ($logger:expr, $($fmt:expr),+ $(,)?) => {
        $logger.error(format!($($fmt),+), $crate::args![])
    };
}

/// Log a fatal-level message and exit the process with status 1.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($fmt:expr),+ ; $($arg:expr),* $(,)?) => {
        $logger.fatal(format!($($fmt),+), $crate::args![$($arg),*])
    };
    ($logger:expr, $($fmt:expr),+ $(,)?) => {
        $logger.fatal(format!($($fmt),+), $crate::args![])
    };
}

/// Log a panic-level message and panic.
///
/// Named to avoid shadowing `std::panic!`.
#[macro_export]
macro_rules! panic_log {
    ($logger:expr, $($fmt:expr),+ ; $($arg:expr),* $(,)?) => {
        $logger.panic(format!($($fmt),+), $crate::args![$($arg),*])
    };
    ($logger:expr, $($fmt:expr),+ $(,)?) => {
        $logger.panic(format!($($fmt),+), $crate::args![])
    };
}
