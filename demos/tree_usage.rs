//! Logger tree usage example
//!
//! Demonstrates a tree of loggers sharing a pretty terminal handler and a
//! JSON handler, structured attributes, and cascading close.
//!
//! Run with: cargo run --example tree_usage

use rust_logger_tree::prelude::*;
use rust_logger_tree::{info, warn};
use std::io::Cursor;

fn main() -> Result<()> {
    println!("=== Rust Logger Tree - Usage Example ===\n");

    // Handlers live on the root and are shared by every descendant
    let root = Logger::builder()
        .handler(PrettyHandler::stdout(LogLevel::Debug))
        .handler(JsonHandler::new(std::io::stderr(), LogLevel::Warn))
        .build();

    println!("1. Logging from the root:");
    root.info("service starting", args!["version", env!("CARGO_PKG_VERSION")])?;

    println!("\n2. Child loggers for subsystems:");
    let http = root.child();
    let db = root.child();
    let pool = db.child();

    info!(http, "listening on port {}", 8080; "tls", false)?;
    pool.debug(
        "pool ready",
        args![
            "size",
            16,
            "target",
            Value::group(vec![
                Attribute::new("host", "localhost"),
                Attribute::new("port", 5432),
            ]),
        ],
    )?;

    println!("\n3. Errors and unpaired arguments:");
    let err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
    warn!(db, "replica unavailable"; "cause", Value::error(&err), "orphan")?;

    println!("\n4. Relaying lines from a reader:");
    let output = Cursor::new("migration 001 applied\nmigration 002 applied\n");
    db.log_lines_with(output, LogLevel::Info, |line| format!("migrate: {}", line), &[])?;

    println!("\n5. Closing the tree:");
    println!("   loggers in tree: {}", 1 + root.children().len() + db.children().len());
    root.close()?;
    println!("   pool closed: {}", pool.is_closed());

    let metrics = root.metrics();
    println!(
        "   records: {}, loggers created: {}, closed: {}",
        metrics.records_dispatched(),
        metrics.loggers_created(),
        metrics.loggers_closed()
    );

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
