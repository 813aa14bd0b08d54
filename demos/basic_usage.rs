//! Basic logger usage example
//!
//! Demonstrates direct logging to the console, level gating, structured
//! fields and thread-scoped context.
//!
//! Run with: cargo run --example basic_usage

use pipeline_logger::prelude::*;
use pipeline_logger::{info, warning};

#[derive(Debug, thiserror::Error)]
#[error("connection refused by {host}")]
struct ConnectError {
    host: String,
}

fn main() -> Result<()> {
    println!("=== Pipeline Logger - Basic Usage Example ===\n");

    let logger = Logger::builder("demo.basic")
        .min_level(LogLevel::Debug)
        .build()?;

    println!("1. Logging at different levels:");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warning("This is a warning message");
    logger.error("This is an error message");
    logger.critical("This is a critical message");

    println!("\n2. Level gate at WARNING - debug and info won't show:");
    let quiet = Logger::builder("demo.quiet")
        .min_level(LogLevel::Warning)
        .build()?;
    quiet.debug("Debug message (hidden)");
    quiet.info("Info message (hidden)");
    quiet.warning("Warning message (visible)");

    println!("\n3. Structured fields and context:");
    info!(logger, { "user_id" => 42, "plan" => "pro" }, "user signed in");
    {
        let _scope = context_scope(LogContext::new().with_request_id("req-7f3a"));
        warning!(logger, { "attempt" => 2 }, "payment retried");
    }
    let billing = logger.with_context(LogContext::new().with_service("billing", "1.4.0", "production"));
    billing.info("invoice generated");

    println!("\n4. Errors and metrics:");
    let err = ConnectError {
        host: "db.internal".to_string(),
    };
    logger.exception("database unavailable", &err);
    logger.counter("orders.created", 1);
    logger.timer("checkout.duration", 18.4);

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
