//! File logging example
//!
//! Demonstrates one pipeline writing to both the console and a file, with a
//! batched logger in front of it.
//!
//! Run with: cargo run --example file_logging

use pipeline_logger::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Pipeline Logger - File Logging Example ===\n");

    let pipeline = Pipeline::builder()
        .min_level(LogLevel::Debug)
        .enricher(StaticFieldsEnricher::default().with("service", "inventory"))
        .filter(LoggerNameFilter::new().deny("demo.noisy"))
        .formatter(LogfmtFormatter::new())
        .writer(ConsoleWriter::new())
        .writer(FileWriter::new("application.log")?)
        .build();
    let pipeline = Arc::new(pipeline);

    let logger = Logger::builder("demo.file")
        .shared_pipeline(Arc::clone(&pipeline))
        .batched(4)
        .build()?;

    println!("1. Logging to both console and file:");
    logger.info("Application started");
    logger.debug("Loading configuration...");
    logger.info("Configuration loaded successfully");
    logger.warning("Using default settings for some options");
    logger.info("Connecting to database...");
    logger.info("Database connection established");
    logger.error("Failed to load optional plugin");
    logger.info("Application initialization complete");

    println!("\n2. A filtered logger sharing the same pipeline:");
    let noisy = Logger::builder("demo.noisy")
        .shared_pipeline(Arc::clone(&pipeline))
        .build()?;
    noisy.info("This line is dropped by the name filter");

    println!("\n3. Performing some operations:");
    for i in 1..=5 {
        logger.info(format!("Processing item {}/5", i));
        if i == 3 {
            logger.warning("Item 3 took longer than expected");
        }
    }
    logger.info("All operations completed");

    // Write the partial batch and flush the file
    logger.flush();

    let metrics = pipeline.metrics();
    println!(
        "\n   rendered={} filtered={} written={}",
        metrics.rendered(),
        metrics.filtered(),
        metrics.written()
    );

    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.log' for the full log output");

    Ok(())
}
