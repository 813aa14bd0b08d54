//! Async logging example
//!
//! Demonstrates the shared async backend, a private backend with a custom
//! overflow strategy, and draining both before exit.
//!
//! Run with: cargo run --example async_logging

use pipeline_logger::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Pipeline Logger - Async Logging Example ===\n");

    println!("1. Registry logger on the shared backend:");
    let logger = get_async_logger("demo.async");
    for i in 0..10 {
        logger.info(format!("Message #{}", i));
    }
    if let Some(stats) = logger.backend_stats() {
        println!("   enqueued so far: {}", stats.enqueued());
    }

    println!("\n2. Multi-threaded logging:");
    let handles: Vec<_> = (0..5)
        .map(|thread_id| {
            let logger = logger.clone();
            thread::spawn(move || {
                for i in 0..20 {
                    logger.info(format!("Thread {} - Message {}", thread_id, i));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("producer thread panicked");
    }
    println!("   5 threads logged 20 messages each");

    let drained = shutdown_async_logging(DEFAULT_SHUTDOWN_TIMEOUT);
    println!("   shared backend drained: {}", drained);

    println!("\n3. Private backend dropping the oldest entries:");
    let controller = Arc::new(BackendController::with_overflow_callback(Arc::new(
        |dropped: u64| {
            if dropped % 100 == 0 {
                eprintln!("   {} entries dropped so far", dropped);
            }
        },
    )));
    let config = AsyncConfig::builder()
        .max_queue_size(64)
        .worker_count(2)
        .batch_size(16)
        .overflow_strategy(OverflowStrategy::DropOldest)
        .defer_formatting(true)
        .build()?;
    let bursty = Logger::builder("demo.burst")
        .pipeline(
            Pipeline::builder()
                .formatter(JsonFormatter::new())
                .writer(NullWriter)
                .build(),
        )
        .async_mode(config)
        .backend(Arc::clone(&controller))
        .build()?;

    for i in 0..5_000 {
        bursty.info(format!("burst {}", i));
    }
    controller.shutdown(Duration::from_secs(2));

    let stats = controller.stats();
    println!("   {}", stats.to_json());

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
