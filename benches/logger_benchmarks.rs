//! Criterion benchmarks for pipeline_logger

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pipeline_logger::fields;
use pipeline_logger::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn null_pipeline(level: LogLevel) -> Pipeline {
    Pipeline::builder()
        .min_level(level)
        .formatter(TextFormatter::new().with_colors(false))
        .writer(NullWriter)
        .build()
}

fn sample_record() -> Record {
    Record::new(LogLevel::Info, "bench.http", "request completed")
        .with_fields(fields! {
            "method" => "GET",
            "path" => "/api/v1/orders",
            "status" => 200,
            "latency_ms" => 12.5,
            "cached" => false,
        })
}

// ============================================================================
// Level Gate Benchmarks
// ============================================================================

fn bench_level_gate(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_gate");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::builder("bench.gate")
        .pipeline(null_pipeline(LogLevel::Error))
        .build()
        .unwrap();

    group.bench_function("disabled_method", |b| {
        b.iter(|| logger.debug(black_box("never rendered")));
    });

    group.bench_function("disabled_macro", |b| {
        b.iter(|| pipeline_logger::debug!(logger, "never rendered {}", black_box(42)));
    });

    group.finish();
}

// ============================================================================
// Dispatch Mode Benchmarks
// ============================================================================

fn bench_direct_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("direct_logging");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::builder("bench.direct")
        .pipeline(null_pipeline(LogLevel::Debug))
        .build()
        .unwrap();

    group.bench_function("info", |b| {
        b.iter(|| logger.info(black_box("Info message")));
    });

    group.bench_function("info_with_fields", |b| {
        b.iter(|| {
            pipeline_logger::info!(logger, { "user_id" => 42, "action" => "login" }, "user event")
        });
    });

    group.finish();
}

fn bench_batched_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("batched_logging");
    group.throughput(Throughput::Elements(1));

    for batch_size in [1usize, 16, 128] {
        let logger = Logger::builder("bench.batched")
            .pipeline(null_pipeline(LogLevel::Debug))
            .batched(batch_size)
            .build()
            .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(batch_size), &logger, |b, logger| {
            b.iter(|| logger.info(black_box("Batched message")));
        });
        logger.flush();
    }

    group.finish();
}

fn bench_async_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("async_logging");
    group.throughput(Throughput::Elements(1));

    for defer in [false, true] {
        let controller = Arc::new(BackendController::new());
        let config = AsyncConfig::builder()
            .max_queue_size(100_000)
            .worker_count(2)
            .overflow_strategy(OverflowStrategy::DropNewest)
            .defer_formatting(defer)
            .build()
            .unwrap();
        let logger = Logger::builder("bench.async")
            .pipeline(null_pipeline(LogLevel::Debug))
            .async_mode(config)
            .backend(Arc::clone(&controller))
            .build()
            .unwrap();

        let label = if defer { "deferred_format" } else { "caller_format" };
        group.bench_function(label, |b| {
            b.iter(|| logger.info(black_box("Async message")));
        });

        controller.shutdown(Duration::from_secs(5));
    }

    group.finish();
}

// ============================================================================
// Concurrent Logging Benchmarks
// ============================================================================

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");
    group.throughput(Throughput::Elements(4 * 100));

    let controller = Arc::new(BackendController::new());
    let logger = Logger::builder("bench.concurrent")
        .pipeline(null_pipeline(LogLevel::Debug))
        .async_mode(AsyncConfig::builder().worker_count(2).build().unwrap())
        .backend(Arc::clone(&controller))
        .build()
        .unwrap();

    group.bench_function("multi_thread_4", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let logger = logger.clone();
                    std::thread::spawn(move || {
                        for _ in 0..100 {
                            logger.info("Concurrent message");
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
    controller.shutdown(Duration::from_secs(5));
}

// ============================================================================
// Formatter Benchmarks
// ============================================================================

fn bench_formatters(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatters");
    group.throughput(Throughput::Elements(1));

    let record = sample_record();
    let text = TextFormatter::new().with_colors(false);
    let json = JsonFormatter::new();
    let logfmt = LogfmtFormatter::new();

    group.bench_function("text", |b| b.iter(|| text.format(black_box(&record))));
    group.bench_function("json", |b| b.iter(|| json.format(black_box(&record))));
    group.bench_function("logfmt", |b| b.iter(|| logfmt.format(black_box(&record))));

    let line = json.format(&record).unwrap();
    group.bench_function("json_decode", |b| {
        b.iter(|| JsonFormatter::decode(black_box(&line)))
    });

    group.finish();
}

// ============================================================================
// Record Benchmarks
// ============================================================================

fn bench_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("record");
    group.throughput(Throughput::Elements(1));

    group.bench_function("new", |b| {
        b.iter(|| Record::new(LogLevel::Info, "bench", black_box("plain message")))
    });

    group.bench_function("new_sanitized", |b| {
        b.iter(|| Record::new(LogLevel::Info, "bench", black_box("line one\nline two\tend")))
    });

    let record = sample_record();
    group.bench_function("clone_shares_fields", |b| b.iter(|| black_box(&record).clone()));

    group.finish();
}

criterion_group!(
    benches,
    bench_level_gate,
    bench_direct_logging,
    bench_batched_logging,
    bench_async_logging,
    bench_concurrent_logging,
    bench_formatters,
    bench_record,
);
criterion_main!(benches);
