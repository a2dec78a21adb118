//! Moira - Priority-Aware Fixed-Capacity Ring Buffer
//!
//! Arsitektur:
//! - Fixed-Capacity: Storage dialokasi sekali saat init
//! - Priority-Aware: Eviction berbasis prioritas saat penuh
//! - Mutual Exclusion: Satu Mutex, operasi bounded O(N)

use moira::core::{Prioritized, PriorityRingBuffer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

fn main() {
    println!("🚀 Moira Priority Ring Buffer - PoC v0.1");
    println!("=========================================\n");

    // Benchmark jalur FIFO normal
    benchmark_fifo_path();

    // Benchmark jalur eviction (buffer penuh)
    benchmark_eviction_paths();

    // Benchmark producer/consumer dengan kontensi lock
    benchmark_contended();

    println!("\n✅ All benchmarks complete!");
    println!("\nTo run the pipeline demo: cargo run --release --bin moira_pipeline");
}

fn benchmark_fifo_path() {
    println!("📊 FIFO Path Benchmark (insert/remove tanpa eviction)");
    println!("-----------------------------------------------------");

    const ITERATIONS: usize = 1_000_000;
    let rb: PriorityRingBuffer<Prioritized<u64>, 65536> = PriorityRingBuffer::new();

    // Warm up
    for i in 0..1000 {
        rb.insert(Prioritized::low(i));
    }
    for _ in 0..1000 {
        rb.remove();
    }

    // Benchmark insert
    let start = Instant::now();
    for i in 0..ITERATIONS {
        if !rb.insert(Prioritized::low(i as u64)) {
            rb.remove();
        }
    }
    let insert_duration = start.elapsed();

    // Drain
    while rb.remove().is_some() {}

    // Benchmark remove
    for i in 0..ITERATIONS.min(65536) {
        rb.insert(Prioritized::low(i as u64));
    }

    let start = Instant::now();
    let mut removed = 0usize;
    while rb.remove().is_some() {
        removed += 1;
    }
    let remove_duration = start.elapsed();

    let insert_ns = insert_duration.as_nanos() as f64 / ITERATIONS as f64;
    let remove_ns = remove_duration.as_nanos() as f64 / removed.max(1) as f64;

    println!("  Operations: {}", ITERATIONS);
    println!(
        "  Insert latency: {:.2} ns/op ({:.3} μs/op)",
        insert_ns,
        insert_ns / 1000.0
    );
    println!(
        "  Remove latency: {:.2} ns/op ({:.3} μs/op)",
        remove_ns,
        remove_ns / 1000.0
    );
    println!(
        "  Throughput:     {:.2} M ops/sec\n",
        ITERATIONS as f64 / insert_duration.as_secs_f64() / 1_000_000.0
    );
}

fn benchmark_eviction_paths() {
    println!("📊 Eviction Path Benchmark (buffer penuh)");
    println!("-----------------------------------------");

    const ITERATIONS: usize = 100_000;
    const CAPACITY: usize = 1024;

    // Jalur 1: low menggantikan low tertua
    let rb: PriorityRingBuffer<Prioritized<u64>, CAPACITY> = PriorityRingBuffer::new();
    for i in 0..CAPACITY {
        rb.insert(Prioritized::low(i as u64));
    }

    let start = Instant::now();
    for i in 0..ITERATIONS {
        rb.insert(Prioritized::low(i as u64));
    }
    let replace_low_duration = start.elapsed();

    // Jalur 2: high menggantikan high tertua (FIFO antar prioritas setara)
    let rb: PriorityRingBuffer<Prioritized<u64>, CAPACITY> = PriorityRingBuffer::new();
    for i in 0..CAPACITY {
        rb.insert(Prioritized::high(i as u64));
    }

    let start = Instant::now();
    for i in 0..ITERATIONS {
        rb.insert(Prioritized::high(i as u64));
    }
    let replace_high_duration = start.elapsed();

    // Jalur 3: low ditolak oleh buffer penuh high (scan penuh tanpa mutasi)
    let start = Instant::now();
    let mut rejected = 0usize;
    for i in 0..ITERATIONS {
        if !rb.insert(Prioritized::low(i as u64)) {
            rejected += 1;
        }
    }
    let reject_duration = start.elapsed();

    let replace_low_ns = replace_low_duration.as_nanos() as f64 / ITERATIONS as f64;
    let replace_high_ns = replace_high_duration.as_nanos() as f64 / ITERATIONS as f64;
    let reject_ns = reject_duration.as_nanos() as f64 / ITERATIONS as f64;

    println!("  Capacity: {} slots", CAPACITY);
    println!("  Operations: {}", ITERATIONS);
    println!(
        "  Replace-low latency:  {:.2} ns/op ({:.3} μs/op)",
        replace_low_ns,
        replace_low_ns / 1000.0
    );
    println!(
        "  Replace-high latency: {:.2} ns/op ({:.3} μs/op)",
        replace_high_ns,
        replace_high_ns / 1000.0
    );
    println!(
        "  Reject latency:       {:.2} ns/op ({:.3} μs/op, {} rejected)\n",
        reject_ns,
        reject_ns / 1000.0,
        rejected
    );
}

fn benchmark_contended() {
    println!("📊 Contended Benchmark (producer + consumer, satu lock)");
    println!("-------------------------------------------------------");

    const ITEMS: usize = 500_000;
    const CAPACITY: usize = 1024;

    let rb: Arc<PriorityRingBuffer<Prioritized<u64>, CAPACITY>> =
        Arc::new(PriorityRingBuffer::new());
    let done = Arc::new(AtomicBool::new(false));

    let consumer_rb = Arc::clone(&rb);
    let consumer_done = Arc::clone(&done);
    let consumer = std::thread::spawn(move || {
        let mut consumed = 0u64;
        loop {
            match consumer_rb.remove() {
                Some(_) => consumed += 1,
                None => {
                    if consumer_done.load(Ordering::Acquire) && consumer_rb.is_empty() {
                        break;
                    }
                    std::thread::yield_now();
                }
            }
        }
        consumed
    });

    let start = Instant::now();
    let mut accepted = 0u64;
    for i in 0..ITEMS {
        // 1 dari 10 item high-priority, pola deterministik
        let item = if i % 10 == 0 {
            Prioritized::high(i as u64)
        } else {
            Prioritized::low(i as u64)
        };
        if rb.insert(item) {
            accepted += 1;
        }
    }
    let produce_duration = start.elapsed();
    done.store(true, Ordering::Release);

    let consumed = consumer.join().unwrap_or(0);
    let snap = rb.stats().snapshot();

    println!("  Items produced:  {}", ITEMS);
    println!("  Accepted:        {}", accepted);
    println!("  Consumed:        {}", consumed);
    println!(
        "  Evicted:         {} (low: {}, high: {})",
        snap.evicted(),
        snap.evicted_low,
        snap.evicted_high
    );
    println!("  Rejected:        {}", snap.rejected);
    println!(
        "  Producer rate:   {:.2} M items/sec",
        ITEMS as f64 / produce_duration.as_secs_f64() / 1_000_000.0
    );
}
