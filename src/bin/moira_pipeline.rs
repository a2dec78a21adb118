//! Moira Pipeline Binary - Producer/Consumer Demo
//!
//! Pipeline telemetry in-process dengan:
//! - Beberapa producer thread dengan trafik campuran low/high priority
//! - Satu consumer thread yang men-drain buffer
//! - Laporan statistik periodik
//!
//! Usage:
//!   cargo run --release --bin moira_pipeline [OPTIONS]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use moira::core::{Priority, PriorityRingBuffer};

/// Kapasitas buffer pipeline. Sengaja kecil supaya eviction terlihat.
const CAPACITY: usize = 256;

/// Pipeline configuration
struct PipelineConfig {
    producers: u32,
    rate: u32, // samples per second per producer
    duration_secs: u32,
    alarm_percent: u32,
    verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            producers: 4,
            rate: 10_000,
            duration_secs: 10,
            alarm_percent: 5,
            verbose: false,
        }
    }
}

/// Sample telemetry yang mengalir lewat buffer.
///
/// Sample alarm adalah high-priority: tidak boleh kalah dari trafik
/// telemetry biasa saat buffer penuh.
#[derive(Clone, Copy)]
struct SensorSample {
    producer_id: u32,
    sequence: u64,
    value: u64,
    timestamp_ns: u64,
    alarm: bool,
}

impl Priority for SensorSample {
    #[inline(always)]
    fn is_high_priority(&self) -> bool {
        self.alarm
    }
}

/// Get current timestamp in nanoseconds
#[inline(always)]
fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Pipeline statistics
struct PipelineStats {
    produced: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    consumed: AtomicU64,
    consumed_alarms: AtomicU64,
}

impl PipelineStats {
    fn new() -> Self {
        Self {
            produced: AtomicU64::new(0),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            consumed: AtomicU64::new(0),
            consumed_alarms: AtomicU64::new(0),
        }
    }

    fn print_stats(&self, uptime: Duration, resident: usize) {
        let produced = self.produced.load(Ordering::Relaxed);
        let accepted = self.accepted.load(Ordering::Relaxed);
        let rejected = self.rejected.load(Ordering::Relaxed);
        let consumed = self.consumed.load(Ordering::Relaxed);
        let alarms = self.consumed_alarms.load(Ordering::Relaxed);

        let rate_in = produced as f64 / uptime.as_secs_f64();
        let rate_out = consumed as f64 / uptime.as_secs_f64();

        println!("\n📊 Pipeline Stats (uptime: {:.1}s)", uptime.as_secs_f64());
        println!("   Produced:   {} ({:.1}/sec)", produced, rate_in);
        println!("   Accepted:   {}", accepted);
        println!("   Consumed:   {} ({:.1}/sec)", consumed, rate_out);
        println!("   Alarms out: {}", alarms);
        println!("   Resident:   {}/{}", resident, CAPACITY);
        if rejected > 0 {
            println!("   Rejected:   {} ⚠️", rejected);
        }
    }
}

/// Producer thread: inject samples dengan rate limiting
fn producer_loop(
    id: u32,
    samples_per_sec: u32,
    alarm_percent: u32,
    buffer: Arc<PriorityRingBuffer<SensorSample, CAPACITY>>,
    stats: Arc<PipelineStats>,
    stop_flag: Arc<AtomicBool>,
) {
    let interval = Duration::from_nanos(1_000_000_000 / samples_per_sec.max(1) as u64);
    let mut next_send = Instant::now();
    let mut sequence = 0u64;
    // LCG sederhana untuk trafik deterministik per producer
    let mut rng_state = 0x9E3779B9u64.wrapping_mul(id as u64 + 1);

    while !stop_flag.load(Ordering::Relaxed) {
        // Rate limiting
        let now = Instant::now();
        if now < next_send {
            thread::sleep(next_send - now);
        }
        next_send = Instant::now() + interval;

        rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let sample = SensorSample {
            producer_id: id,
            sequence,
            value: rng_state >> 16,
            timestamp_ns: now_ns(),
            alarm: (rng_state % 100) < alarm_percent as u64,
        };

        stats.produced.fetch_add(1, Ordering::Relaxed);
        if buffer.insert(sample) {
            stats.accepted.fetch_add(1, Ordering::Relaxed);
        } else {
            stats.rejected.fetch_add(1, Ordering::Relaxed);
        }

        sequence += 1;
    }
}

/// Consumer thread: drain buffer sampai stop flag dan buffer kosong
fn consumer_loop(
    buffer: Arc<PriorityRingBuffer<SensorSample, CAPACITY>>,
    stats: Arc<PipelineStats>,
    stop_flag: Arc<AtomicBool>,
    verbose: bool,
) {
    loop {
        match buffer.remove() {
            Some(sample) => {
                stats.consumed.fetch_add(1, Ordering::Relaxed);
                if sample.alarm {
                    stats.consumed_alarms.fetch_add(1, Ordering::Relaxed);
                    if verbose {
                        let age_us = now_ns().saturating_sub(sample.timestamp_ns) / 1000;
                        println!(
                            "   🚨 alarm from producer {} seq {} value {:012x} (age: {} μs)",
                            sample.producer_id, sample.sequence, sample.value, age_us
                        );
                    }
                }
            }
            None => {
                if stop_flag.load(Ordering::Relaxed) && buffer.is_empty() {
                    break;
                }
                thread::yield_now();
            }
        }
    }
}

/// Main pipeline run
fn run_pipeline(config: PipelineConfig) {
    println!("🚀 MOIRA PIPELINE - Priority Traffic Demo");
    println!("=========================================\n");

    println!("Configuration:");
    println!("  Producers:  {}", config.producers);
    println!("  Rate:       {} samples/sec each", config.rate);
    println!("  Duration:   {}s", config.duration_secs);
    println!("  Alarms:     {}%", config.alarm_percent);
    println!("  Capacity:   {} slots", CAPACITY);
    println!("\n📡 Pipeline running...\n");

    let buffer: Arc<PriorityRingBuffer<SensorSample, CAPACITY>> =
        Arc::new(PriorityRingBuffer::new());
    let stats = Arc::new(PipelineStats::new());
    let stop_flag = Arc::new(AtomicBool::new(false));

    // === PHASE 1: Spawn consumer ===
    let consumer = {
        let buffer = Arc::clone(&buffer);
        let stats = Arc::clone(&stats);
        let stop = Arc::clone(&stop_flag);
        let verbose = config.verbose;
        thread::spawn(move || consumer_loop(buffer, stats, stop, verbose))
    };

    // === PHASE 2: Spawn producers ===
    let producers: Vec<_> = (0..config.producers)
        .map(|id| {
            let buffer = Arc::clone(&buffer);
            let stats = Arc::clone(&stats);
            let stop = Arc::clone(&stop_flag);
            let rate = config.rate;
            let alarm_percent = config.alarm_percent;
            thread::spawn(move || producer_loop(id, rate, alarm_percent, buffer, stats, stop))
        })
        .collect();

    // === PHASE 3: Periodic stats sampai durasi habis ===
    let start_time = Instant::now();
    let mut last_stats_print = Instant::now();
    let end_time = start_time + Duration::from_secs(config.duration_secs as u64);

    while Instant::now() < end_time {
        thread::sleep(Duration::from_millis(100));
        if last_stats_print.elapsed() > Duration::from_secs(2) {
            stats.print_stats(start_time.elapsed(), buffer.len());
            last_stats_print = Instant::now();
        }
    }

    // === PHASE 4: Shutdown ===
    stop_flag.store(true, Ordering::Relaxed);
    for handle in producers {
        handle.join().ok();
    }
    consumer.join().ok();

    // === PHASE 5: Final report ===
    let uptime = start_time.elapsed();
    stats.print_stats(uptime, buffer.len());

    let snap = buffer.stats().snapshot();
    println!("\n📊 FINAL REPORT");
    println!("===============");
    println!("  Duration:       {:.2}s", uptime.as_secs_f64());
    println!("  Evicted low:    {}", snap.evicted_low);
    println!("  Evicted high:   {}", snap.evicted_high);
    println!("  Rejected:       {}", snap.rejected);

    let alarms = stats.consumed_alarms.load(Ordering::Relaxed);
    if snap.evicted_high == 0 {
        println!("\n✅ PIPELINE OK - {} alarms delivered, none displaced", alarms);
    } else {
        println!(
            "\n⚠️  {} alarms displaced by newer alarms (buffer saturated)",
            snap.evicted_high
        );
    }
}

/// Parse command line arguments
fn parse_args() -> PipelineConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = PipelineConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--producers" | "-p" => {
                if i + 1 < args.len() {
                    config.producers = args[i + 1].parse().unwrap_or(4);
                    i += 1;
                }
            }
            "--rate" | "-r" => {
                if i + 1 < args.len() {
                    config.rate = args[i + 1].parse().unwrap_or(10_000);
                    i += 1;
                }
            }
            "--duration" | "-d" => {
                if i + 1 < args.len() {
                    config.duration_secs = args[i + 1].parse().unwrap_or(10);
                    i += 1;
                }
            }
            "--alarms" | "-a" => {
                if i + 1 < args.len() {
                    config.alarm_percent = args[i + 1].parse().unwrap_or(5).min(100);
                    i += 1;
                }
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--help" | "-h" => {
                println!("Moira Pipeline - Priority Traffic Demo\n");
                println!("Usage: moira_pipeline [OPTIONS]\n");
                println!("Options:");
                println!("  -p, --producers <N>  Producer threads (default: 4)");
                println!("  -r, --rate <N>       Samples/sec per producer (default: 10000)");
                println!("  -d, --duration <S>   Run duration in seconds (default: 10)");
                println!("  -a, --alarms <PCT>   Alarm percentage 0-100 (default: 5)");
                println!("  -v, --verbose        Print each alarm as it is consumed");
                println!("  -h, --help           Show this help");
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn main() {
    let config = parse_args();
    run_pipeline(config);
}
