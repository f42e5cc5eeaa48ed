//! DHAT heap profiler for heapcache.
//!
//! Run with: cargo run --bin dhat_profile --release --features dhat-heap
//! View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::process::ExitCode;

use heapcache::error::Result;
use heapcache::policy::priority::PriorityCache;
use heapcache::store::MemoryBackend;
use serde_json::json;

/// Simple XorShift64 RNG for deterministic workloads.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (u64::MAX as f64);
        (self.next_u64() as f64) * SCALE
    }
}

/// Random priorities: every insert past capacity evicts one entry.
fn random_priority_churn(
    cache: &mut PriorityCache<&MemoryBackend>,
    operations: usize,
    seed: u64,
) -> Result<()> {
    let mut rng = XorShift64::new(seed);
    for i in 0..operations {
        let key = format!("r{i}");
        cache.add_item(key.as_str(), json!({ "n": i }), rng.next_f64() * 1000.0)?;
    }
    Ok(())
}

/// Rising priorities: every newcomer sinks to the bottom of the heap.
fn rising_priority_churn(
    cache: &mut PriorityCache<&MemoryBackend>,
    operations: usize,
) -> Result<()> {
    for i in 0..operations {
        let key = format!("s{i}");
        cache.add_item(key.as_str(), json!(i), 1000.0 + i as f64)?;
    }
    Ok(())
}

/// Reprioritize live entries in place.
fn update_workload(
    cache: &mut PriorityCache<&MemoryBackend>,
    operations: usize,
    seed: u64,
) -> Result<()> {
    let mut rng = XorShift64::new(seed);
    let mut updated = 0;
    while updated < operations {
        let Some(lowest) = cache.peek_lowest()? else {
            break;
        };
        cache.update_item(lowest.key, lowest.data, 2000.0 + rng.next_f64() * 1000.0)?;
        updated += 1;
    }
    Ok(())
}

fn profile_priority_cache() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("=== Profiling PriorityCache ===");
    let capacity = 1024;
    let operations = 20_000;

    let backend = MemoryBackend::with_capacity(capacity * 2 + 2);
    let mut cache = PriorityCache::new(&backend, "profile", capacity)?;

    random_priority_churn(&mut cache, operations, 42)?;
    rising_priority_churn(&mut cache, operations / 2)?;
    update_workload(&mut cache, operations / 4, 7)?;

    println!("  Final size: {}", cache.len()?);
    println!("  Backend keys: {}", backend.len());
    Ok(())
}

fn main() -> ExitCode {
    let _profiler = dhat::Profiler::new_heap();

    println!("heapcache DHAT Heap Profiling");
    println!("=============================\n");

    if let Err(err) = profile_priority_cache() {
        eprintln!("profiling failed: {err}");
        return ExitCode::FAILURE;
    }

    println!("\n=============================");
    println!("Profile written to dhat-heap.json");
    ExitCode::SUCCESS
}
