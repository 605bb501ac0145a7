//! Record and replay example
//!
//! Records an expensive computation once, saves the trace, and replays it
//! into stdout instead of recomputing.
//!
//! Run with: cargo run --example record_replay

use treelog::prelude::*;
use treelog::{info, record};

fn expensive() -> Result<u64> {
    let mut total = 0;
    for n in (1..=5u64).log_iter("term") {
        total += n * n;
        info!("partial sum {total}")?;
    }
    Ok(total)
}

fn main() -> Result<()> {
    println!("=== treelog - Record and Replay Example ===\n");

    let cache = std::env::temp_dir().join("treelog-cache.json.gz");

    let trace = if cache.exists() {
        println!("1. Loading cached trace from {}", cache.display());
        Trace::load(&cache)?
    } else {
        println!("1. Computing and recording");
        let (result, trace) = record(true, expensive);
        println!("   result: {}", result?);
        trace.save(&cache)?;
        trace
    };

    println!("\n2. Replaying {} events:", trace.len());
    trace.replay_current()?;

    println!("\n3. Replaying into a second backend:");
    let text = TextLog::new(Vec::new());
    trace.replay(&text)?;
    print!("{}", String::from_utf8_lossy(&text.into_inner()));

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
