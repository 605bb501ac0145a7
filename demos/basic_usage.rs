//! Basic tree logging example
//!
//! Demonstrates levels, nested contexts and iteration contexts on the default
//! stdout backend.
//!
//! Run with: cargo run --example basic_usage

use treelog::prelude::*;
use treelog::{info, user, warning};

fn solve(iterations: usize) -> Result<f64> {
    let mut residual = 1.0;
    for _ in (0..iterations).log_fraction("iteration") {
        residual /= 10.0;
        info!("residual {:.1e}", residual)?;
    }
    Ok(residual)
}

fn main() -> Result<()> {
    println!("=== treelog - Basic Usage Example ===\n");

    println!("1. Messages at different levels (default backend hides debug):");
    treelog::debug("This is a debug message")?;
    treelog::info("This is an info message")?;
    treelog::user("This is a user message")?;
    treelog::warning("This is a warning message")?;
    treelog::error("This is an error message")?;

    println!("\n2. Nested contexts:");
    {
        let _solve = treelog::context("solve")?;
        let residual = solve(3)?;
        user!("converged to {residual}")?;
    }

    println!("\n3. Retitling a context:");
    let phase = treelog::context("phase 1")?;
    info!("setting up")?;
    phase.recontext("phase 2")?;
    warning!("running with defaults")?;
    phase.close()?;

    println!("\n4. Everything debug and up on stderr:");
    let log = LogBuilder::new().stderr().min_level(Level::Debug).build()?;
    treelog::with_log(log, || treelog::debug("now visible"))?;

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
