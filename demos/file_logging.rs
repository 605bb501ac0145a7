//! Artifact logging example
//!
//! Demonstrates writing artifacts to stdout and a directory at the same time.
//! Writing the same name twice never overwrites the first file.
//!
//! Run with: cargo run --example file_logging

use std::io::Write;
use treelog::prelude::*;

fn main() -> Result<()> {
    println!("=== treelog - Artifact Logging Example ===\n");

    let dir = std::env::temp_dir().join("treelog-artifacts");
    let log = LogBuilder::new().stdout().data_dir(&dir).build()?;
    let _scope = treelog::set(log);

    println!("1. Streaming a text artifact:");
    {
        let _ctx = treelog::context("report")?;
        treelog::user_file("summary.txt", "w", |f| {
            treelog::info("generating")?;
            writeln!(f, "all good")?;
            Ok(())
        })?;
    }

    println!("\n2. The same name twice:");
    for round in 0..2u8 {
        treelog::info_data("frame.bin", vec![round; 16])?;
    }

    println!("\n3. An artifact with a media type:");
    let spec = ArtifactSpec::binary("plot.svg").with_media_type("image/svg+xml");
    treelog::file(Level::User, &spec, |f| {
        f.write_all(b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>")?;
        Ok(())
    })?;

    println!("\nArtifacts written to {}", dir.display());
    println!("\n=== Example completed successfully! ===");
    Ok(())
}
