//! Debug script to output the blockage mask as ASCII for a fixed seed

use std::fs::File;
use std::io::Write;

use band_terrain::export::blockage_ascii;
use band_terrain::{classify, try_generate, BorderSet, MapError, NoiseParams};

fn main() -> Result<(), MapError> {
    let params = NoiseParams {
        width: 96,
        height: 48,
        seed: 12345,
        scale: 20.0,
        ..Default::default()
    };

    let heights = try_generate(&params)?;
    let borders = BorderSet::from_times(&[0.0, 0.3, 0.45, 0.6, 0.8, 1.0])?;
    let classification = classify(&heights, &borders);

    let mut file = File::create("blockage_debug.txt")?;
    writeln!(file, "=== BLOCKAGE DEBUG MAP ({}x{}) seed={} ===", params.width, params.height, params.seed)?;
    writeln!(file, "LEGEND: # = blocked (band perimeter)   . = passable")?;
    writeln!(file)?;
    for (i, marker) in classification.borders.iter().enumerate() {
        writeln!(file, "  border {}: {} @ {:.2}", i, marker.name, marker.time)?;
    }
    writeln!(file)?;
    write!(file, "{}", blockage_ascii(&classification.blockage))?;

    println!(
        "Wrote blockage_debug.txt ({} blocked of {} cells)",
        classification.blocked_count(),
        heights.len()
    );
    Ok(())
}
