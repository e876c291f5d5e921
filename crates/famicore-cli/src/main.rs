//! Headless bring-up runner.
//!
//! `famicore <rom_path>` loads a ROM, runs a few seconds of emulated
//! frames without a window, and reports timing statistics. Exit code 0
//! on a clean run, 1 when the ROM fails to load.

use std::process::ExitCode;
use std::time::Instant;

use famicore_core::Console;

/// Frames to emulate per invocation (~two seconds of NTSC video).
const FRAMES: u32 = 120;

fn main() -> ExitCode {
    // The fmt subscriber's log bridge also captures the core crates'
    // `log` records.
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    let Some(rom_path) = std::env::args().nth(1) else {
        eprintln!("usage: famicore <rom_path>");
        return ExitCode::from(1);
    };

    let data = match std::fs::read(&rom_path) {
        Ok(data) => data,
        Err(err) => {
            tracing::error!("failed to read {rom_path}: {err}");
            return ExitCode::from(1);
        }
    };

    let mut console = Console::new();
    if let Err(err) = console.load_rom(&data) {
        tracing::error!("failed to load {rom_path}: {err}");
        return ExitCode::from(1);
    }
    console.reset();

    tracing::info!(
        "running {FRAMES} frames of {rom_path} (mapper {})",
        console.mapper_number().unwrap_or_default()
    );

    let start = Instant::now();
    for _ in 0..FRAMES {
        console.set_input(0, 0);
        console.run_frame();
    }
    let elapsed = start.elapsed();

    let cycles = console.cycles();
    tracing::info!(
        "done: {} frames, {cycles} CPU cycles in {:.1?} ({:.1} fps)",
        console.frame_count(),
        elapsed,
        f64::from(FRAMES) / elapsed.as_secs_f64().max(1e-9),
    );

    ExitCode::SUCCESS
}
