use std::time::Instant;

use anyhow::Result;
use tui_gallery::engine::{Engine, EngineConfig};
use tui_gallery::palette::Palette;
use tui_gallery::payload::MessagePool;
use tui_gallery::pieces::{self, Piece as _};

struct Args {
    piece: usize,
    frames: usize,
    cols: u32,
    rows: u32,
}

fn parse_args() -> Args {
    let mut args = Args {
        piece: 0,
        frames: 600,
        cols: 120,
        rows: 40,
    };

    let mut it = std::env::args().skip(1);
    while let Some(k) = it.next() {
        let v = it.next();
        match (k.as_str(), v) {
            ("--piece", Some(v)) => {
                if let Some(idx) = pieces::select_piece(Some(&v)) {
                    args.piece = idx;
                }
            }
            ("--frames", Some(v)) => {
                if let Ok(n) = v.parse::<usize>() {
                    args.frames = n.clamp(1, 100_000);
                }
            }
            ("--cols", Some(v)) => {
                if let Ok(n) = v.parse::<u32>() {
                    args.cols = n.clamp(4, 2_000);
                }
            }
            ("--rows", Some(v)) => {
                if let Ok(n) = v.parse::<u32>() {
                    args.rows = n.clamp(4, 2_000);
                }
            }
            _ => {}
        }
    }

    args
}

/// Headless engine benchmark: synthetic 33 ms clock, no terminal, no audio.
/// Reports tick timings and the colour-batching cost per frame.
fn main() -> Result<()> {
    let args = parse_args();

    let pool = MessagePool::builtin();
    let piece = pieces::build_piece(args.piece, &pool)
        .ok_or_else(|| anyhow::anyhow!("piece index {} out of range", args.piece))?;
    let meta = piece.meta();

    let cfg = EngineConfig {
        seed: Some(0xB0B5),
        audio: false,
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(piece, Palette::catalogue(), cfg);
    engine.resize(args.cols * cfg.cell_width, args.rows * cfg.cell_height);

    let mut tick_us = Vec::with_capacity(args.frames);
    let mut max_switches = 0usize;
    let mut max_cells = 0usize;

    for f in 0..args.frames {
        let now_ms = f as u64 * 33;
        let t0 = Instant::now();
        if let Some(frame) = engine.tick(now_ms) {
            max_switches = max_switches.max(frame.colour_switches());
            max_cells = max_cells.max(frame.cell_count());
        }
        tick_us.push(t0.elapsed().as_micros() as u64);
    }

    tick_us.sort_unstable();
    let avg = tick_us.iter().sum::<u64>() as f64 / tick_us.len() as f64;
    let p50 = tick_us[tick_us.len() / 2];
    let p95 = tick_us[tick_us.len() * 95 / 100];
    let max = *tick_us.last().unwrap_or(&0);

    println!("piece: {} {}", meta.designation, meta.title);
    println!(
        "grid: {}x{} ({} cells), frames: {}",
        engine.cols(),
        engine.rows(),
        engine.cols() * engine.rows(),
        args.frames
    );
    println!(
        "tick: avg {:.1}us  p50 {}us  p95 {}us  max {}us",
        avg, p50, p95, max
    );
    println!(
        "colour switches: max {} (palette bound {})",
        max_switches,
        tui_gallery::palette::Ink::COUNT
    );
    println!("painted cells: max {}", max_cells);
    Ok(())
}
