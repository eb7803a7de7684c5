//! Target program for trying out `memplot inspect` and `memplot render`.
//!
//! It keeps a 64×64 `u16` interference pattern in a global and prints where
//! to find it.
//!
//! ## Usage:
//!
//! ```bash
//! # Terminal 1: Start the target (note the PID it prints)
//! cargo run --example grid_target -- /tmp/grid.bin
//!
//! # Terminal 2: Plot the live grid, or the dump it wrote
//! memplot inspect <PID> target/debug/examples/grid_target GRID --expand
//! memplot render /tmp/grid.bin --type "unsigned short[64][64]" --format 1
//! ```

use std::time::Duration;
use std::{env, fs, process, thread};

const SIZE: usize = 64;

#[no_mangle]
static GRID: [[u16; SIZE]; SIZE] = pattern();

const fn pattern() -> [[u16; SIZE]; SIZE]
{
    let mut grid = [[0u16; SIZE]; SIZE];
    let mut y = 0;
    while y < SIZE {
        let mut x = 0;
        while x < SIZE {
            let (dx, dy) = (x as i32 - 20, y as i32 - 40);
            grid[y][x] = ((dx * dx + dy * dy) % 256 + ((x * y) % 128) as i32) as u16;
            x += 1;
        }
        y += 1;
    }
    grid
}

fn main()
{
    println!("Hello! I am process {}", process::id());
    println!("GRID is {SIZE}x{SIZE} uint16 at {:p}", GRID.as_ptr());

    if let Some(path) = env::args().nth(1) {
        let bytes: Vec<u8> = GRID.iter().flatten().flat_map(|v| v.to_ne_bytes()).collect();
        match fs::write(&path, bytes) {
            Ok(()) => println!("Dumped GRID to {path}"),
            Err(e) => eprintln!("Failed to write {path}: {e}"),
        }
    }

    println!("Waiting for memplot... (Press Ctrl+C to exit)");
    loop {
        thread::sleep(Duration::from_secs(1));
    }
}
