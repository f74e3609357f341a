//! Carving demo: builds a volume, cuts and filters it, then reports the
//! visibility index and optionally saves the result.
//!
//! Usage: cargo run --release --bin carve_demo -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>   Load VolumeConfig JSON (overrides --size/--chunk)
//!   --size <N>        Grid edge length in voxels (default: 128)
//!   --chunk <N>       Voxels per chunk edge (default: 16)
//!   --seed <SEED>     Color seed (default: 12345)
//!   --radius <R>      Cube cut radius (default: 20)
//!   --filter <C>      Remove every voxel with this color (default: none)
//!   --undo            Undo all point/cube edits at the end
//!   --out <PATH>      Write the carved volume to this file
//!   --jobs <N>        Rayon worker threads (default: all cores)

use std::path::{Path, PathBuf};
use std::time::Instant;

use glam::IVec3;

use voxvol::{Volume, VolumeConfig, VolumeEvent};

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    let args: Vec<String> = std::env::args().collect();

    if let Some(jobs) = parse_usize_arg(&args, "--jobs") {
        if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(jobs).build_global() {
            log::warn!("Could not configure thread pool: {}", e);
        }
    }

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> voxvol::Result<()> {
    let config = match parse_str_arg(args, "--config") {
        Some(path) => VolumeConfig::load_sync(Path::new(&path))?,
        None => {
            let size = parse_i32_arg(args, "--size").unwrap_or(128);
            VolumeConfig {
                chunk_dim: parse_i32_arg(args, "--chunk").unwrap_or(16),
                ..VolumeConfig::with_dims(size, size, size)
            }
        }
    };
    let seed = parse_u32_arg(args, "--seed").unwrap_or(12345);
    let radius = parse_i32_arg(args, "--radius").unwrap_or(20);
    let filter = parse_u8_arg(args, "--filter");
    let undo = args.iter().any(|a| a == "--undo");
    let out = parse_str_arg(args, "--out").map(PathBuf::from);

    println!("=== voxvol carve demo ===");
    println!("Grid:   {:?} (chunk {})", config.dims, config.chunk_dim);
    println!("Scale:  {}", config.scale);
    println!("Seed:   {}", seed);
    println!("Radius: {}", radius);
    println!();

    let mut volume = Volume::from_config(&config)?;
    volume.subscribe(Box::new(|event: &VolumeEvent| log::debug!("Volume event: {:?}", event)));
    volume.init_random(seed);

    let center = IVec3::from_array(config.dims) / 2;
    let start = Instant::now();
    volume.cutting().remove_cube_parallel(center, radius);
    volume.cutting().remove_sphere(IVec3::ZERO, radius / 2);
    log::info!("Cut in {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);

    if let Some(color) = filter {
        let removed = volume.filter().filter_value(color);
        println!("Filter {} removed {} voxels", color, removed);
    }

    report(&mut volume);

    if undo {
        let reverted = volume.undo_voxels();
        println!("Undid {} edits", reverted);
        report(&mut volume);
    }

    if let Some(path) = out {
        volume.save_sync(&path)?;
        println!("Saved to {}", path.display());
    }

    Ok(())
}

fn report(volume: &mut Volume) {
    let stats = volume.render_cycle(|view| view.stats());
    println!(
        "Visible: {} voxels in {} chunks ({} touched, undo log {})",
        stats.entries,
        stats.visible_chunks,
        stats.touched_chunks,
        volume.undo_size()
    );
}

fn parse_i32_arg(args: &[String], flag: &str) -> Option<i32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u8_arg(args: &[String], flag: &str) -> Option<u8> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
