//! World generator binary: pre-generates terrain chunks into a chunk store.
//!
//! Usage: cargo run --release --bin generate_world -- [OPTIONS]
//!
//! Options:
//!   --radius <CHUNKS>  Half-width of the square region in chunks (default: 16)
//!   --seed <SEED>      Random seed (default: 12345)
//!   --name <NAME>      World id (default: "default")
//!   --out <DIR>        Store base directory (default: "assets/worlds")
//!   --scale <SCALE>    Terrain noise scale (default: 100.0)
//!   --height <H>       Terrain height range above the base (default: 48.0)
//!   --jobs <N>         Max parallel chunk builds (default: 4)
//!
//! Output structure:
//!   <out>/<name>/
//!     manifest.json           # World metadata
//!     chunk_0_0.rkc
//!     ...

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use log::info;
use rayon::prelude::*;
use serde_json::json;

use chunkstream::core::{Error, Result};
use chunkstream::streaming::{ChunkStore, DiskChunkStore};
use chunkstream::terrain::{NoiseTerrainGenerator, TerrainGenerator, TerrainParams};
use chunkstream::voxel::{ChunkCoord, ChunkData, CHUNK_HEIGHT, CHUNK_SIZE};

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    let args: Vec<String> = std::env::args().collect();
    let radius = parse_i32_arg(&args, "--radius").unwrap_or(16).max(0);
    let seed = parse_u32_arg(&args, "--seed").unwrap_or(12345);
    let name = parse_str_arg(&args, "--name").unwrap_or_else(|| "default".to_string());
    let out = PathBuf::from(parse_str_arg(&args, "--out").unwrap_or_else(|| "assets/worlds".to_string()));
    let scale = parse_f32_arg(&args, "--scale").unwrap_or(100.0);
    let height_scale = parse_f32_arg(&args, "--height").unwrap_or(48.0);
    let jobs = parse_usize_arg(&args, "--jobs").unwrap_or(4).max(1);

    // Limit rayon's thread pool to cap peak memory usage
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build_global()
        .map_err(|e| Error::Config(format!("thread pool: {}", e)))?;

    let side = radius * 2 + 1;
    println!("=== Chunk World Generator ===");
    println!("World:  {}", name);
    println!("Region: {} x {} chunks", side, side);
    println!("Seed:   {}", seed);
    println!("Scale:  {}, Height: {}", scale, height_scale);
    println!("Jobs:   {} parallel", jobs);
    println!("Output: {}", out.join(&name).display());
    println!();

    let params = TerrainParams {
        seed,
        scale,
        height_scale,
        ..Default::default()
    };
    let generator = NoiseTerrainGenerator::new(params.clone());
    let store = DiskChunkStore::new(&out);
    let runtime = tokio::runtime::Runtime::new()?;

    let coords: Vec<ChunkCoord> = (-radius..=radius)
        .flat_map(|x| (-radius..=radius).map(move |z| ChunkCoord::new(x, z)))
        .collect();
    let total = coords.len();

    let start = Instant::now();
    let generated = AtomicUsize::new(0);
    let mut voxels = 0usize;

    // Generate a batch in parallel, then persist it before the next one
    for batch in coords.chunks(jobs * 8) {
        let chunks: Vec<ChunkData> = batch
            .par_iter()
            .map(|&coord| {
                let mut chunk = ChunkData::new(coord);
                generator.generate(&mut chunk);

                let done = generated.fetch_add(1, Ordering::Relaxed) + 1;
                if done % 256 == 0 || done == total {
                    let elapsed = start.elapsed().as_secs_f64();
                    let rate = done as f64 / elapsed;
                    let remaining = (total - done) as f64 / rate;
                    eprintln!("  [{}/{}] {:.0} chunks/sec, ~{:.0}s remaining",
                        done, total, rate, remaining);
                }
                chunk
            })
            .collect();

        runtime.block_on(async {
            for chunk in &chunks {
                store.save(&name, chunk).await?;
            }
            Ok::<(), Error>(())
        })?;
        voxels += chunks.iter().map(ChunkData::len).sum::<usize>();
    }

    let elapsed = start.elapsed();
    let stored = runtime.block_on(store.count(&name))?;
    info!("Generated {} chunks ({} voxels) in {:.1}s", total, voxels, elapsed.as_secs_f64());

    let manifest = json!({
        "name": name,
        "seed": seed,
        "radius": radius,
        "chunk_size": CHUNK_SIZE,
        "chunk_height": CHUNK_HEIGHT,
        "chunk_count": stored,
        "terrain_params": {
            "scale": params.scale,
            "base_height": params.base_height,
            "height_scale": params.height_scale,
            "octaves": params.octaves,
            "persistence": params.persistence,
            "lacunarity": params.lacunarity,
            "sea_level": params.sea_level,
        },
    });

    let manifest_path = out.join(&name).join("manifest.json");
    std::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;

    println!();
    println!("=== Generation Complete ===");
    println!("Chunks: {} stored ({:.0} chunks/sec)", stored, total as f64 / elapsed.as_secs_f64());
    println!("Voxels: {}", voxels);
    println!("Output: {}", out.join(&name).display());
    println!();
    println!("To fly through this world:");
    println!("  cargo run --release -- --world {} --store {}", name, out.display());

    Ok(())
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
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
