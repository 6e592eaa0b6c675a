//! chunkstream - headless fly-through driver
//!
//! Moves a viewer in a straight line over procedural terrain, ticking the
//! streaming manager once per simulated frame and logging its statistics.
//!
//! Usage: cargo run --release -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>   Streaming config JSON (default: built-in defaults)
//!   --world <NAME>    World id, overrides the config
//!   --store <DIR>     Persist chunks under DIR (default: in-memory store)
//!   --frames <N>      Simulated frames (default: 600)
//!   --speed <B>       Viewer speed in blocks per frame (default: 0.5)
//!   --heading <DEG>   Flight direction in degrees from +X (default: 30)
//!   --seed <SEED>     Terrain seed (default: 12345)
//!   --evict           Save every resident chunk when the flight ends

use std::path::PathBuf;

use log::{debug, info, warn};

use chunkstream::core::{logging, Result, Vec2};
use chunkstream::mesh::{BlockColors, MaterialSlot, MaterialTable, SurfaceExtractor};
use chunkstream::streaming::{
    ChunkStore, ChunkStreamingManager, DiskChunkStore, MemoryChunkStore, MeshEvent, StreamingConfig,
};
use chunkstream::terrain::generator::{DIRT, GRASS, SAND, STONE, WATER};
use chunkstream::terrain::{NoiseTerrainGenerator, TerrainParams};

struct FlightPlan {
    frames: u32,
    speed: f32,
    heading: Vec2,
    evict: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => StreamingConfig::load(&PathBuf::from(path))?,
        None => StreamingConfig::default(),
    };
    if let Some(world) = parse_str_arg(&args, "--world") {
        config.world_id = world;
        config.validate()?;
    }
    let seed = parse_u32_arg(&args, "--seed").unwrap_or(12345);
    let heading_deg = parse_f32_arg(&args, "--heading").unwrap_or(30.0);
    let plan = FlightPlan {
        frames: parse_u32_arg(&args, "--frames").unwrap_or(600),
        speed: parse_f32_arg(&args, "--speed").unwrap_or(0.5),
        heading: Vec2::from_angle(heading_deg.to_radians()),
        evict: args.iter().any(|a| a == "--evict"),
    };

    info!(
        "World '{}': range {} (LoD0 {}), {} jobs/frame, greedy={}, culling={}",
        config.world_id,
        config.chunk_range,
        config.lod0_range,
        config.max_processing_per_frame,
        config.greedy,
        config.culling
    );

    let generator = NoiseTerrainGenerator::new(TerrainParams { seed, ..Default::default() });
    let extractor = SurfaceExtractor::new(terrain_materials(), terrain_colors());

    match parse_str_arg(&args, "--store") {
        Some(dir) => {
            info!("Persisting chunks under {}", dir);
            let manager = ChunkStreamingManager::new(config, DiskChunkStore::new(dir), generator, extractor)?;
            fly(manager, &plan).await
        }
        None => {
            let manager = ChunkStreamingManager::new(config, MemoryChunkStore::new(), generator, extractor)?;
            fly(manager, &plan).await
        }
    }
}

async fn fly<S: ChunkStore>(
    mut manager: ChunkStreamingManager<S, NoiseTerrainGenerator>,
    plan: &FlightPlan,
) -> Result<()> {
    let mut position = Vec2::new(8.0, 8.0);
    let mut created = 0usize;
    let mut released = 0usize;
    let mut replaced = 0usize;

    for frame in 0..plan.frames {
        if manager.update_view_position(position.x, position.y) {
            debug!("Frame {}: entered chunk {:?}", frame, manager.center());
        }
        manager.tick().await;

        // Stand-in for a renderer syncing GPU buffers
        for event in manager.drain_mesh_events() {
            match event {
                MeshEvent::Created(_) => created += 1,
                MeshEvent::Replaced(_) => replaced += 1,
                MeshEvent::Released(_) => released += 1,
            }
        }

        if frame % 60 == 0 {
            let stats = manager.stats();
            info!(
                "Frame {:4}: {} resident ({} LoD0 / {} LoD1), queues L{} U{} R{}, gen {:.2}ms load {:.2}ms lod {:.2}ms",
                frame,
                stats.loaded_chunks,
                stats.lod0_chunks,
                stats.lod1_chunks,
                stats.load_queue,
                stats.unload_queue,
                stats.rebuild_queue,
                stats.timings.new_generate_ms,
                stats.timings.store_load_ms,
                stats.timings.lod_transition_ms,
            );
        }

        position += plan.heading * plan.speed;
    }

    // Let the queues drain at the final position
    while manager.has_pending_work() {
        manager.tick().await;
    }

    let stats = manager.stats();
    info!(
        "Flight done: {} generated, {} loaded from store, meshes +{} ~{} -{}",
        stats.generated_total, stats.loaded_total, created, replaced, released
    );

    if plan.evict {
        let saved = manager.evict_all().await;
        match manager.stored_chunk_count().await {
            Ok(count) => info!("Saved {} chunks, {} stored for '{}'", saved, count, manager.config().world_id),
            Err(e) => warn!("Could not count stored chunks: {}", e),
        }
    }

    Ok(())
}

fn terrain_materials() -> MaterialTable {
    let mut table = MaterialTable::new();
    table.insert_uniform(STONE, MaterialSlot(0));
    table.insert_uniform(DIRT, MaterialSlot(1));
    table.insert_top_side_bottom(GRASS, MaterialSlot(2), MaterialSlot(3), MaterialSlot(1));
    table.insert_uniform(SAND, MaterialSlot(4));
    table.insert_uniform(WATER, MaterialSlot(5));
    table
}

fn terrain_colors() -> BlockColors {
    let mut colors = BlockColors::new();
    colors.insert(STONE, [0.45, 0.45, 0.47, 1.0]);
    colors.insert(DIRT, [0.42, 0.30, 0.18, 1.0]);
    colors.insert(GRASS, [0.30, 0.55, 0.20, 1.0]);
    colors.insert(SAND, [0.86, 0.80, 0.58, 1.0]);
    colors.insert(WATER, [0.20, 0.35, 0.75, 0.8]);
    colors
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
