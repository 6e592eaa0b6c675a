use criterion::{criterion_group, criterion_main, Criterion, black_box};

use chunkstream::mesh::{BlockColors, ExtractOptions, MaterialSlot, MaterialTable, Neighbors, SurfaceExtractor};
use chunkstream::streaming::{ChunkStreamingManager, LodLevel, MemoryChunkStore, StreamingConfig};
use chunkstream::terrain::{NoiseTerrainGenerator, TerrainGenerator, TerrainParams};
use chunkstream::voxel::{BlockId, ChunkCoord, ChunkData};

fn materials() -> MaterialTable {
    let mut table = MaterialTable::new();
    table.insert_uniform(BlockId::from("stone"), MaterialSlot(0));
    table.insert_uniform(BlockId::from("dirt"), MaterialSlot(1));
    table.insert_top_side_bottom(BlockId::from("grass"), MaterialSlot(2), MaterialSlot(3), MaterialSlot(1));
    table.insert_uniform(BlockId::from("sand"), MaterialSlot(4));
    table.insert_uniform(BlockId::from("water"), MaterialSlot(5));
    table
}

fn terrain_chunk() -> ChunkData {
    let generator = NoiseTerrainGenerator::new(TerrainParams::default());
    let mut chunk = ChunkData::new(ChunkCoord::new(3, 7));
    generator.generate(&mut chunk);
    chunk
}

fn bench_extract_naive(c: &mut Criterion) {
    let chunk = terrain_chunk();
    let extractor = SurfaceExtractor::new(materials(), BlockColors::new())
        .with_options(ExtractOptions { greedy: false, culling: true });

    c.bench_function("extract_terrain_naive", |b| {
        b.iter(|| extractor.extract(black_box(&chunk), &Neighbors::none(), LodLevel::Full));
    });
}

fn bench_extract_greedy(c: &mut Criterion) {
    let chunk = terrain_chunk();
    let extractor = SurfaceExtractor::new(materials(), BlockColors::new());

    c.bench_function("extract_terrain_greedy", |b| {
        b.iter(|| extractor.extract(black_box(&chunk), &Neighbors::none(), LodLevel::Full));
    });
}

fn bench_extract_coarse(c: &mut Criterion) {
    let chunk = terrain_chunk();
    let extractor = SurfaceExtractor::new(materials(), BlockColors::new());

    c.bench_function("extract_terrain_coarse", |b| {
        b.iter(|| extractor.extract(black_box(&chunk), &Neighbors::none(), LodLevel::Coarse));
    });
}

fn bench_stream_fly_through(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("Failed to build runtime");

    c.bench_function("stream_fly_through_16_chunks", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let config = StreamingConfig {
                    chunk_range: 2,
                    lod0_range: 1,
                    max_processing_per_frame: 8,
                    ..Default::default()
                };
                let extractor = SurfaceExtractor::new(materials(), BlockColors::new());
                let generator = NoiseTerrainGenerator::new(TerrainParams::default());
                let mut manager = ChunkStreamingManager::new(config, MemoryChunkStore::new(), generator, extractor)
                    .expect("valid config");

                for step in 0..16 {
                    manager.update_view_position(step as f32 * 16.0 + 8.0, 8.0);
                    manager.tick().await;
                    black_box(manager.drain_mesh_events());
                }
                black_box(manager.stats())
            })
        });
    });
}

criterion_group!(
    benches,
    bench_extract_naive,
    bench_extract_greedy,
    bench_extract_coarse,
    bench_stream_fly_through,
);
criterion_main!(benches);
