//! Noise-based procedural terrain generation

use crate::voxel::{BlockId, ChunkData, CHUNK_HEIGHT, CHUNK_SIZE};
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

pub const STONE: BlockId = BlockId::from_static("stone");
pub const DIRT: BlockId = BlockId::from_static("dirt");
pub const GRASS: BlockId = BlockId::from_static("grass");
pub const SAND: BlockId = BlockId::from_static("sand");
pub const WATER: BlockId = BlockId::from_static("water");

/// Fills freshly created chunks with voxels
///
/// Generation is deterministic for a given chunk coordinate and performs no
/// I/O.
pub trait TerrainGenerator {
    fn generate(&self, chunk: &mut ChunkData);
}

impl<F: Fn(&mut ChunkData)> TerrainGenerator for F {
    fn generate(&self, chunk: &mut ChunkData) {
        self(chunk)
    }
}

/// Parameters controlling terrain generation
#[derive(Clone, Debug)]
pub struct TerrainParams {
    pub seed: u32,
    pub scale: f32,        // Horizontal scale (larger = smoother)
    pub base_height: f32,  // Lowest surface height
    pub height_scale: f32, // Vertical range above base_height
    pub octaves: u32,      // FBM octaves (detail levels)
    pub persistence: f32,  // FBM persistence (0.5 typical)
    pub lacunarity: f32,   // FBM lacunarity (2.0 typical)
    pub sea_level: f32,    // Columns below this are flooded with water
    pub dirt_depth: i32,   // Dirt layers under the surface block
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            scale: 100.0,
            base_height: 16.0,
            height_scale: 48.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            sea_level: 32.0,
            dirt_depth: 3,
        }
    }
}

/// Procedural heightmap terrain using fractal Brownian motion (FBM)
pub struct NoiseTerrainGenerator {
    params: TerrainParams,
    noise: Fbm<Perlin>,
}

impl NoiseTerrainGenerator {
    /// Create a new terrain generator with the given parameters
    pub fn new(params: TerrainParams) -> Self {
        let noise = Fbm::<Perlin>::new(params.seed)
            .set_octaves(params.octaves as usize)
            .set_persistence(params.persistence as f64)
            .set_lacunarity(params.lacunarity as f64);

        Self { params, noise }
    }

    /// Get terrain parameters
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Get terrain height at world position (x, z)
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let nx = (x / self.params.scale) as f64;
        let nz = (z / self.params.scale) as f64;

        // FBM output is roughly [-1, 1]
        let normalized = ((self.noise.get([nx, nz]) + 1.0) / 2.0).clamp(0.0, 1.0);
        self.params.base_height + (normalized * self.params.height_scale as f64) as f32
    }

    /// Surface block index of a column, kept inside the chunk
    fn surface_y(&self, x: f32, z: f32) -> i32 {
        (self.height_at(x, z) as i32).clamp(0, CHUNK_HEIGHT - 1)
    }
}

impl TerrainGenerator for NoiseTerrainGenerator {
    fn generate(&self, chunk: &mut ChunkData) {
        let (origin_x, origin_z) = chunk.coord().block_origin();
        let sea_level = (self.params.sea_level as i32).min(CHUNK_HEIGHT - 1);

        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                let surface = self.surface_y(
                    origin_x.saturating_add(x) as f32 + 0.5,
                    origin_z.saturating_add(z) as f32 + 0.5,
                );
                let underwater = surface < sea_level;

                for y in 0..=surface {
                    let block = if y == surface {
                        if underwater { SAND } else { GRASS }
                    } else if y >= surface - self.params.dirt_depth {
                        DIRT
                    } else {
                        STONE
                    };
                    chunk.set_block(x, y, z, block);
                }
                for y in surface + 1..=sea_level {
                    chunk.set_block(x, y, z, WATER);
                }
            }
        }
    }
}

/// Layered flat terrain, identical for every chunk
#[derive(Clone, Debug)]
pub struct FlatTerrainGenerator {
    /// Layers from y = 0 upward
    pub layers: Vec<BlockId>,
}

impl FlatTerrainGenerator {
    pub fn new(layers: Vec<BlockId>) -> Self {
        Self { layers }
    }
}

impl Default for FlatTerrainGenerator {
    fn default() -> Self {
        Self::new(vec![STONE, DIRT, DIRT, GRASS])
    }
}

impl TerrainGenerator for FlatTerrainGenerator {
    fn generate(&self, chunk: &mut ChunkData) {
        for (y, block) in self.layers.iter().enumerate().take(CHUNK_HEIGHT as usize) {
            for x in 0..CHUNK_SIZE {
                for z in 0..CHUNK_SIZE {
                    chunk.set_block(x, y as i32, z, block.clone());
                }
            }
        }
    }
}
