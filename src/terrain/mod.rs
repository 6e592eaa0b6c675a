//! Procedural terrain generation

pub mod generator;
pub use generator::{FlatTerrainGenerator, NoiseTerrainGenerator, TerrainGenerator, TerrainParams};
