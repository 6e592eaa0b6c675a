//! Chunkstream - streaming voxel chunks, LoD and surface extraction for block worlds

pub mod core;
pub mod voxel;
pub mod mesh;
pub mod terrain;
pub mod streaming;
