//! Voxel data structures and operations

pub mod block;
pub mod chunk;

pub use block::BlockId;
pub use chunk::{
    ChunkCoord, ChunkData, LocalPos,
    in_bounds, world_to_local,
    CHUNK_HEIGHT, CHUNK_SIZE, CHUNK_VOLUME,
};
