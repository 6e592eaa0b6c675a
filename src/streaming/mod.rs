//! Dynamic chunk loading and LOD management

pub mod budget;
pub mod config;
pub mod disk_io;
pub mod lod;
pub mod manager;
pub mod priority;
pub mod stats;
pub mod store;

pub use budget::FrameBudget;
pub use config::StreamingConfig;
pub use disk_io::{
    ChunkRecord, DiskChunkStore,
    compress_chunk, decompress_chunk,
    serialize_chunk, deserialize_chunk,
    chunk_path,
};
pub use lod::{LodLevel, lod_for_chunk, lod_from_distance};
pub use manager::{ChunkStreamingManager, DispatchReport, MeshEvent, ResidentChunk};
pub use priority::{Job, JobQueue, LoadJob, LoadQueue, RebuildJob};
pub use stats::{JobCategory, JobTimings, RollingWindow, StreamingDiagnostics, StreamingStats};
pub use store::{ChunkStore, MemoryChunkStore};
