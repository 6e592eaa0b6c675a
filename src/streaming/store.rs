//! Chunk persistence interface

use crate::core::{Error, Result};
use crate::streaming::disk_io::{compress_chunk, decompress_chunk};
use crate::voxel::{ChunkCoord, ChunkData};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

/// Durable storage for chunk voxel data, keyed by world and coordinate
///
/// `load` returns `Ok(None)` when nothing has been stored for the chunk.
pub trait ChunkStore {
    fn load(&self, world: &str, coord: ChunkCoord) -> impl Future<Output = Result<Option<ChunkData>>>;

    fn save(&self, world: &str, chunk: &ChunkData) -> impl Future<Output = Result<()>>;

    /// Remove every chunk of a world
    fn clear(&self, world: &str) -> impl Future<Output = Result<()>>;

    /// Number of chunks stored for a world
    fn count(&self, world: &str) -> impl Future<Output = Result<usize>>;
}

/// In-process store holding compressed chunk records
#[derive(Debug, Default)]
pub struct MemoryChunkStore {
    records: Mutex<HashMap<(String, ChunkCoord), Vec<u8>>>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_records<T>(&self, f: impl FnOnce(&mut HashMap<(String, ChunkCoord), Vec<u8>>) -> T) -> Result<T> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| Error::Storage("memory store lock poisoned".into()))?;
        Ok(f(&mut records))
    }
}

impl ChunkStore for MemoryChunkStore {
    async fn load(&self, world: &str, coord: ChunkCoord) -> Result<Option<ChunkData>> {
        let bytes = self.with_records(|records| records.get(&(world.to_string(), coord)).cloned())?;
        bytes.map(|b| decompress_chunk(&b)).transpose()
    }

    async fn save(&self, world: &str, chunk: &ChunkData) -> Result<()> {
        let bytes = compress_chunk(chunk)?;
        self.with_records(|records| {
            records.insert((world.to_string(), chunk.coord()), bytes);
        })
    }

    async fn clear(&self, world: &str) -> Result<()> {
        self.with_records(|records| records.retain(|(w, _), _| w != world))
    }

    async fn count(&self, world: &str) -> Result<usize> {
        self.with_records(|records| records.keys().filter(|(w, _)| w == world).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::BlockId;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryChunkStore::new();
        let mut chunk = ChunkData::new(ChunkCoord::new(-2, 7));
        chunk.set_block(1, 2, 3, BlockId::from("stone"));

        assert!(store.load("w", chunk.coord()).await.unwrap().is_none());
        store.save("w", &chunk).await.unwrap();

        let loaded = store.load("w", chunk.coord()).await.unwrap().unwrap();
        assert_eq!(loaded.get_block(1, 2, 3), Some(&BlockId::from("stone")));
        assert_eq!(loaded.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_overwrite_and_count() {
        let store = MemoryChunkStore::new();
        let coord = ChunkCoord::new(0, 0);
        let mut chunk = ChunkData::new(coord);
        store.save("w", &chunk).await.unwrap();
        chunk.set_block(0, 5, 0, BlockId::from("dirt"));
        store.save("w", &chunk).await.unwrap();
        store.save("other", &chunk).await.unwrap();

        assert_eq!(store.count("w").await.unwrap(), 1);
        assert_eq!(store.load("w", coord).await.unwrap().unwrap().len(), 1);

        store.clear("w").await.unwrap();
        assert_eq!(store.count("w").await.unwrap(), 0);
        assert_eq!(store.count("other").await.unwrap(), 1);
    }
}
