//! Chunk serialization and disk I/O
//!
//! A chunk record is the sparse voxel map flattened into a palette of block
//! names plus `(cell index, palette index)` pairs, archived with rkyv and
//! compressed with LZ4.

use crate::core::{Error, Result};
use crate::streaming::store::ChunkStore;
use crate::voxel::{BlockId, ChunkCoord, ChunkData, LocalPos};
use rkyv::{Archive, Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File extension of chunk records
pub const CHUNK_EXTENSION: &str = "rkc";

/// One stored voxel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Archive, Deserialize, Serialize)]
pub struct CellRecord {
    /// Linear cell index, see [`LocalPos::index`]
    pub index: u16,
    /// Index into [`ChunkRecord::palette`]
    pub palette: u16,
}

/// Serializable chunk data
#[derive(Clone, Debug, PartialEq, Eq, Archive, Deserialize, Serialize)]
pub struct ChunkRecord {
    pub coord_x: i32,
    pub coord_z: i32,
    /// Distinct block names used by the chunk
    pub palette: Vec<String>,
    /// Non-air cells, sorted by index
    pub cells: Vec<CellRecord>,
}

impl ChunkRecord {
    /// Flatten a chunk into a record
    pub fn from_chunk(chunk: &ChunkData) -> Self {
        let mut solid: Vec<(u16, &BlockId)> = chunk.iter_solid().map(|(pos, id)| (pos.index(), id)).collect();
        solid.sort_unstable_by_key(|(index, _)| *index);

        let mut palette = Vec::new();
        let mut lookup: HashMap<&BlockId, u16> = HashMap::new();
        let mut cells = Vec::with_capacity(solid.len());

        for (index, id) in solid {
            let entry = *lookup.entry(id).or_insert_with(|| {
                palette.push(id.as_str().to_string());
                (palette.len() - 1) as u16
            });
            cells.push(CellRecord { index, palette: entry });
        }

        let coord = chunk.coord();
        Self {
            coord_x: coord.x,
            coord_z: coord.z,
            palette,
            cells,
        }
    }

    /// Rebuild the chunk, rejecting out-of-range indices
    pub fn into_chunk(self) -> Result<ChunkData> {
        let mut chunk = ChunkData::new(ChunkCoord::new(self.coord_x, self.coord_z));
        let palette: Vec<BlockId> = self.palette.into_iter().map(BlockId::from).collect();

        for cell in self.cells {
            let pos = LocalPos::from_index(cell.index)
                .ok_or_else(|| Error::Codec(format!("cell index {} out of range", cell.index)))?;
            let id = palette
                .get(cell.palette as usize)
                .ok_or_else(|| Error::Codec(format!("palette index {} out of range", cell.palette)))?;
            chunk.set_block(pos.x as i32, pos.y as i32, pos.z as i32, id.clone());
        }

        Ok(chunk)
    }
}

/// Serialize a chunk to bytes (uncompressed)
pub fn serialize_chunk(chunk: &ChunkData) -> Result<Vec<u8>> {
    let record = ChunkRecord::from_chunk(chunk);
    let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&record)
        .map_err(|e| Error::Codec(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Deserialize a chunk from bytes (uncompressed)
pub fn deserialize_chunk(data: &[u8]) -> Result<ChunkData> {
    // Archived data must be aligned; decompressed buffers carry no guarantee
    let mut aligned = rkyv::util::AlignedVec::<16>::with_capacity(data.len());
    aligned.extend_from_slice(data);

    let archived = rkyv::access::<ArchivedChunkRecord, rkyv::rancor::Error>(&aligned)
        .map_err(|e| Error::Codec(e.to_string()))?;
    let record: ChunkRecord = rkyv::deserialize::<ChunkRecord, rkyv::rancor::Error>(archived)
        .map_err(|e| Error::Codec(e.to_string()))?;

    record.into_chunk()
}

/// Compress a serialized chunk using LZ4
pub fn compress_chunk(chunk: &ChunkData) -> Result<Vec<u8>> {
    let serialized = serialize_chunk(chunk)?;
    Ok(lz4_flex::compress_prepend_size(&serialized))
}

/// Decompress and deserialize a chunk
pub fn decompress_chunk(data: &[u8]) -> Result<ChunkData> {
    let decompressed = lz4_flex::decompress_size_prepended(data)
        .map_err(|e| Error::Codec(format!("LZ4 decompression failed: {}", e)))?;
    deserialize_chunk(&decompressed)
}

/// Directory holding one world's chunks
pub fn world_dir(base_dir: &Path, world: &str) -> PathBuf {
    base_dir.join(world)
}

/// Get the file path for a chunk
pub fn chunk_path(base_dir: &Path, world: &str, coord: ChunkCoord) -> PathBuf {
    // Format: base_dir/<world>/chunk_{x}_{z}.rkc
    world_dir(base_dir, world).join(format!("chunk_{}_{}.{}", coord.x, coord.z, CHUNK_EXTENSION))
}

/// Chunk store writing one compressed file per chunk
#[derive(Clone, Debug)]
pub struct DiskChunkStore {
    base_dir: PathBuf,
}

impl DiskChunkStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl ChunkStore for DiskChunkStore {
    async fn load(&self, world: &str, coord: ChunkCoord) -> Result<Option<ChunkData>> {
        let path = chunk_path(&self.base_dir, world, coord);
        let compressed = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let chunk = decompress_chunk(&compressed)?;
        if chunk.coord() != coord {
            return Err(Error::Storage(format!(
                "{} holds chunk {:?}, expected {:?}",
                path.display(),
                chunk.coord(),
                coord
            )));
        }
        Ok(Some(chunk))
    }

    async fn save(&self, world: &str, chunk: &ChunkData) -> Result<()> {
        let path = chunk_path(&self.base_dir, world, chunk.coord());

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let compressed = compress_chunk(chunk)?;
        tokio::fs::write(&path, compressed).await?;
        Ok(())
    }

    async fn clear(&self, world: &str) -> Result<()> {
        let dir = world_dir(&self.base_dir, world);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn count(&self, world: &str) -> Result<usize> {
        let dir = world_dir(&self.base_dir, world);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut count = 0;
        while let Some(entry) = entries.next_entry().await? {
            if entry.path().extension().is_some_and(|ext| ext == CHUNK_EXTENSION) {
                count += 1;
            }
        }
        Ok(count)
    }
}
