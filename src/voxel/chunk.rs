//! Chunk coordinates and sparse per-chunk voxel storage

use crate::voxel::block::BlockId;
use std::collections::HashMap;

/// Width of a chunk along X and Z, in voxels
pub const CHUNK_SIZE: i32 = 16;

/// Height of a chunk along Y, in voxels
pub const CHUNK_HEIGHT: i32 = 128;

/// Number of voxel cells in one chunk
pub const CHUNK_VOLUME: usize = (CHUNK_SIZE * CHUNK_HEIGHT * CHUNK_SIZE) as usize;

static AIR: BlockId = BlockId::AIR;

/// Integer coordinate identifying a chunk column in the world grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Create a new chunk coordinate
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Convert a world position to the chunk containing it (floor division)
    pub fn from_world(world_x: f32, world_z: f32) -> Self {
        Self {
            x: (world_x / CHUNK_SIZE as f32).floor() as i32,
            z: (world_z / CHUNK_SIZE as f32).floor() as i32,
        }
    }

    /// Convert an integer block position to the chunk containing it
    pub fn from_block(block_x: i32, block_z: i32) -> Self {
        Self {
            x: block_x.div_euclid(CHUNK_SIZE),
            z: block_z.div_euclid(CHUNK_SIZE),
        }
    }

    /// World-space block coordinate of this chunk's minimum corner
    pub fn block_origin(&self) -> (i32, i32) {
        (self.x.saturating_mul(CHUNK_SIZE), self.z.saturating_mul(CHUNK_SIZE))
    }

    /// Chebyshev (chessboard) distance to another chunk
    pub fn chebyshev(&self, other: ChunkCoord) -> u32 {
        self.x.abs_diff(other.x).max(self.z.abs_diff(other.z))
    }

    /// Offset this coordinate by whole chunks, clamped to the `i32` range
    pub fn offset(&self, dx: i32, dz: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.z.saturating_add(dz))
    }
}

/// Convert a world block position to (chunk, local x, local z)
pub fn world_to_local(block_x: i32, block_z: i32) -> (ChunkCoord, i32, i32) {
    (
        ChunkCoord::from_block(block_x, block_z),
        block_x.rem_euclid(CHUNK_SIZE),
        block_z.rem_euclid(CHUNK_SIZE),
    )
}

/// Local voxel position inside a chunk
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalPos {
    pub x: u8,
    pub y: u8,
    pub z: u8,
}

impl LocalPos {
    /// Bounds-checked constructor; `None` outside the chunk
    pub fn new(x: i32, y: i32, z: i32) -> Option<Self> {
        if in_bounds(x, y, z) {
            Some(Self { x: x as u8, y: y as u8, z: z as u8 })
        } else {
            None
        }
    }

    /// Linear cell index in y→z→x order
    pub fn index(&self) -> u16 {
        (self.y as u16) * (CHUNK_SIZE * CHUNK_SIZE) as u16
            + (self.z as u16) * CHUNK_SIZE as u16
            + self.x as u16
    }

    /// Inverse of [`LocalPos::index`]
    pub fn from_index(index: u16) -> Option<Self> {
        if index as usize >= CHUNK_VOLUME {
            return None;
        }
        let layer = (CHUNK_SIZE * CHUNK_SIZE) as u16;
        let y = index / layer;
        let rem = index % layer;
        Some(Self {
            x: (rem % CHUNK_SIZE as u16) as u8,
            y: y as u8,
            z: (rem / CHUNK_SIZE as u16) as u8,
        })
    }
}

/// Whether a local position lies inside a chunk
pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
    (0..CHUNK_SIZE).contains(&x) && (0..CHUNK_HEIGHT).contains(&y) && (0..CHUNK_SIZE).contains(&z)
}

/// Sparse voxel storage for one 16×128×16 chunk
///
/// Only non-air voxels are stored; an unset in-bounds cell reads as air.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkData {
    coord: ChunkCoord,
    blocks: HashMap<LocalPos, BlockId>,
    /// Whether the chunk was edited since it was last saved
    modified: bool,
}

impl ChunkData {
    /// Create an empty (all air) chunk
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            blocks: HashMap::new(),
            modified: false,
        }
    }

    /// Chunk coordinate
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Set a block; out-of-bounds writes are ignored and air removes the entry
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, id: BlockId) {
        let Some(pos) = LocalPos::new(x, y, z) else {
            return;
        };
        if id.is_air() {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, id);
        }
    }

    /// Get a block; air for unset cells, `None` outside the chunk
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Option<&BlockId> {
        let pos = LocalPos::new(x, y, z)?;
        Some(self.blocks.get(&pos).unwrap_or(&AIR))
    }

    /// Whether an in-bounds cell holds a non-air block
    pub fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        LocalPos::new(x, y, z).is_some_and(|pos| self.blocks.contains_key(&pos))
    }

    /// Enumerate every cell (air included) in y→z→x order
    pub fn iter_volume(&self) -> impl Iterator<Item = (LocalPos, &BlockId)> + '_ {
        (0..CHUNK_HEIGHT).flat_map(move |y| {
            (0..CHUNK_SIZE).flat_map(move |z| {
                (0..CHUNK_SIZE).map(move |x| {
                    let pos = LocalPos { x: x as u8, y: y as u8, z: z as u8 };
                    (pos, self.blocks.get(&pos).unwrap_or(&AIR))
                })
            })
        })
    }

    /// Enumerate non-air cells in arbitrary order
    pub fn iter_solid(&self) -> impl Iterator<Item = (LocalPos, &BlockId)> + '_ {
        self.blocks.iter().map(|(pos, id)| (*pos, id))
    }

    /// Number of stored (non-air) voxels
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the chunk is entirely air
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Remove every block
    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Whether the chunk was edited since it was last saved
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Flag the chunk as edited
    pub fn mark_modified(&mut self) {
        self.modified = true;
    }

    /// Clear the edited flag after a successful save
    pub fn mark_saved(&mut self) {
        self.modified = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_coord_from_world() {
        assert_eq!(ChunkCoord::from_world(0.0, 0.0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_world(15.9, 15.9), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_world(16.0, 0.0), ChunkCoord::new(1, 0));
        assert_eq!(ChunkCoord::from_world(-0.1, -16.0), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::from_world(-16.1, 40.0), ChunkCoord::new(-2, 2));
    }

    #[test]
    fn test_world_to_local_negative() {
        let (coord, lx, lz) = world_to_local(-1, 17);
        assert_eq!(coord, ChunkCoord::new(-1, 1));
        assert_eq!((lx, lz), (15, 1));
    }

    #[test]
    fn test_chebyshev() {
        let a = ChunkCoord::new(0, 0);
        assert_eq!(a.chebyshev(ChunkCoord::new(3, -1)), 3);
        assert_eq!(a.chebyshev(ChunkCoord::new(-2, 2)), 2);
        assert_eq!(a.chebyshev(a), 0);
    }

    #[test]
    fn test_offset_clamps_at_extremes() {
        let far = ChunkCoord::from_world(f32::INFINITY, f32::NEG_INFINITY);
        assert_eq!(far, ChunkCoord::new(i32::MAX, i32::MIN));
        assert_eq!(far.offset(1, -1), far);
        assert_eq!(far.offset(-1, 1), ChunkCoord::new(i32::MAX - 1, i32::MIN + 1));
        assert_eq!(far.block_origin(), (i32::MAX, i32::MIN));
    }

    #[test]
    fn test_set_get_round_trip() {
        let mut chunk = ChunkData::new(ChunkCoord::new(0, 0));
        chunk.set_block(3, 64, 7, BlockId::from("stone"));
        assert_eq!(chunk.get_block(3, 64, 7), Some(&BlockId::from("stone")));
        assert_eq!(chunk.len(), 1);
    }

    #[test]
    fn test_unset_reads_air_and_out_of_bounds_is_none() {
        let chunk = ChunkData::new(ChunkCoord::new(0, 0));
        assert_eq!(chunk.get_block(0, 0, 0), Some(&BlockId::AIR));
        assert_eq!(chunk.get_block(16, 0, 0), None);
        assert_eq!(chunk.get_block(0, 128, 0), None);
        assert_eq!(chunk.get_block(0, -1, 0), None);
    }

    #[test]
    fn test_set_air_removes_entry() {
        let mut chunk = ChunkData::new(ChunkCoord::new(0, 0));
        chunk.set_block(1, 1, 1, BlockId::from("dirt"));
        assert_eq!(chunk.len(), 1);

        chunk.set_block(1, 1, 1, BlockId::AIR);
        assert_eq!(chunk.len(), 0);
        assert_eq!(chunk.get_block(1, 1, 1), Some(&BlockId::AIR));

        // Setting air on an empty cell never grows storage
        chunk.set_block(2, 2, 2, BlockId::AIR);
        assert!(chunk.is_empty());
    }

    #[test]
    fn test_out_of_bounds_set_is_ignored() {
        let mut chunk = ChunkData::new(ChunkCoord::new(0, 0));
        chunk.set_block(-1, 0, 0, BlockId::from("stone"));
        chunk.set_block(0, 200, 0, BlockId::from("stone"));
        chunk.set_block(0, 0, 16, BlockId::from("stone"));
        assert!(chunk.is_empty());
    }

    #[test]
    fn test_iter_volume_order() {
        let chunk = ChunkData::new(ChunkCoord::new(0, 0));
        let cells: Vec<LocalPos> = chunk.iter_volume().take(18).map(|(p, _)| p).collect();
        assert_eq!(cells[0], LocalPos { x: 0, y: 0, z: 0 });
        assert_eq!(cells[1], LocalPos { x: 1, y: 0, z: 0 });
        assert_eq!(cells[16], LocalPos { x: 0, y: 0, z: 1 });
        assert_eq!(chunk.iter_volume().count(), CHUNK_VOLUME);

        let last = chunk.iter_volume().last().map(|(p, _)| p);
        assert_eq!(last, Some(LocalPos { x: 15, y: 127, z: 15 }));
    }

    #[test]
    fn test_iter_solid_skips_air() {
        let mut chunk = ChunkData::new(ChunkCoord::new(0, 0));
        chunk.set_block(0, 0, 0, BlockId::from("stone"));
        chunk.set_block(5, 9, 2, BlockId::from("grass"));
        let mut solid: Vec<_> = chunk.iter_solid().map(|(p, id)| (p.index(), id.clone())).collect();
        solid.sort();
        assert_eq!(solid.len(), 2);
        assert!(solid.iter().all(|(_, id)| !id.is_air()));
    }

    #[test]
    fn test_local_index_round_trip() {
        for (x, y, z) in [(0, 0, 0), (15, 127, 15), (3, 64, 9)] {
            let pos = LocalPos::new(x, y, z).unwrap();
            assert_eq!(LocalPos::from_index(pos.index()), Some(pos));
        }
        assert_eq!(LocalPos::from_index(CHUNK_VOLUME as u16), None);
    }
}
