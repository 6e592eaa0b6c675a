//! Surface extraction: face culling, optional greedy merging, geometry build
//!
//! Extraction runs in two passes. [`SurfaceExtractor::quads`] finds visible
//! faces and merges them into rectangles; [`SurfaceExtractor::extract`] turns
//! those rectangles into per-material geometry for the requested LoD.

use std::collections::BTreeMap;

use crate::mesh::direction::Direction;
use crate::mesh::geometry::{ChunkMesh, MeshGroup, Quad};
use crate::mesh::greedy::{merge_slice, unit_rects};
use crate::mesh::material::{resolve_slot, BlockColors, MaterialResolver, MaterialSlot};
use crate::streaming::lod::LodLevel;
use crate::voxel::{BlockId, ChunkData, CHUNK_HEIGHT, CHUNK_SIZE};

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Meshing switches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Merge coplanar same-block faces into rectangles
    pub greedy: bool,
    /// Skip faces hidden by an adjacent solid voxel
    pub culling: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { greedy: true, culling: true }
    }
}

/// Horizontally adjacent chunks consulted when culling border faces
///
/// A missing neighbour counts as unknown, so border faces toward it are kept.
#[derive(Clone, Copy, Debug, Default)]
pub struct Neighbors<'a> {
    pub pos_x: Option<&'a ChunkData>,
    pub neg_x: Option<&'a ChunkData>,
    pub pos_z: Option<&'a ChunkData>,
    pub neg_z: Option<&'a ChunkData>,
}

impl<'a> Neighbors<'a> {
    /// No neighbour data; every border face is emitted
    pub fn none() -> Self {
        Self::default()
    }

    /// Solidity of a cell just outside the chunk, if known
    fn is_solid(&self, x: i32, y: i32, z: i32) -> Option<bool> {
        if !(0..CHUNK_HEIGHT).contains(&y) {
            return None;
        }
        let (chunk, lx, lz) = if x < 0 {
            (self.neg_x?, x + CHUNK_SIZE, z)
        } else if x >= CHUNK_SIZE {
            (self.pos_x?, x - CHUNK_SIZE, z)
        } else if z < 0 {
            (self.neg_z?, x, z + CHUNK_SIZE)
        } else if z >= CHUNK_SIZE {
            (self.pos_z?, x, z - CHUNK_SIZE)
        } else {
            return None;
        };
        Some(chunk.is_solid(lx, y, lz))
    }
}

type SliceKey = (BlockId, Direction, i32);

/// Converts chunk voxels into renderable surface geometry
pub struct SurfaceExtractor {
    materials: Box<dyn MaterialResolver>,
    colors: BlockColors,
    options: ExtractOptions,
}

impl SurfaceExtractor {
    /// Create an extractor with default options (greedy + culling)
    pub fn new(materials: impl MaterialResolver + 'static, colors: BlockColors) -> Self {
        Self {
            materials: Box::new(materials),
            colors,
            options: ExtractOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    pub fn set_options(&mut self, options: ExtractOptions) {
        self.options = options;
    }

    /// Whether a face of the voxel at (x, y, z) should be emitted
    fn face_visible(&self, chunk: &ChunkData, neighbors: &Neighbors<'_>, x: i32, y: i32, z: i32, dir: Direction) -> bool {
        // World floor: nothing is ever seen from below y = 0
        if dir == Direction::NegY && y == 0 {
            return false;
        }
        if !self.options.culling {
            return true;
        }

        let n = dir.normal();
        let (nx, ny, nz) = (x + n.x, y + n.y, z + n.z);
        if (0..CHUNK_SIZE).contains(&nx) && (0..CHUNK_SIZE).contains(&nz) {
            // Above the chunk top counts as unknown and stays visible
            return !(0..CHUNK_HEIGHT).contains(&ny) || !chunk.is_solid(nx, ny, nz);
        }
        match neighbors.is_solid(nx, ny, nz) {
            Some(solid) => !solid,
            None => true,
        }
    }

    /// Visible faces grouped into slices, merged per the greedy option
    pub fn quads(&self, chunk: &ChunkData, neighbors: &Neighbors<'_>) -> Vec<Quad> {
        let mut slices: BTreeMap<SliceKey, Vec<(i32, i32)>> = BTreeMap::new();

        for (pos, block) in chunk.iter_solid() {
            let coords = [pos.x as i32, pos.y as i32, pos.z as i32];
            for dir in Direction::ALL {
                if !self.face_visible(chunk, neighbors, coords[0], coords[1], coords[2], dir) {
                    continue;
                }
                let info = dir.info();
                slices
                    .entry((block.clone(), dir, coords[info.axis]))
                    .or_default()
                    .push((coords[info.u_axis], coords[info.v_axis]));
            }
        }

        let mut quads = Vec::new();
        for ((block, direction, depth), cells) in slices {
            let rects = if self.options.greedy {
                merge_slice(&cells)
            } else {
                unit_rects(&cells)
            };
            quads.extend(rects.into_iter().map(|r| Quad {
                block: block.clone(),
                direction,
                depth,
                u: r.u,
                v: r.v,
                width: r.width,
                height: r.height,
            }));
        }
        quads
    }

    /// Build the renderable mesh of a chunk at the given LoD
    ///
    /// Full detail groups geometry by the resolved per-face material; coarse
    /// detail puts everything in [`MaterialSlot::VERTEX_COLORED`] with the
    /// block's flat colour on each vertex.
    pub fn extract(&self, chunk: &ChunkData, neighbors: &Neighbors<'_>, lod: LodLevel) -> ChunkMesh {
        let quads = self.quads(chunk, neighbors);
        let mut groups: BTreeMap<MaterialSlot, MeshGroup> = BTreeMap::new();
        let mut bucket: Option<((BlockId, Direction), MaterialSlot, [f32; 4])> = None;

        for quad in &quads {
            let key = (quad.block.clone(), quad.direction);
            // Quads arrive sorted by (block, direction), so one lookup per bucket
            let cached = bucket
                .as_ref()
                .filter(|(k, _, _)| *k == key)
                .map(|(_, slot, color)| (*slot, *color));
            let (slot, color) = match cached {
                Some(hit) => hit,
                None => {
                    let resolved = match lod {
                        LodLevel::Full => (resolve_slot(self.materials.as_ref(), &quad.block, quad.direction), WHITE),
                        LodLevel::Coarse => (MaterialSlot::VERTEX_COLORED, self.colors.color(&quad.block)),
                    };
                    bucket = Some((key, resolved.0, resolved.1));
                    resolved
                }
            };
            groups
                .entry(slot)
                .or_insert_with(|| MeshGroup::new(slot))
                .push_quad(quad, color);
        }

        ChunkMesh {
            coord: chunk.coord(),
            lod,
            groups: groups.into_values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::material::MaterialTable;
    use crate::voxel::ChunkCoord;

    fn stone() -> BlockId {
        BlockId::from("stone")
    }

    fn extractor(greedy: bool, culling: bool) -> SurfaceExtractor {
        let mut table = MaterialTable::new();
        table.insert_uniform(stone(), MaterialSlot(1));
        table.insert_top_side_bottom(BlockId::from("grass"), MaterialSlot(2), MaterialSlot(3), MaterialSlot(4));
        SurfaceExtractor::new(table, BlockColors::new()).with_options(ExtractOptions { greedy, culling })
    }

    fn solid_box(chunk: &mut ChunkData, min: (i32, i32, i32), size: (i32, i32, i32), id: &BlockId) {
        for x in min.0..min.0 + size.0 {
            for y in min.1..min.1 + size.1 {
                for z in min.2..min.2 + size.2 {
                    chunk.set_block(x, y, z, id.clone());
                }
            }
        }
    }

    fn face_counts(quads: &[Quad]) -> [i32; 6] {
        let mut counts = [0; 6];
        for q in quads {
            counts[q.direction.index()] += q.area();
        }
        counts
    }

    #[test]
    fn test_culling_hides_internal_faces() {
        let mut chunk = ChunkData::new(ChunkCoord::new(0, 0));
        solid_box(&mut chunk, (4, 10, 4), (2, 2, 2), &stone());

        let quads = extractor(false, true).quads(&chunk, &Neighbors::none());
        // 2×2×2 cube exposes 4 faces per side
        assert_eq!(quads.len(), 24);
        assert_eq!(face_counts(&quads), [4; 6]);

        // No emitted face may sit between two solid voxels
        for q in &quads {
            let info = q.direction.info();
            let mut cell = [0; 3];
            cell[info.axis] = q.depth;
            cell[info.u_axis] = q.u;
            cell[info.v_axis] = q.v;
            let n = q.direction.normal();
            assert!(!chunk.is_solid(cell[0] + n.x, cell[1] + n.y, cell[2] + n.z));
        }
    }

    #[test]
    fn test_no_culling_emits_every_face() {
        let mut chunk = ChunkData::new(ChunkCoord::new(0, 0));
        solid_box(&mut chunk, (4, 10, 4), (2, 2, 2), &stone());

        let quads = extractor(false, false).quads(&chunk, &Neighbors::none());
        assert_eq!(quads.len(), 6 * 8);
    }

    #[test]
    fn test_world_floor_always_culled() {
        let mut chunk = ChunkData::new(ChunkCoord::new(0, 0));
        chunk.set_block(3, 0, 3, stone());

        for culling in [true, false] {
            let quads = extractor(false, culling).quads(&chunk, &Neighbors::none());
            assert_eq!(quads.len(), 5);
            assert!(quads.iter().all(|q| q.direction != Direction::NegY));
        }
    }

    #[test]
    fn test_border_faces_use_neighbors() {
        let mut chunk = ChunkData::new(ChunkCoord::new(0, 0));
        chunk.set_block(15, 5, 0, stone());

        // Unknown neighbours keep border faces
        let quads = extractor(false, true).quads(&chunk, &Neighbors::none());
        assert_eq!(quads.len(), 6);

        let mut east = ChunkData::new(ChunkCoord::new(1, 0));
        east.set_block(0, 5, 0, stone());
        let mut south = ChunkData::new(ChunkCoord::new(0, -1));
        south.set_block(15, 5, 15, stone());

        let neighbors = Neighbors {
            pos_x: Some(&east),
            neg_z: Some(&south),
            ..Neighbors::none()
        };
        let quads = extractor(false, true).quads(&chunk, &neighbors);
        assert_eq!(quads.len(), 4);
        assert!(quads.iter().all(|q| q.direction != Direction::PosX && q.direction != Direction::NegZ));
    }

    #[test]
    fn test_air_neighbor_chunk_keeps_face() {
        let mut chunk = ChunkData::new(ChunkCoord::new(0, 0));
        chunk.set_block(0, 5, 5, stone());
        let west = ChunkData::new(ChunkCoord::new(-1, 0));
        let neighbors = Neighbors { neg_x: Some(&west), ..Neighbors::none() };
        let quads = extractor(false, true).quads(&chunk, &neighbors);
        assert!(quads.iter().any(|q| q.direction == Direction::NegX));
    }

    #[test]
    fn test_top_of_chunk_is_visible() {
        let mut chunk = ChunkData::new(ChunkCoord::new(0, 0));
        chunk.set_block(1, CHUNK_HEIGHT - 1, 1, stone());
        let quads = extractor(false, true).quads(&chunk, &Neighbors::none());
        assert!(quads.iter().any(|q| q.direction == Direction::PosY));
    }

    #[test]
    fn test_greedy_area_matches_face_count() {
        let mut chunk = ChunkData::new(ChunkCoord::new(0, 0));
        // Terrain-like layers plus scattered blocks of a second type
        solid_box(&mut chunk, (0, 0, 0), (16, 4, 16), &stone());
        for i in 0..16 {
            chunk.set_block(i, 4 + (i % 3), (i * 5) % 16, BlockId::from("grass"));
            chunk.set_block((i * 7) % 16, 4, i, BlockId::from("grass"));
        }
        chunk.set_block(8, 2, 8, BlockId::AIR);

        for culling in [true, false] {
            let plain = extractor(false, culling).quads(&chunk, &Neighbors::none());
            let greedy = extractor(true, culling).quads(&chunk, &Neighbors::none());
            assert_eq!(face_counts(&plain), face_counts(&greedy));
            assert!(greedy.len() < plain.len());
        }
    }

    #[test]
    fn test_greedy_merges_flat_floor() {
        let mut chunk = ChunkData::new(ChunkCoord::new(0, 0));
        solid_box(&mut chunk, (0, 0, 0), (16, 1, 16), &stone());
        let quads = extractor(true, true).quads(&chunk, &Neighbors::none());
        let tops: Vec<_> = quads.iter().filter(|q| q.direction == Direction::PosY).collect();
        assert_eq!(tops.len(), 1);
        assert_eq!((tops[0].width, tops[0].height), (16, 16));
    }

    #[test]
    fn test_greedy_does_not_merge_different_blocks() {
        let mut chunk = ChunkData::new(ChunkCoord::new(0, 0));
        chunk.set_block(0, 3, 0, stone());
        chunk.set_block(1, 3, 0, BlockId::from("grass"));
        let quads = extractor(true, true).quads(&chunk, &Neighbors::none());
        let tops = quads.iter().filter(|q| q.direction == Direction::PosY).count();
        assert_eq!(tops, 2);
    }

    #[test]
    fn test_extract_groups_by_material() {
        let mut chunk = ChunkData::new(ChunkCoord::new(0, 0));
        chunk.set_block(2, 2, 2, BlockId::from("grass"));
        chunk.set_block(6, 2, 2, stone());
        chunk.set_block(9, 2, 2, BlockId::from("unregistered"));

        let mesh = extractor(true, true).extract(&chunk, &Neighbors::none(), LodLevel::Full);
        assert_eq!(mesh.group(MaterialSlot(2)).map(|g| g.quad_count()), Some(1));
        assert_eq!(mesh.group(MaterialSlot(3)).map(|g| g.quad_count()), Some(4));
        assert_eq!(mesh.group(MaterialSlot(4)).map(|g| g.quad_count()), Some(1));
        assert_eq!(mesh.group(MaterialSlot(1)).map(|g| g.quad_count()), Some(6));
        assert_eq!(mesh.group(MaterialSlot::PLACEHOLDER).map(|g| g.quad_count()), Some(6));
        assert_eq!(mesh.quad_count(), 18);
        assert_eq!(mesh.triangle_count(), 36);
        assert_eq!(mesh.vertex_count(), 72);
    }

    #[test]
    fn test_coarse_lod_uses_vertex_colors() {
        let mut colors = BlockColors::new();
        colors.insert(stone(), [0.4, 0.4, 0.45, 1.0]);
        let mut table = MaterialTable::new();
        table.insert_uniform(stone(), MaterialSlot(1));
        let extractor = SurfaceExtractor::new(table, colors);

        let mut chunk = ChunkData::new(ChunkCoord::new(0, 0));
        solid_box(&mut chunk, (0, 1, 0), (3, 3, 3), &stone());

        let full = extractor.extract(&chunk, &Neighbors::none(), LodLevel::Full);
        let coarse = extractor.extract(&chunk, &Neighbors::none(), LodLevel::Coarse);

        assert_eq!(coarse.groups.len(), 1);
        assert_eq!(coarse.groups[0].material, MaterialSlot::VERTEX_COLORED);
        assert!(coarse.groups[0].vertices.iter().all(|v| v.color == [0.4, 0.4, 0.45, 1.0]));
        assert_eq!(coarse.quad_count(), full.quad_count());
        assert_eq!(coarse.lod, LodLevel::Coarse);
    }

    #[test]
    fn test_empty_chunk_has_empty_mesh() {
        let chunk = ChunkData::new(ChunkCoord::new(3, -2));
        let mesh = extractor(true, true).extract(&chunk, &Neighbors::none(), LodLevel::Full);
        assert!(mesh.is_empty());
        assert_eq!(mesh.coord, ChunkCoord::new(3, -2));
    }
}
