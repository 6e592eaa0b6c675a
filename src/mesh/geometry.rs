//! CPU-side geometry buffers produced by the surface extractor

use crate::mesh::direction::Direction;
use crate::mesh::material::MaterialSlot;
use crate::streaming::lod::LodLevel;
use crate::voxel::{BlockId, ChunkCoord};
use bytemuck::{Pod, Zeroable};

/// Mesh vertex, laid out for direct upload to a vertex buffer
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Chunk-local position (12 bytes, offset 0)
    pub position: [f32; 3],
    /// Outward face normal (12 bytes, offset 12)
    pub normal: [f32; 3],
    /// Tiled texture coordinate, one unit per voxel (8 bytes, offset 24)
    pub uv: [f32; 2],
    /// Vertex colour; white for textured geometry (16 bytes, offset 32)
    pub color: [f32; 4],
}

/// An axis-aligned rectangle of faces sharing block type and direction
///
/// A unit face has `width == height == 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quad {
    pub block: BlockId,
    pub direction: Direction,
    /// Voxel coordinate along the direction's axis
    pub depth: i32,
    /// Minimum corner along the direction's u axis
    pub u: i32,
    /// Minimum corner along the direction's v axis
    pub v: i32,
    pub width: i32,
    pub height: i32,
}

impl Quad {
    /// Number of unit faces covered
    pub fn area(&self) -> i32 {
        self.width * self.height
    }
}

/// All geometry drawn with one material
#[derive(Clone, Debug)]
pub struct MeshGroup {
    pub material: MaterialSlot,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshGroup {
    pub fn new(material: MaterialSlot) -> Self {
        Self {
            material,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Append one quad (4 vertices, 2 triangles)
    pub fn push_quad(&mut self, quad: &Quad, color: [f32; 4]) {
        let info = quad.direction.info();
        let base = self.vertices.len() as u32;

        let mut origin = [0.0f32; 3];
        origin[info.axis] = (quad.depth + if info.sign > 0 { 1 } else { 0 }) as f32;
        origin[info.u_axis] = quad.u as f32;
        origin[info.v_axis] = quad.v as f32;

        let w = quad.width as f32;
        let h = quad.height as f32;
        let corners = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
        let normal = info.normal.as_vec3().to_array();

        for (du, dv) in corners {
            let mut position = origin;
            position[info.u_axis] += du;
            position[info.v_axis] += dv;
            self.vertices.push(Vertex {
                position,
                normal,
                uv: [du, dv],
                color,
            });
        }

        let order: [u32; 6] = if info.flip_winding {
            [0, 2, 1, 0, 3, 2]
        } else {
            [0, 1, 2, 0, 2, 3]
        };
        self.indices.extend(order.iter().map(|i| base + i));
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }
}

/// Renderable surface of one chunk
///
/// Positions are chunk-local; the renderer places the mesh at
/// [`ChunkMesh::block_origin`].
#[derive(Clone, Debug)]
pub struct ChunkMesh {
    pub coord: ChunkCoord,
    pub lod: LodLevel,
    pub groups: Vec<MeshGroup>,
}

impl ChunkMesh {
    /// World-space block position of the mesh origin
    pub fn block_origin(&self) -> (i32, i32) {
        self.coord.block_origin()
    }

    pub fn group(&self, material: MaterialSlot) -> Option<&MeshGroup> {
        self.groups.iter().find(|g| g.material == material)
    }

    pub fn vertex_count(&self) -> usize {
        self.groups.iter().map(|g| g.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.groups.iter().map(|g| g.indices.len() / 3).sum()
    }

    pub fn quad_count(&self) -> usize {
        self.groups.iter().map(|g| g.quad_count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.indices.is_empty())
    }
}
