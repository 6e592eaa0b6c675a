//! Surface extraction from chunk voxels to renderable geometry

pub mod direction;
pub mod material;
pub mod geometry;
pub mod greedy;
pub mod extractor;

pub use direction::{Direction, DirectionInfo};
pub use material::{BlockColors, MaterialResolver, MaterialSlot, MaterialTable};
pub use geometry::{ChunkMesh, MeshGroup, Quad, Vertex};
pub use extractor::{ExtractOptions, Neighbors, SurfaceExtractor};
