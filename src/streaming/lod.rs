//! Level of Detail (LOD) selection for resident chunks
//!
//! Two tiers: chunks within `lod0_range` (Chebyshev distance, in chunks) of
//! the viewer are meshed at full textured detail, everything farther out is
//! meshed coarse with flat vertex colours.

use crate::voxel::ChunkCoord;
use serde::{Deserialize, Serialize};

/// Detail tier of a chunk mesh
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LodLevel {
    /// LoD 0: textured, per-face materials
    Full,
    /// LoD 1: vertex coloured
    Coarse,
}

impl LodLevel {
    /// Numeric level (0 or 1)
    pub fn level(self) -> u32 {
        match self {
            LodLevel::Full => 0,
            LodLevel::Coarse => 1,
        }
    }
}

/// Calculate LOD level from Chebyshev distance in chunks
///
/// # Examples
/// ```
/// use chunkstream::streaming::lod::{lod_from_distance, LodLevel};
///
/// assert_eq!(lod_from_distance(0, 0), LodLevel::Full);
/// assert_eq!(lod_from_distance(1, 0), LodLevel::Coarse);
/// assert_eq!(lod_from_distance(3, 3), LodLevel::Full);
/// assert_eq!(lod_from_distance(4, 3), LodLevel::Coarse);
/// ```
pub fn lod_from_distance(distance: u32, lod0_range: u32) -> LodLevel {
    if distance <= lod0_range {
        LodLevel::Full
    } else {
        LodLevel::Coarse
    }
}

/// LOD of a chunk as seen from the viewer's chunk
pub fn lod_for_chunk(coord: ChunkCoord, center: ChunkCoord, lod0_range: u32) -> LodLevel {
    lod_from_distance(coord.chebyshev(center), lod0_range)
}

/// Whether a chunk lies on the ring where LoD flips as the viewer moves
///
/// Moving one chunk changes every Chebyshev distance by at most one, so only
/// chunks at `lod0_range` or `lod0_range + 1` can need a different LoD.
///
/// # Examples
/// ```
/// use chunkstream::streaming::lod::on_transition_ring;
///
/// assert!(on_transition_ring(2, 2));
/// assert!(on_transition_ring(3, 2));
/// assert!(!on_transition_ring(1, 2));
/// assert!(!on_transition_ring(4, 2));
/// ```
pub fn on_transition_ring(distance: u32, lod0_range: u32) -> bool {
    distance == lod0_range || distance == lod0_range + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lod_threshold_is_monotonic() {
        for lod0_range in 0..6 {
            for x in -8..=8 {
                for z in -8..=8 {
                    let coord = ChunkCoord::new(x, z);
                    let d = x.unsigned_abs().max(z.unsigned_abs());
                    let lod = lod_for_chunk(coord, ChunkCoord::new(0, 0), lod0_range);
                    assert_eq!(lod == LodLevel::Full, d <= lod0_range);
                }
            }
        }
    }

    #[test]
    fn test_lod_relative_to_center() {
        let center = ChunkCoord::new(10, -4);
        assert_eq!(lod_for_chunk(ChunkCoord::new(12, -4), center, 2), LodLevel::Full);
        assert_eq!(lod_for_chunk(ChunkCoord::new(12, -7), center, 2), LodLevel::Coarse);
    }

    #[test]
    fn test_level_numbers() {
        assert_eq!(LodLevel::Full.level(), 0);
        assert_eq!(LodLevel::Coarse.level(), 1);
        assert!(LodLevel::Full < LodLevel::Coarse);
    }
}
