//! Axis-aligned face directions
//!
//! Every per-direction fact the mesher needs (axis, sign, normal, the two
//! in-plane axes and the triangle winding) lives in one compile-time table,
//! so merged quads of any size are oriented the same way as unit faces.

use glam::IVec3;

/// One of the six faces of a voxel
///
/// The discriminant order (+X, -X, +Y, -Y, +Z, -Z) is also the order of the
/// 6-slot material lists returned by a
/// [`MaterialResolver`](crate::mesh::MaterialResolver).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
}

/// Static properties of a [`Direction`]
#[derive(Clone, Copy, Debug)]
pub struct DirectionInfo {
    /// Axis the face is perpendicular to (0 = x, 1 = y, 2 = z)
    pub axis: usize,
    /// +1 for the positive face, -1 for the negative face
    pub sign: i32,
    /// Outward unit normal
    pub normal: IVec3,
    /// In-plane axis swept first by the greedy mesher
    pub u_axis: usize,
    /// In-plane axis swept second by the greedy mesher
    pub v_axis: usize,
    /// Whether (u × v) points against the normal, requiring reversed winding
    pub flip_winding: bool,
}

static DIRECTION_TABLE: [DirectionInfo; 6] = [
    // +X: u = z, v = y, z × y = -x
    DirectionInfo { axis: 0, sign: 1, normal: IVec3::new(1, 0, 0), u_axis: 2, v_axis: 1, flip_winding: true },
    // -X
    DirectionInfo { axis: 0, sign: -1, normal: IVec3::new(-1, 0, 0), u_axis: 2, v_axis: 1, flip_winding: false },
    // +Y: u = x, v = z, x × z = -y
    DirectionInfo { axis: 1, sign: 1, normal: IVec3::new(0, 1, 0), u_axis: 0, v_axis: 2, flip_winding: true },
    // -Y
    DirectionInfo { axis: 1, sign: -1, normal: IVec3::new(0, -1, 0), u_axis: 0, v_axis: 2, flip_winding: false },
    // +Z: u = x, v = y, x × y = +z
    DirectionInfo { axis: 2, sign: 1, normal: IVec3::new(0, 0, 1), u_axis: 0, v_axis: 1, flip_winding: false },
    // -Z
    DirectionInfo { axis: 2, sign: -1, normal: IVec3::new(0, 0, -1), u_axis: 0, v_axis: 1, flip_winding: true },
];

impl Direction {
    /// All six directions in table order
    pub const ALL: [Direction; 6] = [
        Direction::PosX,
        Direction::NegX,
        Direction::PosY,
        Direction::NegY,
        Direction::PosZ,
        Direction::NegZ,
    ];

    /// Table index / material slot index
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Static properties for this direction
    pub fn info(self) -> &'static DirectionInfo {
        &DIRECTION_TABLE[self as usize]
    }

    /// Outward unit normal
    pub fn normal(self) -> IVec3 {
        self.info().normal
    }

    /// Opposite face
    pub fn opposite(self) -> Direction {
        match self {
            Direction::PosX => Direction::NegX,
            Direction::NegX => Direction::PosX,
            Direction::PosY => Direction::NegY,
            Direction::NegY => Direction::PosY,
            Direction::PosZ => Direction::NegZ,
            Direction::NegZ => Direction::PosZ,
        }
    }
}
