//! Material slots and block → material resolution

use crate::mesh::direction::Direction;
use crate::voxel::BlockId;
use std::collections::HashMap;

/// Index of a renderable material owned by the host renderer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialSlot(pub u32);

impl MaterialSlot {
    /// Reserved fallback for block ids the resolver does not know
    pub const PLACEHOLDER: MaterialSlot = MaterialSlot(u32::MAX);
    /// Reserved slot for coarse-LoD geometry shaded by vertex colour
    pub const VERTEX_COLORED: MaterialSlot = MaterialSlot(u32::MAX - 1);

    /// Whether this is one of the reserved slots
    pub fn is_reserved(&self) -> bool {
        *self == Self::PLACEHOLDER || *self == Self::VERTEX_COLORED
    }
}

/// Resolves a block id to its six per-face materials
///
/// The returned list is indexed by [`Direction::index`]. Returning `None`
/// for a non-air id is not an error: the mesher substitutes
/// [`MaterialSlot::PLACEHOLDER`].
pub trait MaterialResolver {
    fn materials(&self, block: &BlockId) -> Option<[MaterialSlot; 6]>;
}

impl<F> MaterialResolver for F
where
    F: Fn(&BlockId) -> Option<[MaterialSlot; 6]>,
{
    fn materials(&self, block: &BlockId) -> Option<[MaterialSlot; 6]> {
        self(block)
    }
}

/// Look up one face's slot, falling back to the placeholder
pub fn resolve_slot(resolver: &dyn MaterialResolver, block: &BlockId, dir: Direction) -> MaterialSlot {
    resolver
        .materials(block)
        .map(|slots| slots[dir.index()])
        .unwrap_or(MaterialSlot::PLACEHOLDER)
}

/// Map-backed [`MaterialResolver`]
#[derive(Clone, Debug, Default)]
pub struct MaterialTable {
    entries: HashMap<BlockId, [MaterialSlot; 6]>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block using the same material on every face
    pub fn insert_uniform(&mut self, block: BlockId, slot: MaterialSlot) {
        self.entries.insert(block, [slot; 6]);
    }

    /// Register a block with distinct top, side and bottom materials
    pub fn insert_top_side_bottom(
        &mut self,
        block: BlockId,
        top: MaterialSlot,
        side: MaterialSlot,
        bottom: MaterialSlot,
    ) {
        let mut slots = [side; 6];
        slots[Direction::PosY.index()] = top;
        slots[Direction::NegY.index()] = bottom;
        self.entries.insert(block, slots);
    }

    /// Register a block with an explicit per-face list
    pub fn insert(&mut self, block: BlockId, slots: [MaterialSlot; 6]) {
        self.entries.insert(block, slots);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MaterialResolver for MaterialTable {
    fn materials(&self, block: &BlockId) -> Option<[MaterialSlot; 6]> {
        if block.is_air() {
            return None;
        }
        self.entries.get(block).copied()
    }
}

/// Flat per-block colours used by coarse LoD meshes
#[derive(Clone, Debug)]
pub struct BlockColors {
    colors: HashMap<BlockId, [f32; 4]>,
    default: [f32; 4],
}

impl Default for BlockColors {
    fn default() -> Self {
        Self {
            colors: HashMap::new(),
            default: [0.5, 0.5, 0.5, 1.0], // neutral grey
        }
    }
}

impl BlockColors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the colour used for blocks without an entry
    pub fn with_default(mut self, color: [f32; 4]) -> Self {
        self.default = color;
        self
    }

    /// Set a block's colour (linear RGBA)
    pub fn insert(&mut self, block: BlockId, color: [f32; 4]) {
        self.colors.insert(block, color);
    }

    /// Colour for a block, or the default
    pub fn color(&self, block: &BlockId) -> [f32; 4] {
        self.colors.get(block).copied().unwrap_or(self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_top_side_bottom() {
        let mut table = MaterialTable::new();
        table.insert_top_side_bottom(
            BlockId::from("grass"),
            MaterialSlot(1),
            MaterialSlot(2),
            MaterialSlot(3),
        );

        let grass = BlockId::from("grass");
        assert_eq!(resolve_slot(&table, &grass, Direction::PosY), MaterialSlot(1));
        assert_eq!(resolve_slot(&table, &grass, Direction::NegY), MaterialSlot(3));
        assert_eq!(resolve_slot(&table, &grass, Direction::PosX), MaterialSlot(2));
        assert_eq!(resolve_slot(&table, &grass, Direction::NegZ), MaterialSlot(2));
    }

    #[test]
    fn test_unknown_block_falls_back_to_placeholder() {
        let table = MaterialTable::new();
        let slot = resolve_slot(&table, &BlockId::from("mystery"), Direction::PosX);
        assert_eq!(slot, MaterialSlot::PLACEHOLDER);
        assert!(slot.is_reserved());
    }

    #[test]
    fn test_air_has_no_materials() {
        let mut table = MaterialTable::new();
        table.insert_uniform(BlockId::AIR, MaterialSlot(9));
        assert!(table.materials(&BlockId::AIR).is_none());
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |block: &BlockId| (block.as_str() == "stone").then_some([MaterialSlot(4); 6]);
        assert_eq!(resolve_slot(&resolver, &BlockId::from("stone"), Direction::PosZ), MaterialSlot(4));
        assert_eq!(resolve_slot(&resolver, &BlockId::from("sand"), Direction::PosZ), MaterialSlot::PLACEHOLDER);
    }

    #[test]
    fn test_block_colors_default() {
        let mut colors = BlockColors::new().with_default([1.0, 0.0, 1.0, 1.0]);
        colors.insert(BlockId::from("grass"), [0.2, 0.7, 0.2, 1.0]);
        assert_eq!(colors.color(&BlockId::from("grass")), [0.2, 0.7, 0.2, 1.0]);
        assert_eq!(colors.color(&BlockId::from("stone")), [1.0, 0.0, 1.0, 1.0]);
    }
}
