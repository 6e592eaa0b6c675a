//! Block type identifiers

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Identifier of a block type, e.g. `"stone"` or `"grass"`
///
/// Identifiers are plain strings so new block types can be added by content
/// without touching this crate. `"air"` is reserved for empty space and is
/// never stored in a [`ChunkData`](crate::voxel::ChunkData).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(Cow<'static, str>);

impl BlockId {
    /// Empty space
    pub const AIR: BlockId = BlockId(Cow::Borrowed("air"));

    /// Create an identifier from a static name without allocating
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Create an identifier from an owned or borrowed name
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this identifier is air
    pub fn is_air(&self) -> bool {
        self.0 == "air"
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for BlockId {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for BlockId {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}
