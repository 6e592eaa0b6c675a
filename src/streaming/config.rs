//! Streaming configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::{Error, Result};
use crate::mesh::ExtractOptions;

/// Recognised streaming options
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StreamingConfig {
    /// World whose chunks are loaded from and saved to the store
    pub world_id: String,
    /// Residency radius in chunks (Chebyshev)
    pub chunk_range: u32,
    /// Full-detail radius in chunks (Chebyshev)
    pub lod0_range: u32,
    /// Jobs executed per frame at most
    pub max_processing_per_frame: usize,
    /// Merge coplanar faces into rectangles
    pub greedy: bool,
    /// Skip faces hidden by solid neighbours
    pub culling: bool,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            world_id: "default".to_string(),
            chunk_range: 6,
            lod0_range: 3,
            max_processing_per_frame: 4,
            greedy: true,
            culling: true,
        }
    }
}

impl StreamingConfig {
    /// Parse from JSON; missing keys take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject settings that would stall streaming
    pub fn validate(&self) -> Result<()> {
        if self.max_processing_per_frame == 0 {
            return Err(Error::Config("maxProcessingPerFrame must be at least 1".into()));
        }
        if self.world_id.is_empty() {
            return Err(Error::Config("worldId must not be empty".into()));
        }
        Ok(())
    }

    /// Meshing switches derived from this config
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            greedy: self.greedy,
            culling: self.culling,
        }
    }
}
