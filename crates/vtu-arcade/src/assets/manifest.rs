use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Asset manifest describing the atlases and named sprite strips.
/// Loaded from a JSON file at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    #[serde(default)]
    pub atlases: Vec<AtlasDescriptor>,
    /// Strip lookup by key, e.g. `"samurai/attack"` or `"runner/coin"`.
    #[serde(default)]
    pub sprites: HashMap<String, SpriteEntry>,
    #[serde(default)]
    pub sounds: HashMap<String, SoundDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasDescriptor {
    pub name: String,
    pub cols: u32,
    pub rows: u32,
    pub path: String,
}

/// A horizontal strip of frames inside an atlas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteEntry {
    pub atlas: u32,
    /// Column of the first frame.
    pub col: u32,
    pub row: u32,
    /// Signed so a bad manifest is reported rather than rejected by the parser.
    #[serde(default = "default_frames")]
    pub frames: i32,
    #[serde(default = "default_frame_ms")]
    pub frame_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundDescriptor {
    pub path: String,
    /// Numeric `SoundEvent` that plays this clip.
    #[serde(default)]
    pub event_id: Option<u32>,
}

fn default_frames() -> i32 {
    1
}

fn default_frame_ms() -> f64 {
    100.0
}

impl AssetManifest {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
