use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::assets::manifest::{AssetManifest, SpriteEntry};
use crate::components::animation::{AnimState, SpriteDescriptor};
use crate::components::sprite::{AtlasId, SpriteComponent};
use crate::error::AssetError;

/// Anything that can describe an actor's animation strips.
pub trait SpriteSource {
    fn load_sprite_descriptor(&self, actor: &str, state: AnimState) -> Result<SpriteDescriptor, AssetError>;
}

pub fn sprite_key(actor: &str, state: AnimState) -> String {
    format!("{}/{}", actor, state.name())
}

/// Registry of named sprites, built from an AssetManifest.
/// Lookups that miss are logged once per key.
pub struct SpriteRegistry {
    sprites: HashMap<String, SpriteComponent>,
    entries: HashMap<String, SpriteEntry>,
    warned: RefCell<HashSet<String>>,
}

impl SpriteRegistry {
    pub fn new() -> Self {
        Self {
            sprites: HashMap::new(),
            entries: HashMap::new(),
            warned: RefCell::new(HashSet::new()),
        }
    }

    pub fn from_manifest(manifest: &AssetManifest) -> Self {
        let mut sprites = HashMap::with_capacity(manifest.sprites.len());
        for (name, entry) in &manifest.sprites {
            sprites.insert(name.clone(), SpriteComponent {
                atlas: AtlasId(entry.atlas),
                col: entry.col as f32,
                row: entry.row as f32,
                alpha: 1.0,
            });
        }
        Self {
            sprites,
            entries: manifest.sprites.clone(),
            warned: RefCell::new(HashSet::new()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, AssetError> {
        let manifest = AssetManifest::from_json(json)?;
        Ok(Self::from_manifest(&manifest))
    }

    /// Look up a sprite by name. Returns None if not found.
    pub fn get(&self, name: &str) -> Option<&SpriteComponent> {
        self.sprites.get(name)
    }

    /// Like `get`, but a miss is warned about the first time it happens.
    pub fn lookup(&self, name: &str) -> Result<&SpriteComponent, AssetError> {
        match self.sprites.get(name) {
            Some(sprite) => Ok(sprite),
            None => {
                if self.warned.borrow_mut().insert(name.to_string()) {
                    log::warn!("sprite `{}` missing, drawing placeholder", name);
                }
                Err(AssetError::Missing(name.to_string()))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

impl SpriteSource for SpriteRegistry {
    fn load_sprite_descriptor(&self, actor: &str, state: AnimState) -> Result<SpriteDescriptor, AssetError> {
        let key = sprite_key(actor, state);
        let entry = self.entries.get(&key).ok_or_else(|| AssetError::Missing(key.clone()))?;
        if entry.frames <= 0 {
            return Err(AssetError::Invalid { name: key, field: "frames" });
        }
        if !(entry.frame_ms > 0.0) {
            return Err(AssetError::Invalid { name: key, field: "frame_ms" });
        }
        Ok(SpriteDescriptor::new(entry.frames as u32, entry.frame_ms))
    }
}

impl Default for SpriteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "sprites": {
            "samurai/idle": { "atlas": 0, "col": 3, "row": 5, "frames": 8, "frame_ms": 90 },
            "samurai/death": { "atlas": 0, "col": 0, "row": 6, "frames": 0 }
        }
    }"#;

    #[test]
    fn loads_from_manifest() {
        let reg = SpriteRegistry::from_json(JSON).unwrap();
        let idle = reg.get("samurai/idle").expect("idle should exist");
        assert_eq!(idle.atlas, AtlasId(0));
        assert_eq!(idle.col, 3.0);
        assert_eq!(idle.row, 5.0);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn descriptor_lookup() {
        let reg = SpriteRegistry::from_json(JSON).unwrap();
        let desc = reg.load_sprite_descriptor("samurai", AnimState::Idle).unwrap();
        assert_eq!(desc, SpriteDescriptor::new(8, 90.0));
        assert!(matches!(
            reg.load_sprite_descriptor("samurai", AnimState::Run),
            Err(AssetError::Missing(_))
        ));
        assert!(matches!(
            reg.load_sprite_descriptor("samurai", AnimState::Death),
            Err(AssetError::Invalid { field: "frames", .. })
        ));
    }

    #[test]
    fn unknown_is_missing() {
        let reg = SpriteRegistry::new();
        assert!(reg.get("nonexistent").is_none());
        assert!(reg.lookup("nonexistent").is_err());
        assert!(reg.lookup("nonexistent").is_err());
        assert_eq!(reg.warned.borrow().len(), 1);
    }
}
