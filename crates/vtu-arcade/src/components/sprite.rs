/// Identifies which texture atlas a sprite belongs to.
/// Index into the AssetManifest's atlas list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AtlasId(pub u32);

/// Where a sprite strip starts in its atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteComponent {
    pub atlas: AtlasId,
    /// Column of frame 0. Frame `n` sits at `col + n`.
    pub col: f32,
    pub row: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
}

impl Default for SpriteComponent {
    fn default() -> Self {
        Self {
            atlas: AtlasId(0),
            col: 0.0,
            row: 0.0,
            alpha: 1.0,
        }
    }
}
