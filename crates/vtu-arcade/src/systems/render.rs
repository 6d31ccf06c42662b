use glam::Vec2;

use crate::assets::registry::SpriteRegistry;
use crate::renderer::instance::{RenderBuffer, RenderInstance};

/// Append one sprite frame. A key the registry does not know becomes a
/// placeholder rectangle so the frame still draws.
pub fn push_sprite(
    buffer: &mut RenderBuffer,
    sprites: &SpriteRegistry,
    key: &str,
    frame: u32,
    pos: Vec2,
    size: Vec2,
) {
    let instance = match sprites.lookup(key) {
        Ok(sprite) => RenderInstance {
            x: pos.x,
            y: pos.y,
            width: size.x,
            height: size.y,
            atlas: sprite.atlas.0 as f32,
            col: sprite.col + frame as f32,
            row: sprite.row,
            alpha: sprite.alpha,
        },
        Err(_) => RenderInstance {
            x: pos.x,
            y: pos.y,
            width: size.x,
            height: size.y,
            atlas: RenderInstance::PLACEHOLDER_ATLAS,
            col: 0.0,
            row: 0.0,
            alpha: 1.0,
        },
    };
    buffer.push(instance);
}
