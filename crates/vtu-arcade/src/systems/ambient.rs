//! Background decorations. Purely cosmetic: nothing here feeds back into
//! gameplay, but draws come from the session RNG so replays match.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::rng::RandomSource;

/// Looping frame counter for scenery such as the shop sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameLoop {
    frame_count: u32,
    frame_ms: f64,
    frame: u32,
    elapsed_ms: f64,
}

impl FrameLoop {
    pub fn new(frame_count: u32, frame_ms: f64) -> Self {
        Self {
            frame_count: frame_count.max(1),
            frame_ms,
            frame: 0,
            elapsed_ms: 0.0,
        }
    }

    pub fn advance(&mut self, dt_ms: f64) {
        self.elapsed_ms += dt_ms;
        while self.elapsed_ms >= self.frame_ms {
            self.elapsed_ms -= self.frame_ms;
            self.frame = (self.frame + 1) % self.frame_count;
        }
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mote {
    pub pos: Vec2,
    /// Units per second.
    pub speed: f32,
}

/// Drifting stars and, in autumn, falling leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backdrop {
    width: f32,
    sky_height: f32,
    pub stars: Vec<Mote>,
    pub leaves: Vec<Mote>,
}

impl Backdrop {
    pub fn new(width: f32, sky_height: f32, star_count: usize, rng: &mut dyn RandomSource) -> Self {
        let stars = (0..star_count)
            .map(|_| Mote {
                pos: Vec2::new(rng.range(0.0, width), rng.range(0.0, sky_height)),
                speed: rng.range(6.0, 24.0),
            })
            .collect();
        Self {
            width,
            sky_height,
            stars,
            leaves: Vec::new(),
        }
    }

    /// Replace the leaf set, e.g. when the weather turns to autumn.
    pub fn scatter_leaves(&mut self, count: usize, rng: &mut dyn RandomSource) {
        self.leaves = (0..count)
            .map(|_| Mote {
                pos: Vec2::new(rng.range(0.0, self.width), rng.range(0.0, self.sky_height)),
                speed: rng.range(9.0, 15.0),
            })
            .collect();
    }

    pub fn clear_leaves(&mut self) {
        self.leaves.clear();
    }

    /// Stars drift left and wrap; leaves fall and respawn at the top.
    pub fn advance(&mut self, dt: f32, rng: &mut dyn RandomSource) {
        for star in &mut self.stars {
            star.pos.x -= star.speed * dt;
            if star.pos.x < 0.0 {
                star.pos.x = self.width;
                star.pos.y = rng.range(0.0, self.sky_height);
            }
        }
        for leaf in &mut self.leaves {
            leaf.pos.y += leaf.speed * dt;
            if leaf.pos.y > self.sky_height {
                leaf.pos.y = -10.0;
                leaf.pos.x = rng.range(0.0, self.width);
            }
        }
    }
}
