use bytemuck::{Pod, Zeroable};

/// Per-instance render data handed to the host renderer.
/// 8 floats = 32 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    /// Top-left corner in world space.
    pub x: f32,
    pub y: f32,
    /// Rendered size in world units.
    pub width: f32,
    pub height: f32,
    /// Atlas index, or `PLACEHOLDER_ATLAS` for a solid placeholder rectangle.
    pub atlas: f32,
    /// Atlas column of the frame to draw.
    pub col: f32,
    pub row: f32,
    pub alpha: f32,
}

impl RenderInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
    pub const PLACEHOLDER_ATLAS: f32 = -1.0;

    pub fn is_placeholder(&self) -> bool {
        self.atlas == Self::PLACEHOLDER_ATLAS
    }
}

/// Render buffer rebuilt from session state after every tick.
pub struct RenderBuffer {
    pub instances: Vec<RenderInstance>,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn push(&mut self, instance: RenderInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    pub fn placeholder_count(&self) -> usize {
        self.instances.iter().filter(|i| i.is_placeholder()).count()
    }

    /// Raw pointer to instance data for host-side reads.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }

    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}
