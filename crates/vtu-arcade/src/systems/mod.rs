pub mod ambient;
pub mod animation;
pub mod render;
pub mod spawn;
