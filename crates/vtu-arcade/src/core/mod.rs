pub mod collision;
pub mod physics;
pub mod rng;
pub mod scene;
pub mod time;
