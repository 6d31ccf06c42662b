pub mod animation;
pub mod entity;
pub mod fighter;
pub mod sprite;
pub mod transient;
