mod config;
mod detector;
mod geometry;
mod message;
mod physics;
mod render;

pub use config::*;
pub use detector::*;
pub use geometry::*;
pub use message::*;
pub use physics::*;
pub use render::*;
