//! Shared value types for the viewer.
//!
//! Everything here is plain data: no GPU handles, no window state. The render,
//! input and asset crates all speak in these types.

pub mod config;
pub mod light;
pub mod sprite;
pub mod types;

pub use config::{ConfigError, ViewerConfig};
pub use light::{LightSet, LightSetError, MAX_POINT_LIGHTS, PointLight};
pub use sprite::{SPRITE_BASE_SCALE, SpritePlacement};
pub use types::{CameraMovement, ModelPlacement, Transform};
