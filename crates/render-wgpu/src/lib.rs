//! wgpu render backend for the viewer.
//!
//! Draws OBJ models with Phong lighting from up to eight point lights,
//! alpha-blended sprite quads and a cubemap skybox, by executing a
//! [`nocturne_render::FramePlan`].
//!
//! # Invariants
//! - Commands run in plan order; raster state changes select pipelines.
//! - Static geometry and textures are uploaded once and owned by the renderer.

mod context;
mod gpu;
mod mesh;
mod shaders;
mod texture;
pub mod uniforms;

pub use context::{Acquired, GpuContext, RenderError, pick_surface_format};
pub use gpu::{PipelineKind, SceneAssets, WgpuRenderer};
pub use texture::{ColorSpace, GpuTexture};
