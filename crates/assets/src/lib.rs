//! Asset loading, CPU side.
//!
//! Decodes images into upload-ready texel data with the sampler settings the
//! renderer should use, and loads OBJ models with their MTL materials. Nothing
//! here touches the GPU: the render backend consumes these values by reference.
//!
//! # Failure policy
//! - 2D textures return `Result`; callers pick a fallback such as
//!   [`TextureImage::placeholder`].
//! - Cubemaps never fail as a whole: a bad face is logged and left black.

pub mod cubemap;
pub mod model;
pub mod texture;

pub use cubemap::{CubeFace, CubemapImage, load_cubemap};
pub use model::{
    MaterialData, MaterialTextures, MeshVertex, ModelData, ModelError, SubMesh, load_model,
};
pub use texture::{
    FilterMode, MipLevel, PixelFormat, SamplerSettings, TextureError, TextureImage, WrapMode,
    load_texture_2d, mip_level_count,
};
