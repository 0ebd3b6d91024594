//! CPU mirrors of the WGSL uniform blocks. Field order and padding match
//! the structs declared in `shaders.rs`.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use nocturne_common::{LightSet, MAX_POINT_LIGHTS, PointLight, Transform};
use nocturne_render::FrameParams;

/// Offset alignment for per-draw uniforms bound with a dynamic offset.
pub const DRAW_UNIFORM_ALIGN: u64 = 256;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct PointLightUniform {
    pub position: [f32; 3],
    pub constant: f32,
    pub ambient: [f32; 3],
    pub linear: f32,
    pub diffuse: [f32; 3],
    pub quadratic: f32,
    pub specular: [f32; 3],
    pub _pad: f32,
}

impl From<&PointLight> for PointLightUniform {
    fn from(light: &PointLight) -> Self {
        Self {
            position: light.position.to_array(),
            constant: light.constant,
            ambient: light.ambient.to_array(),
            linear: light.linear,
            diffuse: light.diffuse.to_array(),
            quadratic: light.quadratic,
            specular: light.specular.to_array(),
            _pad: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub skybox_view: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub shininess: f32,
    pub light_count: u32,
    pub _pad: [u32; 3],
    pub lights: [PointLightUniform; MAX_POINT_LIGHTS],
}

/// Lights in index order; unused slots stay zeroed.
pub fn encode_lights(lights: &LightSet) -> ([PointLightUniform; MAX_POINT_LIGHTS], u32) {
    let mut out = [PointLightUniform::default(); MAX_POINT_LIGHTS];
    let mut count = 0;
    for (index, light) in lights.iter() {
        out[index] = light.into();
        count += 1;
    }
    (out, count)
}

impl FrameUniforms {
    pub fn from_params(params: &FrameParams) -> Self {
        let (lights, light_count) = encode_lights(&params.lights);
        Self {
            view: params.view.to_cols_array_2d(),
            projection: params.projection.to_cols_array_2d(),
            skybox_view: params.skybox_view.to_cols_array_2d(),
            camera_position: params.camera_position.to_array(),
            shininess: params.shininess,
            light_count,
            _pad: [0; 3],
            lights,
        }
    }
}

/// Per-draw model matrix and the matching normal matrix.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl From<Transform> for DrawUniforms {
    fn from(transform: Transform) -> Self {
        let model = transform.matrix();
        Self {
            model: model.to_cols_array_2d(),
            normal: model.inverse().transpose().to_cols_array_2d(),
        }
    }
}

impl DrawUniforms {
    pub fn identity() -> Self {
        Self::from(Transform::IDENTITY)
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }
}

/// Pack draw uniforms at [`DRAW_UNIFORM_ALIGN`]-byte strides.
pub fn pack_draws(draws: &[DrawUniforms]) -> Vec<u8> {
    let stride = DRAW_UNIFORM_ALIGN as usize;
    let mut bytes = vec![0u8; draws.len() * stride];
    for (i, draw) in draws.iter().enumerate() {
        let start = i * stride;
        bytes[start..start + size_of::<DrawUniforms>()].copy_from_slice(bytemuck::bytes_of(draw));
    }
    bytes
}
