use crate::texture::{ColorSpace, GpuTexture};
use bytemuck::{Pod, Zeroable};
use nocturne_assets::{MaterialTextures, MeshVertex, ModelData};
use nocturne_render::geometry::{SKYBOX_VERTICES, SPRITE_QUAD_VERTICES};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl From<&MeshVertex> for ModelVertex {
    fn from(v: &MeshVertex) -> Self {
        Self {
            position: v.position,
            normal: v.normal,
            tex_coords: v.tex_coords,
        }
    }
}

impl ModelVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub const SPRITE_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];
pub const SKYBOX_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

pub fn sprite_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: size_of::<[f32; 5]>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &SPRITE_ATTRIBUTES,
    }
}

pub fn skybox_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: size_of::<[f32; 3]>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &SKYBOX_ATTRIBUTES,
    }
}

/// Immutable vertex buffers for the skybox cube and the sprite quad.
pub struct StaticGeometry {
    pub skybox: wgpu::Buffer,
    pub sprite: wgpu::Buffer,
}

impl StaticGeometry {
    pub fn upload(device: &wgpu::Device) -> Self {
        let skybox = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skybox_vertex_buffer"),
            contents: bytemuck::cast_slice(&SKYBOX_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let sprite = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sprite_vertex_buffer"),
            contents: bytemuck::cast_slice(&SPRITE_QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self { skybox, sprite }
    }
}

pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    /// Index into [`GpuModel::materials`].
    pub material: usize,
}

/// Diffuse and specular maps bound together at group 2.
pub struct GpuMaterial {
    pub diffuse: GpuTexture,
    pub specular: GpuTexture,
    pub bind_group: wgpu::BindGroup,
}

impl GpuMaterial {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        textures: &MaterialTextures,
    ) -> Self {
        let diffuse = GpuTexture::from_image(device, queue, &textures.diffuse, ColorSpace::Srgb);
        let specular =
            GpuTexture::from_image(device, queue, &textures.specular, ColorSpace::Linear);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&diffuse.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&specular.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&specular.sampler),
                },
            ],
        });
        Self {
            diffuse,
            specular,
            bind_group,
        }
    }
}

/// A model on the GPU. The last material is the fallback used by submeshes
/// without one.
pub struct GpuModel {
    pub meshes: Vec<GpuMesh>,
    pub materials: Vec<GpuMaterial>,
}

impl GpuModel {
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        material_layout: &wgpu::BindGroupLayout,
        model: &ModelData,
    ) -> Self {
        let name = model.path.display().to_string();
        let diffuse_slot = model.diffuse_slot();

        let mut materials: Vec<GpuMaterial> = model
            .load_material_textures()
            .iter()
            .zip(&model.materials)
            .map(|(textures, material)| {
                let label = format!("{name}:{}:{diffuse_slot}", material.name);
                GpuMaterial::new(device, queue, material_layout, &label, textures)
            })
            .collect();
        let fallback = materials.len();
        materials.push(GpuMaterial::new(
            device,
            queue,
            material_layout,
            &format!("{name}:fallback"),
            &MaterialTextures::fallback(),
        ));

        let meshes = model
            .meshes
            .iter()
            .map(|mesh| {
                let vertices: Vec<ModelVertex> = mesh.vertices.iter().map(Into::into).collect();
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{name}:{}:vertices", mesh.name)),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{name}:{}:indices", mesh.name)),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: mesh.indices.len() as u32,
                    material: mesh.material.filter(|m| *m < fallback).unwrap_or(fallback),
                }
            })
            .collect();

        tracing::debug!(
            "uploaded model {name} ({} meshes, {} materials)",
            model.meshes.len(),
            fallback
        );
        Self { meshes, materials }
    }

    /// Draw every submesh with its material bound at group 2. The pipeline
    /// and groups 0 and 1 must already be set.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        for mesh in &self.meshes {
            pass.set_bind_group(2, &self.materials[mesh.material].bind_group, &[]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_vertex_layout() {
        assert_eq!(size_of::<ModelVertex>(), 32);
        let layout = ModelVertex::layout();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes[2].offset, 24);
    }

    #[test]
    fn static_layouts_match_geometry() {
        assert_eq!(
            sprite_layout().array_stride as usize,
            size_of_val(&SPRITE_QUAD_VERTICES[0])
        );
        assert_eq!(sprite_layout().attributes[1].offset, 12);
        assert_eq!(
            skybox_layout().array_stride as usize,
            size_of_val(&SKYBOX_VERTICES[0])
        );
    }

    #[test]
    fn mesh_vertex_converts_field_for_field() {
        let v = MeshVertex {
            position: [1.0, 2.0, 3.0],
            normal: [0.0, 1.0, 0.0],
            tex_coords: [0.25, 0.75],
        };
        let gpu = ModelVertex::from(&v);
        assert_eq!(gpu.position, v.position);
        assert_eq!(gpu.normal, v.normal);
        assert_eq!(gpu.tex_coords, v.tex_coords);
    }
}
