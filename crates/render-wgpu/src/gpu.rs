use crate::context::RenderError;
use crate::mesh::{self, GpuModel, ModelVertex, StaticGeometry};
use crate::shaders;
use crate::texture::{ColorSpace, GpuTexture};
use crate::uniforms::{self, DRAW_UNIFORM_ALIGN, DrawUniforms, FrameUniforms};
use nocturne_assets::{CubemapImage, ModelData, TextureImage};
use nocturne_render::geometry::{SKYBOX_VERTEX_COUNT, SPRITE_VERTEX_COUNT};
use nocturne_render::{Command, CullMode, DepthCompare, FramePlan, ModelSlot, RasterState};
use std::collections::HashMap;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Which shader a draw uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    Model,
    Sprite,
    Skybox,
}

impl PipelineKind {
    pub fn for_command(command: &Command) -> Option<Self> {
        match command {
            Command::DrawModel { .. } => Some(PipelineKind::Model),
            Command::DrawSprite { .. } => Some(PipelineKind::Sprite),
            Command::DrawSkybox => Some(PipelineKind::Skybox),
            Command::Clear { .. } | Command::SetRaster(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    kind: PipelineKind,
    raster: RasterState,
}

pub fn cull_face(cull: CullMode) -> Option<wgpu::Face> {
    match cull {
        CullMode::Back => Some(wgpu::Face::Back),
        CullMode::None => None,
    }
}

pub fn compare_function(depth: DepthCompare) -> wgpu::CompareFunction {
    match depth {
        DepthCompare::Less => wgpu::CompareFunction::Less,
        DepthCompare::LessEqual => wgpu::CompareFunction::LessEqual,
    }
}

/// Pipeline and raster state for every draw, in command order.
fn resolve_draws(plan: &FramePlan) -> Vec<(usize, PipelineKey)> {
    let mut raster = None;
    let mut draws = Vec::new();
    for (index, command) in plan.commands.iter().enumerate() {
        if let Command::SetRaster(state) = command {
            raster = Some(*state);
        }
        if let (Some(kind), Some(raster)) = (PipelineKind::for_command(command), raster) {
            draws.push((index, PipelineKey { kind, raster }));
        }
    }
    draws
}

/// Per-draw uniforms for every model and sprite draw, in command order.
pub fn draw_uniforms(plan: &FramePlan) -> Vec<DrawUniforms> {
    plan.commands
        .iter()
        .filter_map(|command| match command {
            Command::DrawModel { transform, .. } | Command::DrawSprite { transform, .. } => {
                Some(DrawUniforms::from(*transform))
            }
            _ => None,
        })
        .collect()
}

/// CPU-side assets the renderer uploads once at startup.
pub struct SceneAssets<'a> {
    pub scene: &'a ModelData,
    pub billboard: &'a ModelData,
    pub sprite: &'a TextureImage,
    pub skybox: &'a CubemapImage,
}

struct Layouts {
    frame: wgpu::BindGroupLayout,
    draw: wgpu::BindGroupLayout,
    material: wgpu::BindGroupLayout,
    texture: wgpu::BindGroupLayout,
    cube: wgpu::BindGroupLayout,
}

fn texture_entry(
    binding: u32,
    dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

impl Layouts {
    fn new(device: &wgpu::Device) -> Self {
        let frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(size_of::<FrameUniforms>() as u64),
                },
                count: None,
            }],
        });
        let draw = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(size_of::<DrawUniforms>() as u64),
                },
                count: None,
            }],
        });
        let d2 = wgpu::TextureViewDimension::D2;
        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bind_group_layout"),
            entries: &[
                texture_entry(0, d2),
                sampler_entry(1),
                texture_entry(2, d2),
                sampler_entry(3),
            ],
        });
        let texture = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
            entries: &[texture_entry(0, d2), sampler_entry(1)],
        });
        let cube = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cube_bind_group_layout"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::Cube),
                sampler_entry(1),
            ],
        });
        Self {
            frame,
            draw,
            material,
            texture,
            cube,
        }
    }
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    label: &str,
    texture: &GpuTexture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    })
}

/// wgpu renderer for the viewer scene. Executes [`FramePlan`]s.
pub struct WgpuRenderer {
    layouts: Layouts,
    pipeline_layouts: HashMap<PipelineKind, wgpu::PipelineLayout>,
    shaders: HashMap<PipelineKind, wgpu::ShaderModule>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_capacity: usize,
    geometry: StaticGeometry,
    scene: GpuModel,
    billboard: GpuModel,
    _sprite_texture: GpuTexture,
    sprite_bind_group: wgpu::BindGroup,
    _skybox_texture: GpuTexture,
    skybox_bind_group: wgpu::BindGroup,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        assets: SceneAssets<'_>,
    ) -> Self {
        let layouts = Layouts::new(device);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniform_buffer"),
            size: size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &layouts.frame,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        // two models plus the default sprites, grown on demand
        let draw_capacity = 8;
        let (draw_buffer, draw_bind_group) =
            Self::create_draw_buffer(device, &layouts.draw, draw_capacity);

        let mut modules = HashMap::new();
        for (kind, label, source) in [
            (PipelineKind::Model, "model_shader", shaders::MODEL_SHADER),
            (PipelineKind::Sprite, "sprite_shader", shaders::SPRITE_SHADER),
            (PipelineKind::Skybox, "skybox_shader", shaders::SKYBOX_SHADER),
        ] {
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
            modules.insert(kind, module);
        }

        let mut pipeline_layouts = HashMap::new();
        for (kind, label, groups) in [
            (
                PipelineKind::Model,
                "model_pipeline_layout",
                vec![&layouts.frame, &layouts.draw, &layouts.material],
            ),
            (
                PipelineKind::Sprite,
                "sprite_pipeline_layout",
                vec![&layouts.frame, &layouts.draw, &layouts.texture],
            ),
            (
                PipelineKind::Skybox,
                "skybox_pipeline_layout",
                vec![&layouts.frame, &layouts.cube],
            ),
        ] {
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &groups,
                push_constant_ranges: &[],
            });
            pipeline_layouts.insert(kind, layout);
        }

        let geometry = StaticGeometry::upload(device);
        let scene = GpuModel::upload(device, queue, &layouts.material, assets.scene);
        let billboard = GpuModel::upload(device, queue, &layouts.material, assets.billboard);

        let sprite_texture = GpuTexture::from_image(device, queue, assets.sprite, ColorSpace::Srgb);
        let sprite_bind_group =
            texture_bind_group(device, &layouts.texture, "sprite_bind_group", &sprite_texture);
        let skybox_texture = GpuTexture::cubemap(device, queue, assets.skybox);
        let skybox_bind_group =
            texture_bind_group(device, &layouts.cube, "skybox_bind_group", &skybox_texture);

        let depth_texture = Self::create_depth_texture(device, width, height);

        let mut renderer = Self {
            layouts,
            pipeline_layouts,
            shaders: modules,
            pipelines: HashMap::new(),
            frame_buffer,
            frame_bind_group,
            draw_buffer,
            draw_bind_group,
            draw_capacity,
            geometry,
            scene,
            billboard,
            _sprite_texture: sprite_texture,
            sprite_bind_group,
            _skybox_texture: skybox_texture,
            skybox_bind_group,
            depth_texture,
            surface_format,
        };

        for key in [
            PipelineKey {
                kind: PipelineKind::Model,
                raster: RasterState::OPAQUE,
            },
            PipelineKey {
                kind: PipelineKind::Sprite,
                raster: RasterState::TRANSPARENT,
            },
            PipelineKey {
                kind: PipelineKind::Skybox,
                raster: RasterState::SKYBOX,
            },
        ] {
            renderer.ensure_pipeline(device, key);
        }
        renderer
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Render one frame plan into `target`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        plan: &FramePlan,
    ) -> Result<(), RenderError> {
        plan.validate()?;

        let draws = resolve_draws(plan);
        for (_, key) in &draws {
            self.ensure_pipeline(device, *key);
        }

        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::from_params(&plan.params)),
        );

        let per_draw = draw_uniforms(plan);
        if per_draw.len() > self.draw_capacity {
            self.draw_capacity = per_draw.len().next_power_of_two();
            let (buffer, bind_group) =
                Self::create_draw_buffer(device, &self.layouts.draw, self.draw_capacity);
            self.draw_buffer = buffer;
            self.draw_bind_group = bind_group;
            tracing::debug!("grew draw uniform buffer to {} slots", self.draw_capacity);
        }
        if !per_draw.is_empty() {
            queue.write_buffer(&self.draw_buffer, 0, &uniforms::pack_draws(&per_draw));
        }

        let (clear_color, clear_depth) = match plan.commands.first() {
            Some(Command::Clear { color, depth }) => (*color, *depth),
            _ => ([0.0, 0.0, 0.0, 1.0], 1.0),
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear_color[0] as f64,
                            g: clear_color[1] as f64,
                            b: clear_color[2] as f64,
                            a: clear_color[3] as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_depth),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.frame_bind_group, &[]);

            let mut draw_slot = 0u64;
            for (index, key) in draws {
                let Some(pipeline) = self.pipelines.get(&key) else {
                    continue;
                };
                pass.set_pipeline(pipeline);
                match &plan.commands[index] {
                    Command::DrawModel { slot, .. } => {
                        let offset = (draw_slot * DRAW_UNIFORM_ALIGN) as u32;
                        draw_slot += 1;
                        pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
                        match slot {
                            ModelSlot::Scene => self.scene.draw(&mut pass),
                            ModelSlot::Billboard => self.billboard.draw(&mut pass),
                        }
                    }
                    Command::DrawSprite { .. } => {
                        let offset = (draw_slot * DRAW_UNIFORM_ALIGN) as u32;
                        draw_slot += 1;
                        pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
                        pass.set_bind_group(2, &self.sprite_bind_group, &[]);
                        pass.set_vertex_buffer(0, self.geometry.sprite.slice(..));
                        pass.draw(0..SPRITE_VERTEX_COUNT, 0..1);
                    }
                    Command::DrawSkybox => {
                        pass.set_bind_group(1, &self.skybox_bind_group, &[]);
                        pass.set_vertex_buffer(0, self.geometry.skybox.slice(..));
                        pass.draw(0..SKYBOX_VERTEX_COUNT, 0..1);
                    }
                    Command::Clear { .. } | Command::SetRaster(_) => {}
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn ensure_pipeline(&mut self, device: &wgpu::Device, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }
        let (Some(module), Some(layout)) = (
            self.shaders.get(&key.kind),
            self.pipeline_layouts.get(&key.kind),
        ) else {
            return;
        };

        let (vertex_layout, blend) = match key.kind {
            PipelineKind::Model => (ModelVertex::layout(), wgpu::BlendState::REPLACE),
            PipelineKind::Sprite => (mesh::sprite_layout(), wgpu::BlendState::ALPHA_BLENDING),
            PipelineKind::Skybox => (mesh::skybox_layout(), wgpu::BlendState::REPLACE),
        };
        let label = format!(
            "{:?}_pipeline_{:?}_{:?}",
            key.kind, key.raster.cull, key.raster.depth
        );

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: cull_face(key.raster.cull),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: key.kind != PipelineKind::Skybox,
                depth_compare: compare_function(key.raster.depth),
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });
        tracing::debug!("created pipeline {label}");
        self.pipelines.insert(key, pipeline);
    }

    fn create_draw_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        slots: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("draw_uniform_buffer"),
            contents: &uniforms::pack_draws(&vec![DrawUniforms::identity(); slots]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size_of::<DrawUniforms>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}
