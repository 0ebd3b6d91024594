use nocturne_assets::{
    CubeFace, CubemapImage, FilterMode, PixelFormat, SamplerSettings, TextureImage, WrapMode,
};

/// How texel values are interpreted when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Color maps, decoded from sRGB on sampling.
    Srgb,
    /// Data maps such as specular intensity, sampled as stored.
    Linear,
}

pub fn texture_format(format: PixelFormat, space: ColorSpace) -> wgpu::TextureFormat {
    match (format, space) {
        (PixelFormat::R8, _) => wgpu::TextureFormat::R8Unorm,
        (PixelFormat::Rgb8 | PixelFormat::Rgba8, ColorSpace::Srgb) => {
            wgpu::TextureFormat::Rgba8UnormSrgb
        }
        (PixelFormat::Rgb8 | PixelFormat::Rgba8, ColorSpace::Linear) => {
            wgpu::TextureFormat::Rgba8Unorm
        }
    }
}

fn address_mode(wrap: WrapMode) -> wgpu::AddressMode {
    match wrap {
        WrapMode::Repeat => wgpu::AddressMode::Repeat,
        WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
    }
}

fn filter_mode(filter: FilterMode) -> wgpu::FilterMode {
    match filter {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    }
}

pub fn sampler_descriptor<'a>(
    label: Option<&'a str>,
    settings: &SamplerSettings,
) -> wgpu::SamplerDescriptor<'a> {
    wgpu::SamplerDescriptor {
        label,
        address_mode_u: address_mode(settings.wrap_u),
        address_mode_v: address_mode(settings.wrap_v),
        address_mode_w: address_mode(settings.wrap_w),
        mag_filter: filter_mode(settings.mag_filter),
        min_filter: filter_mode(settings.min_filter),
        mipmap_filter: settings
            .mipmap_filter
            .map(filter_mode)
            .unwrap_or(wgpu::FilterMode::Nearest),
        ..Default::default()
    }
}

/// A sampled texture with its view and sampler. Released on drop.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl GpuTexture {
    /// Upload every mip level of a decoded 2D texture.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &TextureImage,
        space: ColorSpace,
    ) -> Self {
        let label = Some(image.label.as_str());
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size: wgpu::Extent3d {
                width: image.width(),
                height: image.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: image.mip_level_count(),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: texture_format(image.format, space),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let bytes_per_texel = image.format.upload_bytes_per_texel();
        for (level, mip) in image.levels.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &mip.data,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(mip.width * bytes_per_texel),
                    rows_per_image: Some(mip.height),
                },
                wgpu::Extent3d {
                    width: mip.width,
                    height: mip.height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&sampler_descriptor(label, &image.sampler));
        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Upload six faces as a cube texture, one layer per face.
    pub fn cubemap(device: &wgpu::Device, queue: &wgpu::Queue, cube: &CubemapImage) -> Self {
        let size = wgpu::Extent3d {
            width: cube.size,
            height: cube.size,
            depth_or_array_layers: 6,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("skybox"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for face in CubeFace::ALL {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: face.layer(),
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                cube.face(face),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(cube.size * 4),
                    rows_per_image: Some(cube.size),
                },
                wgpu::Extent3d {
                    width: cube.size,
                    height: cube.size,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("skybox_view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = device.create_sampler(&sampler_descriptor(Some("skybox"), &cube.sampler));
        Self {
            texture,
            view,
            sampler,
        }
    }
}
