use image::DynamicImage;
use image::imageops::FilterType;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image {label} has no pixels")]
    Empty { label: String },
}

/// Texel layout of a decoded image, chosen from its channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Single channel (grayscale, or luma of a luma+alpha image).
    R8,
    /// Three channels. Uploaded as four with opaque alpha.
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn from_channel_count(channels: u8) -> Self {
        match channels {
            1 | 2 => PixelFormat::R8,
            3 => PixelFormat::Rgb8,
            _ => PixelFormat::Rgba8,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::Rgba8)
    }

    /// Bytes per texel in [`MipLevel::data`].
    pub fn upload_bytes_per_texel(self) -> u32 {
        match self {
            PixelFormat::R8 => 1,
            PixelFormat::Rgb8 | PixelFormat::Rgba8 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerSettings {
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
    pub wrap_w: WrapMode,
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    /// `None` means the texture has a single level.
    pub mipmap_filter: Option<FilterMode>,
}

impl SamplerSettings {
    /// Trilinear sampling. Textures with alpha clamp so their transparent
    /// borders do not bleed in from the opposite edge.
    pub fn for_2d(format: PixelFormat) -> Self {
        let wrap = if format.has_alpha() {
            WrapMode::ClampToEdge
        } else {
            WrapMode::Repeat
        };
        Self {
            wrap_u: wrap,
            wrap_v: wrap,
            wrap_w: wrap,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: Some(FilterMode::Linear),
        }
    }

    pub fn cubemap() -> Self {
        Self {
            wrap_u: WrapMode::ClampToEdge,
            wrap_v: WrapMode::ClampToEdge,
            wrap_w: WrapMode::ClampToEdge,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// A decoded 2D texture with its full mip chain, ready for upload.
#[derive(Debug, Clone)]
pub struct TextureImage {
    pub label: String,
    pub format: PixelFormat,
    pub levels: Vec<MipLevel>,
    pub sampler: SamplerSettings,
}

/// `floor(log2(max(width, height))) + 1`.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}

fn level_bytes(image: &DynamicImage, format: PixelFormat) -> Vec<u8> {
    match format {
        PixelFormat::R8 => image.to_luma8().into_raw(),
        PixelFormat::Rgb8 | PixelFormat::Rgba8 => image.to_rgba8().into_raw(),
    }
}

impl TextureImage {
    pub fn from_image(image: DynamicImage, label: impl Into<String>) -> Result<Self, TextureError> {
        let label = label.into();
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { label });
        }

        let format = PixelFormat::from_channel_count(image.color().channel_count());
        let base = match format {
            PixelFormat::R8 => DynamicImage::ImageLuma8(image.to_luma8()),
            PixelFormat::Rgb8 | PixelFormat::Rgba8 => DynamicImage::ImageRgba8(image.to_rgba8()),
        };

        let count = mip_level_count(width, height);
        let mut levels = Vec::with_capacity(count as usize);
        levels.push(MipLevel {
            width,
            height,
            data: level_bytes(&base, format),
        });

        let mut previous = base;
        for _ in 1..count {
            let w = (previous.width() / 2).max(1);
            let h = (previous.height() / 2).max(1);
            let next = previous.resize_exact(w, h, FilterType::Triangle);
            levels.push(MipLevel {
                width: w,
                height: h,
                data: level_bytes(&next, format),
            });
            previous = next;
        }

        Ok(Self {
            label,
            format,
            levels,
            sampler: SamplerSettings::for_2d(format),
        })
    }

    /// Stand-in for a texture that failed to load: a 2x2 magenta/black checkerboard.
    pub fn placeholder() -> Self {
        let magenta = [255, 0, 255, 255];
        let black = [0, 0, 0, 255];
        let data = [magenta, black, black, magenta].concat();
        Self {
            label: "placeholder".into(),
            format: PixelFormat::Rgba8,
            levels: vec![MipLevel {
                width: 2,
                height: 2,
                data,
            }],
            sampler: SamplerSettings {
                mipmap_filter: None,
                ..SamplerSettings::for_2d(PixelFormat::Rgb8)
            },
        }
    }

    /// A 1x1 opaque texture of one color.
    pub fn solid(label: impl Into<String>, rgba: [u8; 4]) -> Self {
        Self {
            label: label.into(),
            format: PixelFormat::Rgba8,
            levels: vec![MipLevel {
                width: 1,
                height: 1,
                data: rgba.to_vec(),
            }],
            sampler: SamplerSettings {
                mipmap_filter: None,
                ..SamplerSettings::for_2d(PixelFormat::Rgb8)
            },
        }
    }

    pub fn width(&self) -> u32 {
        self.levels[0].width
    }

    pub fn height(&self) -> u32 {
        self.levels[0].height
    }

    pub fn mip_level_count(&self) -> u32 {
        self.levels.len() as u32
    }
}

/// Decode an image file into a mipmapped texture.
pub fn load_texture_2d(path: impl AsRef<Path>) -> Result<TextureImage, TextureError> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let texture = TextureImage::from_image(image, path.display().to_string())?;
    tracing::debug!(
        "loaded texture {} ({}x{}, {:?}, {} levels)",
        path.display(),
        texture.width(),
        texture.height(),
        texture.format,
        texture.mip_level_count()
    );
    Ok(texture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn mip_counts() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 1), 2);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(300, 17), 9);
        assert_eq!(mip_level_count(0, 0), 1);
    }

    #[test]
    fn rgba_image_clamps_to_edge() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 128]));
        let tex = TextureImage::from_image(DynamicImage::ImageRgba8(img), "decal").unwrap();
        assert_eq!(tex.format, PixelFormat::Rgba8);
        assert_eq!(tex.sampler.wrap_u, WrapMode::ClampToEdge);
        assert_eq!(tex.sampler.wrap_v, WrapMode::ClampToEdge);
    }

    #[test]
    fn rgb_image_repeats_and_expands_to_opaque_rgba() {
        let img = RgbImage::from_pixel(4, 2, Rgb([200, 100, 50]));
        let tex = TextureImage::from_image(DynamicImage::ImageRgb8(img), "wall").unwrap();
        assert_eq!(tex.format, PixelFormat::Rgb8);
        assert_eq!(tex.sampler.wrap_u, WrapMode::Repeat);
        assert_eq!(tex.sampler.wrap_v, WrapMode::Repeat);
        assert_eq!(tex.levels[0].data.len(), 4 * 2 * 4);
        assert_eq!(&tex.levels[0].data[..4], &[200, 100, 50, 255]);
    }

    #[test]
    fn gray_image_is_single_channel() {
        let img = GrayImage::from_pixel(8, 8, image::Luma([77]));
        let tex = TextureImage::from_image(DynamicImage::ImageLuma8(img), "mask").unwrap();
        assert_eq!(tex.format, PixelFormat::R8);
        assert_eq!(tex.levels[0].data.len(), 64);
        assert_eq!(tex.sampler.wrap_u, WrapMode::Repeat);
    }

    #[test]
    fn mip_chain_halves_down_to_one() {
        let img: RgbImage = ImageBuffer::from_pixel(16, 4, Rgb([1, 2, 3]));
        let tex = TextureImage::from_image(DynamicImage::ImageRgb8(img), "chain").unwrap();
        let sizes: Vec<_> = tex.levels.iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(sizes, vec![(16, 4), (8, 2), (4, 1), (2, 1), (1, 1)]);
        for level in &tex.levels {
            assert_eq!(level.data.len() as u32, level.width * level.height * 4);
        }
        assert_eq!(tex.sampler.mipmap_filter, Some(FilterMode::Linear));
        assert_eq!(tex.sampler.min_filter, FilterMode::Linear);
        assert_eq!(tex.sampler.mag_filter, FilterMode::Linear);
    }

    #[test]
    fn load_from_disk_and_report_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0])).save(&good).unwrap();
        let tex = load_texture_2d(&good).unwrap();
        assert_eq!(tex.sampler.wrap_u, WrapMode::ClampToEdge);

        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"not a png").unwrap();
        let err = load_texture_2d(&bad).unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
        assert!(err.to_string().contains("bad.png"));

        assert!(load_texture_2d(dir.path().join("missing.jpg")).is_err());
    }

    #[test]
    fn placeholder_is_small_and_opaque() {
        let tex = TextureImage::placeholder();
        assert_eq!((tex.width(), tex.height()), (2, 2));
        assert_eq!(tex.mip_level_count(), 1);
        assert_eq!(tex.sampler.mipmap_filter, None);
        assert!(tex.levels[0].data.chunks(4).all(|px| px[3] == 255));
    }
}
